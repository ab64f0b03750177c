use hexf::*;
use super::mc::Float;

/// Largest double below 1.
pub const ONE_MINUS_EPSILON: f64 = hexf64!("0x1.fffffffffffffp-1");
const PCG32_MULT: u64 = 0x5851f42d4c957f2d;

/// PCG32 generator.
///
/// Every run owns its generators explicitly. A seed selects the starting
/// state and a stream index selects one of 2^63 independent sequences, so
/// parallel workers derive their own streams from the same seed.
#[derive(Debug, Copy, Clone)]
pub struct Rng {
    state: u64,
    inc: u64
}

impl Rng {
    /// Generator for stream 0 of `seed`, the stream used by sequential runs.
    pub fn new(seed: u64) -> Rng {
        Rng::with_stream(seed, 0)
    }

    /// Generator for stream `stream` of `seed`.
    pub fn with_stream(seed: u64, stream: u64) -> Rng {
        let mut rng = Rng { state: 0, inc: stream.wrapping_shl(1) | 1 };
        rng.next_u32();
        rng.state = rng.state.wrapping_add(seed);
        rng.next_u32();
        rng
    }

    pub fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = old.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);
        let xorshifted = ((old >> 18) ^ old).wrapping_shr(27) as u32;
        xorshifted.rotate_right((old >> 59) as u32)
    }

    /// Uniform deviate in [0, 1) with 53 bits of resolution.
    pub fn uniform_float(&mut self) -> Float {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        let bits = ((hi << 32) | lo) >> 11;
        (bits as Float * hexf64!("0x1.0p-53")).min(ONE_MINUS_EPSILON)
    }
}

//! Detectors that read the complete path of a photon and score the weight
//! absorbed inside the tissue volume.
use crate::core::mc::Float;
use crate::core::binning::{DoubleRange, annulus_area};
use crate::core::optical_properties::OpticalProperties;
use crate::core::absorption::AbsorptionWeightingType;
use crate::core::detector::{Detector, HistoryDetector, DetectorContext, HistoryScratch, TallyType, Tally, Axis,
    DetectorValues, DetectorValuesMut};
use crate::core::error::DetectorError;
use crate::core::photon::{PhotonHistory, HistoryPoint};

/// What a volume detector scores in each bin.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VolumeQuantity {
    Absorption,
    /// Absorbed weight divided by the absorption coefficient.
    Fluence
}

/// One non-zero deposit along a photon path.
struct Deposit<'a> {
    at: &'a HistoryPoint,
    value: Float
}

/// Walk the path and yield every weight deposit, converted to `quantity`.
fn deposits<'a>(
    history: &'a PhotonHistory,
    weighting: AbsorptionWeightingType,
    quantity: VolumeQuantity,
    ops: &'a [OpticalProperties]
) -> impl Iterator<Item = Deposit<'a>> + 'a {
    history.segments().filter_map(move |(previous, current)| {
        let absorbed = weighting.absorbed_weight(previous, current, ops);
        if absorbed == 0.0 {
            return None;
        }
        let value = match quantity {
            VolumeQuantity::Absorption => absorbed,
            VolumeQuantity::Fluence => {
                // continuous deposits belong to the segment, the others to the event
                let region = match weighting {
                    AbsorptionWeightingType::Continuous => previous.region_index,
                    _ => current.region_index
                };
                weighting.fluence(absorbed, &ops[region])
            }
        };
        Some(Deposit { at: current, value })
    })
}

fn tally_type_of(quantity: VolumeQuantity, absorption: TallyType, fluence: TallyType) -> TallyType {
    match quantity {
        VolumeQuantity::Absorption => absorption,
        VolumeQuantity::Fluence => fluence
    }
}

/// Total weight absorbed in the tissue.
#[derive(Debug, Clone)]
pub struct ATotalDetector {
    weighting: AbsorptionWeightingType,
    ops: Vec<OpticalProperties>,
    tally: Tally<Float>
}

impl ATotalDetector {
    pub fn new(context: &DetectorContext) -> ATotalDetector {
        ATotalDetector { weighting: context.weighting, ops: context.ops.clone(), tally: Tally::new(vec![1]) }
    }
}

impl Detector for ATotalDetector {
    fn tally_type(&self) -> TallyType {
        TallyType::ATotal
    }

    fn axes(&self) -> Vec<Axis> {
        Vec::new()
    }

    fn values(&self) -> DetectorValues<'_> {
        DetectorValues::Real(&self.tally)
    }

    fn values_mut(&mut self) -> DetectorValuesMut<'_> {
        DetectorValuesMut::Real(&mut self.tally)
    }
}

impl HistoryDetector for ATotalDetector {
    fn tally(&mut self, history: &PhotonHistory) {
        let total: Float = deposits(history, self.weighting, VolumeQuantity::Absorption, &self.ops)
            .map(|d| d.value)
            .sum();
        if total != 0.0 {
            self.tally.add(0, total);
        }
    }

    fn fork(&self) -> Box<dyn HistoryDetector> {
        let mut d = self.clone();
        d.tally.reset();
        Box::new(d)
    }
}

/// Absorption or fluence on a cylindrical grid around the z axis.
#[derive(Debug, Clone)]
pub struct RhoAndZDetector {
    quantity: VolumeQuantity,
    rho: DoubleRange,
    z: DoubleRange,
    weighting: AbsorptionWeightingType,
    ops: Vec<OpticalProperties>,
    tally: Tally<Float>,
    scratch: HistoryScratch
}

impl RhoAndZDetector {
    pub fn new(quantity: VolumeQuantity, rho: DoubleRange, z: DoubleRange, context: &DetectorContext)
        -> Result<RhoAndZDetector, DetectorError>
    {
        let name = tally_type_of(quantity, TallyType::AOfRhoAndZ, TallyType::FluenceOfRhoAndZ).to_string();
        rho.validate(&name, "rho")?;
        z.validate(&name, "z")?;
        let tally = Tally::new(vec![rho.bin_count(), z.bin_count()]);
        Ok(RhoAndZDetector {
            quantity,
            rho,
            z,
            weighting: context.weighting,
            ops: context.ops.clone(),
            scratch: HistoryScratch::new(tally.len()),
            tally
        })
    }
}

impl Detector for RhoAndZDetector {
    fn tally_type(&self) -> TallyType {
        tally_type_of(self.quantity, TallyType::AOfRhoAndZ, TallyType::FluenceOfRhoAndZ)
    }

    fn axes(&self) -> Vec<Axis> {
        vec![Axis::new("rho", self.rho), Axis::new("z", self.z)]
    }

    fn values(&self) -> DetectorValues<'_> {
        DetectorValues::Real(&self.tally)
    }

    fn values_mut(&mut self) -> DetectorValuesMut<'_> {
        DetectorValuesMut::Real(&mut self.tally)
    }

    fn bin_jacobian(&self, index: usize) -> Float {
        annulus_area(&self.rho, index / self.z.bin_count()) * self.z.delta()
    }
}

impl HistoryDetector for RhoAndZDetector {
    fn tally(&mut self, history: &PhotonHistory) {
        for deposit in deposits(history, self.weighting, self.quantity, &self.ops) {
            let p = &deposit.at.position;
            if let (Some(ir), Some(iz)) = (self.rho.which_bin(p.rho()), self.z.which_bin(p.z)) {
                self.scratch.add(self.tally.flat_index(&[ir, iz]), deposit.value);
            }
        }
        self.scratch.flush(&mut self.tally);
    }

    fn fork(&self) -> Box<dyn HistoryDetector> {
        let mut d = self.clone();
        d.tally.reset();
        Box::new(d)
    }
}

/// Absorption or fluence on a cartesian voxel grid.
#[derive(Debug, Clone)]
pub struct XAndYAndZDetector {
    quantity: VolumeQuantity,
    x: DoubleRange,
    y: DoubleRange,
    z: DoubleRange,
    weighting: AbsorptionWeightingType,
    ops: Vec<OpticalProperties>,
    tally: Tally<Float>,
    scratch: HistoryScratch
}

impl XAndYAndZDetector {
    pub fn new(quantity: VolumeQuantity, x: DoubleRange, y: DoubleRange, z: DoubleRange, context: &DetectorContext)
        -> Result<XAndYAndZDetector, DetectorError>
    {
        let name = tally_type_of(quantity, TallyType::AOfXAndYAndZ, TallyType::FluenceOfXAndYAndZ).to_string();
        x.validate(&name, "x")?;
        y.validate(&name, "y")?;
        z.validate(&name, "z")?;
        let tally = Tally::new(vec![x.bin_count(), y.bin_count(), z.bin_count()]);
        Ok(XAndYAndZDetector {
            quantity,
            x,
            y,
            z,
            weighting: context.weighting,
            ops: context.ops.clone(),
            scratch: HistoryScratch::new(tally.len()),
            tally
        })
    }
}

impl Detector for XAndYAndZDetector {
    fn tally_type(&self) -> TallyType {
        tally_type_of(self.quantity, TallyType::AOfXAndYAndZ, TallyType::FluenceOfXAndYAndZ)
    }

    fn axes(&self) -> Vec<Axis> {
        vec![Axis::new("x", self.x), Axis::new("y", self.y), Axis::new("z", self.z)]
    }

    fn values(&self) -> DetectorValues<'_> {
        DetectorValues::Real(&self.tally)
    }

    fn values_mut(&mut self) -> DetectorValuesMut<'_> {
        DetectorValuesMut::Real(&mut self.tally)
    }

    fn bin_jacobian(&self, _index: usize) -> Float {
        self.x.delta() * self.y.delta() * self.z.delta()
    }
}

impl HistoryDetector for XAndYAndZDetector {
    fn tally(&mut self, history: &PhotonHistory) {
        for deposit in deposits(history, self.weighting, self.quantity, &self.ops) {
            let p = &deposit.at.position;
            let bins = (self.x.which_bin(p.x), self.y.which_bin(p.y), self.z.which_bin(p.z));
            if let (Some(ix), Some(iy), Some(iz)) = bins {
                self.scratch.add(self.tally.flat_index(&[ix, iy, iz]), deposit.value);
            }
        }
        self.scratch.flush(&mut self.tally);
    }

    fn fork(&self) -> Box<dyn HistoryDetector> {
        let mut d = self.clone();
        d.tally.reset();
        Box::new(d)
    }
}

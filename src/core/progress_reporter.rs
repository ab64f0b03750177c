use super::mc::Float;
use std::sync::{Arc, atomic::{AtomicU64, AtomicBool, Ordering}};
use std::time::{Instant, Duration};
use std::thread::{JoinHandle, spawn, sleep};
use terminal_size::{Width, terminal_size};
use std::io::Write;

const MIN_REDRAW: Duration = Duration::from_millis(250);
const MAX_REDRAW: Duration = Duration::from_secs(2);

/// Terminal progress bar counting traced photons, redrawn from a
/// background thread while workers call `update`.
pub struct ProgressReporter {
    total_photons: u64,
    start_time: Instant,
    enabled: bool,
    photons_done: Arc<AtomicU64>,
    exit_thread: Arc<AtomicBool>,
    update_thread: Option<JoinHandle<()>>
}

impl ProgressReporter {
    pub fn new(total_photons: u64, title: &'static str, enabled: bool) -> ProgressReporter {
        let mut reporter = ProgressReporter {
            total_photons,
            start_time: Instant::now(),
            enabled,
            photons_done: Arc::new(AtomicU64::new(0)),
            exit_thread: Arc::new(AtomicBool::new(false)),
            update_thread: None
        };
        if !enabled {
            return reporter;
        }
        let width = match terminal_size() {
            Some((Width(w), _)) => w as usize,
            None => {
                warn!("Unable to get terminal width, progress bar disabled");
                return reporter;
            }
        };
        let photons_done = reporter.photons_done.clone();
        let exit_thread = reporter.exit_thread.clone();
        let start_time = reporter.start_time;
        reporter.update_thread = Some(spawn(move || {
            let mut redraw = MIN_REDRAW;
            loop {
                let done = photons_done.load(Ordering::SeqCst);
                let elapsed = start_time.elapsed().as_millis() as Float / 1000.0;
                print!("\r{}", render_bar(title, width, done, total_photons, elapsed));
                let _ = std::io::stdout().flush();
                if exit_thread.load(Ordering::SeqCst) {
                    break;
                }
                sleep(redraw);
                // back off on long runs
                redraw = (redraw * 2).min(MAX_REDRAW);
            }
        }));
        reporter
    }

    /// Record `photons` more traced photons. Safe to call from several workers.
    pub fn update(&self, photons: u64) {
        if photons == 0 || !self.enabled {
            return;
        }
        self.photons_done.fetch_add(photons, Ordering::SeqCst);
    }

    pub fn done(&self) {
        if self.enabled {
            self.photons_done.store(self.total_photons, Ordering::SeqCst);
        }
    }

    pub fn work_done(&self) -> u64 {
        self.photons_done.load(Ordering::SeqCst)
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.exit_thread.store(true, Ordering::SeqCst);
        if let Some(handle) = self.update_thread.take() {
            if handle.join().is_err() {
                error!("Progress bar thread panicked");
            }
            println!();
        }
    }
}

/// One line of the progress bar: title, `+` filled bar, photon rate and the
/// elapsed / estimated remaining seconds.
fn render_bar(title: &str, width: usize, done: u64, total: u64, elapsed: Float) -> String {
    let fraction = if total == 0 { 1.0 } else { (done as Float / total as Float).min(1.0) };
    let bar_length = 2.max(width.saturating_sub(title.len() + 40));
    let filled = ((bar_length as Float * fraction).round() as usize).min(bar_length);
    let rate = if elapsed > 0.0 { done as Float / elapsed } else { 0.0 };
    let timing = if done >= total {
        format!("({:.1}s)", elapsed)
    } else if fraction > 0.0 {
        format!("({:.1}s|{:.1}s)", elapsed, (elapsed / fraction - elapsed).max(0.0))
    } else {
        format!("({:.1}s|?s)", elapsed)
    };
    format!("{}: [{}{}] {:.0} photons/s {}   ",
        title, "+".repeat(filled), " ".repeat(bar_length - filled), rate, timing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_reporter_counts_nothing() {
        let reporter = ProgressReporter::new(10, "Test", false);
        reporter.update(3);
        reporter.done();
        assert_eq!(reporter.work_done(), 0);
        assert!(reporter.update_thread.is_none());
    }

    #[test]
    fn test_render_bar() {
        let half = render_bar("Run", 53, 50, 100, 2.0);
        assert!(half.starts_with("Run: [+++++     ]"));
        assert!(half.contains("25 photons/s"));
        assert!(half.contains("(2.0s|2.0s)"));

        let finished = render_bar("Run", 53, 100, 100, 4.0);
        assert!(finished.contains("[++++++++++]"));
        assert!(finished.contains("(4.0s)"));

        assert!(render_bar("Run", 0, 0, 100, 0.0).contains("[  ]"));
    }
}

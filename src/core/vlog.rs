//! Verbosity log for per-photon tracing. Messages tagged with a level at or
//! below the run's `verbosity` are forwarded to `debug!`, so a run at
//! verbosity 0 only emits the summaries logged through `info!`.
use std::sync::atomic::{AtomicUsize, Ordering};

pub static LOG_LEVEL: AtomicUsize = AtomicUsize::new(0);

/// Log at verbosity `$level`. Levels start at 1.
#[macro_export]
macro_rules! vlog {
    ($level: expr, $($arg:tt)*) => {
        if $level <= $crate::core::vlog::get_log_level() {
            debug!($($arg)*);
        }
    };
}

pub fn set_log_level(level: usize) {
    LOG_LEVEL.store(level, Ordering::Relaxed);
}

pub fn get_log_level() -> usize {
    LOG_LEVEL.load(Ordering::Relaxed)
}

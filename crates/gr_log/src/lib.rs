//! Text logging for use in the grapher crates.
//!
//! Provides a thin layer over the `log` crate so that every crate in the
//! workspace logs the same way, plus `*_once` variants for messages that
//! would otherwise spam (stale fetch results, unrecognized query params, …).
//!
//! * `trace`: spammy things
//! * `debug`: things that make sense when debugging
//! * `info`: things a user might care about
//! * `warn`: problems the engine can recover from
//! * `error`: problems that lead to data not being shown

pub use log::{debug, error, info, trace, warn, Level, LevelFilter};

/// Log a warning the first time this call site is hit, then stay quiet.
#[macro_export]
macro_rules! warn_once {
    ($($arg:tt)+) => {{
        static ONCE: ::std::sync::Once = ::std::sync::Once::new();
        ONCE.call_once(|| $crate::warn!($($arg)+));
    }};
}

/// Log a debug message the first time this call site is hit, then stay quiet.
#[macro_export]
macro_rules! debug_once {
    ($($arg:tt)+) => {{
        static ONCE: ::std::sync::Once = ::std::sync::Once::new();
        ONCE.call_once(|| $crate::debug!($($arg)+));
    }};
}

/// Set up logging for the current process, honoring `RUST_LOG`.
///
/// Safe to call more than once (subsequent calls are no-ops).
pub fn setup_logging() {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter()),
    );
    // `try_init` so tests can all call this without stepping on each other.
    builder.try_init().ok();
}

fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn once_macros_only_fire_once() {
        // Smoke test: expanding in a loop must not re-log (and must compile
        // with a fresh static per call site).
        for _ in 0..3 {
            crate::warn_once!("only once, even in a loop");
        }
        crate::debug_once!("value: {}", 42);
    }
}

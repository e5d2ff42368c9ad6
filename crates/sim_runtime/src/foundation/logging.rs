//! Logging utilities
//!
//! Every subsystem logs through the `log` facade; the application decides
//! whether and how to install a backend. These helpers install `env_logger`.

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with a fallback filter
///
/// `RUST_LOG` still wins when it is set. Returns an error if a logger was
/// already installed (tests and embedding applications hit this routinely).
pub fn init_with_filter(filter: &str) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_existing_logger() {
        let _ = init_with_filter("debug");
        assert!(init_with_filter("warn").is_err());
    }
}

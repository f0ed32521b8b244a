//! Logging Infrastructure
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies.

use tracing_subscriber::EnvFilter;

use crate::config::ClientConfig;

/// Initialize the logger at `info`
pub fn init_logger() {
    init_logger_with_level("info");
}

/// Initialize the logger at the configured `log_level`
pub fn init_from_config(config: &ClientConfig) {
    init_logger_with_level(&config.log_level);
}

/// Initialize the logger with a default level
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init_logger_with_level("debug");
        init_logger_with_level("not a level !!");
        init_from_config(&ClientConfig::default());
        tracing::debug!("logger initialised");
    }
}

//! Centralized logging configuration for the sinv binary and benchmarks
//!
//! This module provides a consistent logging setup with custom formatting
//! and default INFO level across all executables.

use tracing::Level;

/// Initialize the tracing subscriber with the crate's standard configuration
///
/// Default log level: INFO (overrideable via RUST_LOG environment variable)
///
/// Format includes:
/// - Timestamp
/// - Log level (INFO, WARN, ERROR, DEBUG, TRACE)
/// - Module/target path, e.g. `sparse_inverse::linalg::ldl`
///
/// # Example
/// ```no_run
/// use sparse_inverse::init_logger;
///
/// fn main() {
///     init_logger();
///     tracing::info!("Application started");
/// }
/// ```
///
/// # Environment Variables
/// Override the default log level using `RUST_LOG`:
/// ```bash
/// RUST_LOG=debug cargo run --bin sinv -- matrix.mtx
/// RUST_LOG=sparse_inverse=trace cargo run --bin sinv -- matrix.mtx
/// ```
pub fn init_logger() {
    init_logger_with_level(Level::INFO)
}

/// Initialize the tracing subscriber with a custom default level
///
/// # Arguments
/// * `default_level` - The default log level (overrideable via RUST_LOG)
///
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place.
///
/// # Example
/// ```no_run
/// use sparse_inverse::init_logger_with_level;
/// use tracing::Level;
///
/// fn main() {
///     init_logger_with_level(Level::DEBUG);
///     tracing::debug!("Factorization sizes will be logged");
/// }
/// ```
pub fn init_logger_with_level(default_level: Level) {
    use tracing_subscriber::fmt::time::SystemTime;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        // Custom format: [date:time LEVEL module]
        .with_timer(SystemTime) // RFC 3339 timestamp
        .with_target(true) // Include module path
        .with_level(true) // Include log level
        .with_file(false) // Omit file name
        .with_line_number(false) // Omit line number
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init();
}

//! Process-wide logging setup shared by every binary embedding the workflow.

/// Initialize tracing with the format from `HEMAFLOW_LOG_FORMAT`.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with(tracing::LogFormat::from_env());
}

/// Subscriber configuration (filters, output format).
pub mod tracing;

pub use tracing::LogFormat;

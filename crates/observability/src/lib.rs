//! Tracing and logging setup shared by the catalog binaries.

pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize process-wide logging from `RUST_LOG` and `LOG_FORMAT`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    let format = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|v| LogFormat::parse(&v))
        .unwrap_or_default();
    crate::tracing::init(format);
}

//! Process-wide logging setup.

pub mod tracing;

pub use crate::tracing::{LogFormat, LogSettings};

/// Install the default subscriber: JSON lines, `RUST_LOG` or `info`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    tracing::init(&LogSettings::default());
}

/// Install a subscriber configured from the `[log]` config section.
pub fn init_with(settings: &LogSettings) {
    tracing::init(settings);
}

//! Optional observability hooks for the execution pipeline.
//!
//! Enable the `tracing` feature to emit debug events named
//! `power_platform_api.request` with `stage` (call site) and `detail` fields.
//! Without the feature every helper compiles to a no-op; the core never logs
//! and never swallows errors on its own.

// self
use crate::_prelude::*;

/// Emits a debug event for the given pipeline stage (when enabled).
pub(crate) fn debug_event(stage: &'static str, detail: impl Display) {
	#[cfg(feature = "tracing")]
	tracing::debug!(stage, detail = %detail, "power_platform_api.request");

	#[cfg(not(feature = "tracing"))]
	let _ = (stage, detail);
}

//! Optional observability helpers for sync flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `timeoff_hub.sync` with the `kind` (flow) and
//!   `stage` (call site) fields.
//! - Enable `metrics` to increment the `timeoff_hub_sync_total` counter for every
//!   attempt/success/skip/failure, labeled by `kind` + `outcome`.
//!
//! This layer is process-local instrumentation; the durable counters consumed
//! by operators live in [`crate::metrics`].

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Sync flow kinds observed by the hub.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyncKind {
	/// Per-event time-off create/update flow.
	Timeoff,
	/// Per-event time-off deletion flow.
	TimeoffDelete,
	/// Windowed periodic time-off sweep.
	TimeoffWindow,
	/// Onboarding person upsert flow.
	Onboarding,
}
impl SyncKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SyncKind::Timeoff => "timeoff",
			SyncKind::TimeoffDelete => "timeoff_delete",
			SyncKind::TimeoffWindow => "timeoff_window",
			SyncKind::Onboarding => "onboarding",
		}
	}
}
impl Display for SyncKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyncOutcomeLabel {
	/// Entry to a hub flow.
	Attempt,
	/// Successful completion with a downstream effect.
	Success,
	/// Deliberate non-action.
	Skipped,
	/// Failure propagated back to the caller.
	Failure,
}
impl SyncOutcomeLabel {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SyncOutcomeLabel::Attempt => "attempt",
			SyncOutcomeLabel::Success => "success",
			SyncOutcomeLabel::Skipped => "skipped",
			SyncOutcomeLabel::Failure => "failure",
		}
	}
}
impl Display for SyncOutcomeLabel {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

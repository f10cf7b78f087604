//! Typed outcomes returned by the sync entry points.

// self
use crate::{
	_prelude::*,
	domain::{ApprovalStatus, DownstreamId},
	obs::SyncOutcomeLabel,
};

/// Result of processing one time-off sync event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
	/// A downstream record was created and mapped.
	Created {
		/// Planner-assigned identifier of the new record.
		downstream_id: DownstreamId,
	},
	/// The mapped downstream record was updated in place.
	Updated {
		/// Planner-assigned identifier of the updated record.
		downstream_id: DownstreamId,
	},
	/// Deliberate non-action; never escalated to the delivery transport.
	Skipped {
		/// Why the record was not synchronized.
		reason: SkipReason,
	},
}

/// Result of processing one time-off deletion event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteOutcome {
	/// The downstream record was deleted and the mapping removed.
	Deleted {
		/// Planner-assigned identifier of the deleted record.
		downstream_id: DownstreamId,
	},
	/// Nothing to delete; idempotent success.
	Skipped {
		/// Why nothing was deleted.
		reason: SkipReason,
	},
}

/// Why a sync event resulted in a deliberate non-action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
	/// The source record vanished between enqueue and processing.
	SourceMissing,
	/// The approval status is in the skip set.
	NotApproved {
		/// The offending status.
		status: ApprovalStatus,
	},
	/// Neither the start nor the end date parsed.
	InvalidDates,
	/// The source record carries no usable email.
	MissingEmail,
	/// The subject is not tracked in the resource-planning system.
	PersonNotFound {
		/// Email the lookup was keyed on.
		email: String,
	},
	/// The planner already holds an identical entry.
	DuplicateTimeoff,
	/// No mapping exists for the deletion target.
	NothingToDelete,
}
impl SkipReason {
	/// Returns a stable label suitable for logs and response payloads.
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::SourceMissing => "source_missing",
			Self::NotApproved { .. } => "not_approved",
			Self::InvalidDates => "invalid_dates",
			Self::MissingEmail => "missing_email",
			Self::PersonNotFound { .. } => "person_not_found",
			Self::DuplicateTimeoff => "duplicate_timeoff",
			Self::NothingToDelete => "nothing_to_delete",
		}
	}
}
impl Display for SkipReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Tally of one windowed time-off sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WindowReport {
	/// Records considered by the sweep.
	pub processed: usize,
	/// Downstream creates.
	pub created: usize,
	/// Downstream updates.
	pub updated: usize,
	/// Deliberate non-actions.
	pub skipped: usize,
	/// Per-record failures (recorded, not short-circuiting).
	pub errors: usize,
}

/// Tally of one onboarding sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OnboardingReport {
	/// People considered by the sweep.
	pub processed: usize,
	/// Planner upserts that succeeded.
	pub synced: usize,
	/// People skipped for missing email.
	pub skipped: usize,
	/// Per-person failures (recorded, not short-circuiting).
	pub errors: usize,
}

pub(crate) fn sync_label(result: &Result<SyncOutcome>) -> SyncOutcomeLabel {
	match result {
		Ok(SyncOutcome::Skipped { .. }) => SyncOutcomeLabel::Skipped,
		Ok(_) => SyncOutcomeLabel::Success,
		Err(_) => SyncOutcomeLabel::Failure,
	}
}

pub(crate) fn delete_label(result: &Result<DeleteOutcome>) -> SyncOutcomeLabel {
	match result {
		Ok(DeleteOutcome::Skipped { .. }) => SyncOutcomeLabel::Skipped,
		Ok(_) => SyncOutcomeLabel::Success,
		Err(_) => SyncOutcomeLabel::Failure,
	}
}

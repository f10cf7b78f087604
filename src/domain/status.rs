//! Approval-status model with the exhaustive skip-set check applied before any
//! downstream call is made.

// self
use crate::_prelude::*;

/// Approval state of a time-off record in the HR source system.
///
/// Both `cancelled` and `canceled` spellings occur in source payloads and fold
/// into [`ApprovalStatus::Cancelled`]. Statuses outside the known set are kept
/// verbatim in [`ApprovalStatus::Other`] and pass the filter, matching the
/// documented pass-through policy for unrecognized statuses.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApprovalStatus {
	/// Request was approved and should be synchronized.
	Approved,
	/// Request was denied.
	Denied,
	/// Request was rejected.
	Rejected,
	/// Request was cancelled (either spelling).
	Cancelled,
	/// Request is still a draft.
	Draft,
	/// Request awaits a decision.
	Pending,
	/// Request was withdrawn by the requester.
	Withdrawn,
	/// Unrecognized status, kept verbatim.
	Other(String),
}
impl ApprovalStatus {
	/// Parses a raw status string case-insensitively.
	pub fn parse(raw: &str) -> Self {
		match raw.trim().to_lowercase().as_str() {
			"approved" => Self::Approved,
			"denied" => Self::Denied,
			"rejected" => Self::Rejected,
			"cancelled" | "canceled" => Self::Cancelled,
			"draft" => Self::Draft,
			"pending" => Self::Pending,
			"withdrawn" => Self::Withdrawn,
			_ => Self::Other(raw.trim().to_owned()),
		}
	}

	/// Returns `true` when the record must not be synchronized downstream.
	pub fn is_skipped(&self) -> bool {
		match self {
			Self::Denied
			| Self::Rejected
			| Self::Cancelled
			| Self::Draft
			| Self::Pending
			| Self::Withdrawn => true,
			Self::Approved | Self::Other(_) => false,
		}
	}

	/// Returns a stable label suitable for logs and metrics.
	pub fn as_str(&self) -> &str {
		match self {
			Self::Approved => "approved",
			Self::Denied => "denied",
			Self::Rejected => "rejected",
			Self::Cancelled => "cancelled",
			Self::Draft => "draft",
			Self::Pending => "pending",
			Self::Withdrawn => "withdrawn",
			Self::Other(raw) => raw,
		}
	}
}
impl Display for ApprovalStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl From<String> for ApprovalStatus {
	fn from(value: String) -> Self {
		Self::parse(&value)
	}
}
impl From<ApprovalStatus> for String {
	fn from(value: ApprovalStatus) -> Self {
		value.as_str().to_owned()
	}
}

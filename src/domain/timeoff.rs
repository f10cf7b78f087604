//! Time-off records as read from the HR source system.

// self
use crate::{
	_prelude::*,
	domain::{ApprovalStatus, LeaveCategory, PersonId, TimeoffId, leave_reason, safe_date},
};

/// A time-off record owned by the HR source system.
///
/// The hub only ever reads these; dates are kept in their raw wire form and
/// validated by [`TimeOffRecord::date_window`] so unparseable input surfaces
/// as a deliberate skip instead of a decode failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOffRecord {
	/// Source-system identifier.
	pub id: TimeoffId,
	/// Source-system identifier of the subject person, when supplied.
	pub person_id: Option<PersonId>,
	/// Best known email of the subject (work preferred, personal fallback).
	pub email: Option<String>,
	/// Approval state.
	pub status: ApprovalStatus,
	/// Raw reason/type text used for category and reason derivation.
	pub kind: String,
	/// Raw start date.
	pub start_date: String,
	/// Raw end date.
	pub end_date: String,
	/// Optional free-form note.
	pub note: Option<String>,
}
impl TimeOffRecord {
	/// Derives the downstream leave category from the record's reason text.
	pub fn category(&self) -> LeaveCategory {
		LeaveCategory::classify(&self.kind)
	}

	/// Derives the planner-facing reason label from the record's reason text.
	pub fn reason(&self) -> &'static str {
		leave_reason(&self.kind)
	}

	/// Validates the raw dates into an inclusive `(start, end)` window.
	///
	/// A single parseable date stands in for both ends; `None` means neither
	/// date parsed and the record must be skipped with a validation metric.
	pub fn date_window(&self) -> Option<(Date, Date)> {
		let start = safe_date(&self.start_date);
		let end = safe_date(&self.end_date);

		match (start, end) {
			(Some(start), Some(end)) => Some((start, end)),
			(Some(start), None) => Some((start, start)),
			(None, Some(end)) => Some((end, end)),
			(None, None) => None,
		}
	}
}

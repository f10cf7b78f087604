//! Leave categories and the reason classification applied to source records.

// self
use crate::_prelude::*;

/// Category of a downstream time-off entry.
///
/// The string form doubles as the planner's endpoint path segment, so the set
/// is closed on purpose; unknown source text falls back to [`Self::Leave`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LeaveCategory {
	/// General leave.
	#[default]
	Leave,
	/// Public or company holidays.
	Holidays,
	/// Rostered days off.
	RosteredOff,
}
impl LeaveCategory {
	/// Returns the stable label, which is also the planner endpoint segment.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Leave => "leave",
			Self::Holidays => "holidays",
			Self::RosteredOff => "rostered-off",
		}
	}

	/// Classifies free-form reason/type text from the source system.
	pub fn classify(text: &str) -> Self {
		let lowered = text.to_lowercase();

		if lowered.contains("holiday") {
			return Self::Holidays;
		}
		if lowered.contains("rostered") {
			return Self::RosteredOff;
		}

		Self::Leave
	}

	/// Parses a stored label back into a category, defaulting to leave.
	pub fn parse(raw: &str) -> Self {
		match raw.trim() {
			"holidays" => Self::Holidays,
			"rostered-off" => Self::RosteredOff,
			_ => Self::Leave,
		}
	}
}
impl Display for LeaveCategory {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl From<String> for LeaveCategory {
	fn from(value: String) -> Self {
		Self::parse(&value)
	}
}
impl From<LeaveCategory> for String {
	fn from(value: LeaveCategory) -> Self {
		value.as_str().to_owned()
	}
}

/// Derives the planner-facing reason label from source reason/type text.
pub fn leave_reason(text: &str) -> &'static str {
	let lowered = text.to_lowercase();

	if lowered.contains("sick") {
		return "Sick leave";
	}
	if lowered.contains("pto") || lowered.contains("vacation") {
		return "Vacation";
	}
	if lowered.contains("bereavement") {
		return "Bereavement";
	}

	"Leave"
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn classification_prefers_specific_categories() {
		assert_eq!(LeaveCategory::classify("Public holiday"), LeaveCategory::Holidays);
		assert_eq!(LeaveCategory::classify("Rostered day off"), LeaveCategory::RosteredOff);
		assert_eq!(LeaveCategory::classify("Annual leave"), LeaveCategory::Leave);
		assert_eq!(LeaveCategory::classify(""), LeaveCategory::Leave);
	}

	#[test]
	fn labels_round_trip_through_serde() {
		let payload = serde_json::to_string(&LeaveCategory::RosteredOff)
			.expect("Category should serialize to JSON.");

		assert_eq!(payload, "\"rostered-off\"");

		let round_trip: LeaveCategory =
			serde_json::from_str(&payload).expect("Serialized category should deserialize.");

		assert_eq!(round_trip, LeaveCategory::RosteredOff);
		assert_eq!(LeaveCategory::parse("unknown"), LeaveCategory::Leave);
	}

	#[test]
	fn reasons_match_source_vocabulary() {
		assert_eq!(leave_reason("Sick day"), "Sick leave");
		assert_eq!(leave_reason("PTO"), "Vacation");
		assert_eq!(leave_reason("vacation time"), "Vacation");
		assert_eq!(leave_reason("Bereavement leave"), "Bereavement");
		assert_eq!(leave_reason("sabbatical"), "Leave");
	}
}

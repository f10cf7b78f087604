//! Person records on both sides of the sync boundary.

// self
use crate::{
	_prelude::*,
	domain::{DownstreamId, PersonId},
};

/// A person as known to the resource-planning system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
	/// Planner-assigned identifier.
	pub id: DownstreamId,
	/// Email used as the case-insensitive lookup key.
	pub email: String,
	/// Display name.
	pub name: String,
}

/// A person as read from the HR source system's onboarding feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePerson {
	/// Source-system identifier.
	pub id: PersonId,
	/// Display name (preferred name over legal name where available).
	pub name: String,
	/// Best known email, when the source holds one.
	pub email: Option<String>,
	/// Employment type text, when the source holds one.
	pub employment_type: Option<String>,
	/// Raw organization start date.
	pub start_date: String,
}

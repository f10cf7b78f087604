//! Strongly typed identifiers enforced across the hub domain.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty or whitespace.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (timeoff, person).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (timeoff, person).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (timeoff, person).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { TimeoffId, "Unique identifier of a time-off record in the HR source system.", "Timeoff" }
def_id! { PersonId, "Unique identifier of a person in the HR source system.", "Person" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

/// Identifier assigned by the resource-planning system.
///
/// The planner issues numeric ids; the newtype keeps them from being confused
/// with source-system identifiers in mapping code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DownstreamId(pub i64);
impl DownstreamId {
	/// Returns the raw numeric value.
	pub const fn value(self) -> i64 {
		self.0
	}
}
impl Display for DownstreamId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.0, f)
	}
}
impl From<i64> for DownstreamId {
	fn from(value: i64) -> Self {
		Self(value)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_whitespace_and_emptiness() {
		assert!(TimeoffId::new(" t-123").is_err(), "Leading whitespace must be rejected.");
		assert!(TimeoffId::new("t-123 ").is_err(), "Trailing whitespace must be rejected.");
		assert!(TimeoffId::new("").is_err());
		assert!(PersonId::new("with space").is_err());

		let id = TimeoffId::new("t-123").expect("Timeoff fixture should be considered valid.");

		assert_eq!(id.as_ref(), "t-123");
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let payload = "\"timeoff-42\"";
		let id: TimeoffId =
			serde_json::from_str(payload).expect("Timeoff id should deserialize successfully.");

		assert_eq!(id.as_ref(), "timeoff-42");
		assert!(serde_json::from_str::<TimeoffId>("\"with space\"").is_err());
		assert!(serde_json::from_str::<TimeoffId>("\"\"").is_err());
	}

	#[test]
	fn length_limit_is_enforced() {
		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		TimeoffId::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(IDENTIFIER_MAX_LEN + 1);

		assert!(TimeoffId::new(&too_long).is_err());
	}

	#[test]
	fn downstream_id_serializes_transparently() {
		let id = DownstreamId(987);
		let payload =
			serde_json::to_string(&id).expect("Downstream id should serialize to a bare number.");

		assert_eq!(payload, "987");

		let round_trip: DownstreamId = serde_json::from_str(&payload)
			.expect("Serialized downstream id should deserialize from JSON.");

		assert_eq!(round_trip, id);
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<TimeoffId, u8> = HashMap::from_iter([(
			TimeoffId::new("t-123").expect("Timeoff id used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("t-123"), Some(&7));
	}
}

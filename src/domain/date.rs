//! Lenient calendar-date parsing for source payloads.
//!
//! Source records carry dates in a handful of shapes: plain `YYYY-MM-DD`,
//! RFC 3339 date-times, and naive `YYYY-MM-DDTHH:MM:SS` stamps. Each accepted
//! format is tried in order; anything else is an explicit `None`, never a
//! panic or a silently substituted default.

// crates.io
use time::{
	PrimitiveDateTime,
	format_description::{BorrowedFormatItem, well_known::Rfc3339},
	macros::format_description,
};
// self
use crate::_prelude::*;

const DATE_ONLY: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const NAIVE_DATETIME: &[BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Parses a raw date string, returning `None` when no accepted format matches.
///
/// Inputs longer than a bare date get a final retry on their first ten
/// characters, which covers timestamp suffixes the explicit formats above do
/// not enumerate.
pub fn safe_date(raw: &str) -> Option<Date> {
	let view = raw.trim();

	if view.is_empty() {
		return None;
	}
	if let Some(date) = parse_known(view) {
		return Some(date);
	}
	if view.len() > 10 {
		return view.get(..10).and_then(parse_known);
	}

	None
}

/// Formats a date in the canonical `YYYY-MM-DD` wire form.
pub fn format_date(date: Date) -> String {
	date.format(DATE_ONLY).unwrap_or_else(|_| date.to_string())
}

fn parse_known(view: &str) -> Option<Date> {
	if let Ok(date) = Date::parse(view, DATE_ONLY) {
		return Some(date);
	}
	if let Ok(moment) = OffsetDateTime::parse(view, &Rfc3339) {
		return Some(moment.date());
	}
	if let Ok(moment) = PrimitiveDateTime::parse(view, NAIVE_DATETIME) {
		return Some(moment.date());
	}

	None
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::date;
	// self
	use super::*;

	#[test]
	fn canonical_form_parses() {
		assert_eq!(safe_date("2025-10-28"), Some(date!(2025 - 10 - 28)));
		assert_eq!(safe_date(" 2025-10-28 "), Some(date!(2025 - 10 - 28)));
	}

	#[test]
	fn iso_variants_parse() {
		assert_eq!(safe_date("2025-10-28T00:00:00Z"), Some(date!(2025 - 10 - 28)));
		assert_eq!(safe_date("2025-10-28T09:30:00+02:00"), Some(date!(2025 - 10 - 28)));
		assert_eq!(safe_date("2025-10-28T09:30:00"), Some(date!(2025 - 10 - 28)));
	}

	#[test]
	fn prefix_fallback_covers_fractional_seconds() {
		assert_eq!(safe_date("2025-10-28T09:30:00.123456"), Some(date!(2025 - 10 - 28)));
	}

	#[test]
	fn garbage_is_an_explicit_none() {
		assert_eq!(safe_date(""), None);
		assert_eq!(safe_date("next tuesday"), None);
		assert_eq!(safe_date("2025-13-40"), None);
		assert_eq!(safe_date("28/10/2025"), None);
	}

	#[test]
	fn formatting_round_trips() {
		let date = date!(2025 - 01 - 05);

		assert_eq!(format_date(date), "2025-01-05");
		assert_eq!(safe_date(&format_date(date)), Some(date));
	}
}

//! Time-bounded cache of planner person lookups keyed by normalized email.

// self
use crate::{_prelude::*, domain::PersonRecord};

/// Cached lookup results with a fixed time-to-live.
///
/// Negative lookups are cached too: people tracked only in the HR system are
/// a steady-state miss, and re-querying them on every event would thrash the
/// planner API. Liveness is decided by comparing against the entry's stored
/// expiry instant, so concurrent readers never race a wall-clock sweep.
#[derive(Debug)]
pub struct PersonCache {
	ttl: StdDuration,
	entries: RwLock<HashMap<String, CachedLookup>>,
}

#[derive(Clone, Debug)]
struct CachedLookup {
	expires_at: Instant,
	person: Option<PersonRecord>,
}

impl PersonCache {
	/// Default entry time-to-live.
	pub const DEFAULT_TTL: StdDuration = StdDuration::from_secs(300);

	/// Creates a cache whose entries live for `ttl`.
	pub fn new(ttl: StdDuration) -> Self {
		Self { ttl, entries: RwLock::new(HashMap::new()) }
	}

	/// Canonicalizes an email into the cache's case-insensitive key form.
	pub fn normalize_email(email: &str) -> String {
		email.trim().to_lowercase()
	}

	/// Returns the cached lookup result for a normalized key, if still live.
	///
	/// The outer `None` is a cache miss; `Some(None)` is a cached "person not
	/// found" answer.
	pub fn get(&self, key: &str) -> Option<Option<PersonRecord>> {
		let entries = self.entries.read();
		let entry = entries.get(key)?;

		if Instant::now() < entry.expires_at { Some(entry.person.clone()) } else { None }
	}

	/// Stores a lookup result under a normalized key.
	pub fn store(&self, key: String, person: Option<PersonRecord>) {
		let entry = CachedLookup { expires_at: Instant::now() + self.ttl, person };

		self.entries.write().insert(key, entry);
	}

	/// Evicts every entry immediately.
	pub fn clear(&self) {
		self.entries.write().clear();
	}

	/// Drops expired entries, returning how many were removed.
	pub fn cleanup_expired(&self) -> usize {
		let mut entries = self.entries.write();
		let now = Instant::now();
		let before = entries.len();

		entries.retain(|_, entry| now < entry.expires_at);

		before - entries.len()
	}
}
impl Default for PersonCache {
	fn default() -> Self {
		Self::new(Self::DEFAULT_TTL)
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::thread;
	// self
	use super::*;
	use crate::domain::DownstreamId;

	fn person(id: i64) -> PersonRecord {
		PersonRecord { id: DownstreamId(id), email: "a@x.com".into(), name: "Ada".into() }
	}

	#[test]
	fn normalization_folds_case_and_whitespace() {
		assert_eq!(PersonCache::normalize_email("  Ada@X.COM "), "ada@x.com");
	}

	#[test]
	fn live_entries_are_returned_and_misses_are_distinct() {
		let cache = PersonCache::default();

		cache.store("a@x.com".into(), Some(person(1)));
		cache.store("ghost@x.com".into(), None);

		assert_eq!(cache.get("a@x.com"), Some(Some(person(1))));
		assert_eq!(cache.get("ghost@x.com"), Some(None), "Negative lookups are cached.");
		assert_eq!(cache.get("unseen@x.com"), None);
	}

	#[test]
	fn entries_expire_after_the_ttl() {
		let cache = PersonCache::new(StdDuration::from_millis(30));

		cache.store("a@x.com".into(), Some(person(1)));
		thread::sleep(StdDuration::from_millis(50));

		assert_eq!(cache.get("a@x.com"), None);
		assert_eq!(cache.cleanup_expired(), 1);
	}

	#[test]
	fn clear_evicts_everything() {
		let cache = PersonCache::default();

		cache.store("a@x.com".into(), Some(person(1)));
		cache.clear();

		assert_eq!(cache.get("a@x.com"), None);
	}
}

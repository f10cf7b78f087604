//! Thread-safe in-memory [`StateStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	store::{DocumentKey, DocumentVersion, StateStore, StoreFuture, VersionedDocument, WriteOutcome},
};

type DocumentMap = Arc<RwLock<HashMap<DocumentKey, String>>>;

/// Thread-safe backend that keeps documents in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(DocumentMap);
impl MemoryStore {
	fn load_now(map: DocumentMap, key: DocumentKey) -> Option<VersionedDocument> {
		map.read().get(&key).map(|payload| VersionedDocument::new(payload.clone()))
	}

	fn write_now(
		map: DocumentMap,
		key: DocumentKey,
		expected: Option<&DocumentVersion>,
		payload: String,
	) -> WriteOutcome {
		let mut guard = map.write();
		let current = guard.get(&key).map(|stored| DocumentVersion::fingerprint(stored));

		if current.as_ref() != expected {
			return WriteOutcome::VersionMismatch;
		}

		let version = DocumentVersion::fingerprint(&payload);

		guard.insert(key, payload);

		WriteOutcome::Committed(version)
	}
}
impl StateStore for MemoryStore {
	fn load<'a>(&'a self, key: DocumentKey) -> StoreFuture<'a, Option<VersionedDocument>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::load_now(map, key)) })
	}

	fn write<'a>(
		&'a self,
		key: DocumentKey,
		expected: Option<&'a DocumentVersion>,
		payload: String,
	) -> StoreFuture<'a, WriteOutcome> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::write_now(map, key, expected, payload)) })
	}
}

//! Durable blob contracts and built-in backends for the hub's state documents.
//!
//! Two logical documents back the hub: the source→planner id mapping and the
//! sync metrics. Each is one JSON blob replaced atomically on write, guarded
//! by a version fingerprint so concurrent writers are detected instead of
//! silently overwritten.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// crates.io
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Boxed future returned by [`StateStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the hub's durable documents.
///
/// Writes carry the version the caller loaded; a backend must refuse the
/// write when the stored document has moved on, which is what lets the
/// mapping and metrics stores run a load-mutate-persist cycle safely against
/// concurrent executions.
pub trait StateStore
where
	Self: Send + Sync,
{
	/// Fetches the current payload and version of a document, if present.
	fn load<'a>(&'a self, key: DocumentKey) -> StoreFuture<'a, Option<VersionedDocument>>;

	/// Replaces a document if its stored version still matches `expected`.
	///
	/// `expected == None` asserts the document does not exist yet.
	fn write<'a>(
		&'a self,
		key: DocumentKey,
		expected: Option<&'a DocumentVersion>,
		payload: String,
	) -> StoreFuture<'a, WriteOutcome>;
}

/// Identifies one of the hub's durable documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKey {
	/// Source→planner time-off id mapping.
	TimeoffMapping,
	/// Sync counters, last-sync stamps, and the recent-error ring.
	SyncMetrics,
}
impl DocumentKey {
	/// Returns the blob object name the document persists under.
	pub const fn object_name(self) -> &'static str {
		match self {
			Self::TimeoffMapping => "timeoff_mapping.json",
			Self::SyncMetrics => "sync_metrics.json",
		}
	}
}
impl Display for DocumentKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.object_name())
	}
}

/// Opaque version token of a stored document.
///
/// Computed as a SHA-256 fingerprint of the payload, so any backend can
/// derive it from content alone without a native generation counter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentVersion(String);
impl DocumentVersion {
	/// Fingerprints a payload.
	pub fn fingerprint(payload: &str) -> Self {
		use std::fmt::Write;

		let digest = Sha256::digest(payload.as_bytes());
		let hex = digest.iter().fold(String::with_capacity(64), |mut hex, byte| {
			let _ = write!(hex, "{byte:02x}");

			hex
		});

		Self(hex)
	}

	/// Returns the hex form of the fingerprint.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

/// A loaded document together with the version its payload hashes to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionedDocument {
	/// Raw JSON payload.
	pub payload: String,
	/// Version token to pass back on the next write.
	pub version: DocumentVersion,
}
impl VersionedDocument {
	/// Wraps a payload, fingerprinting it.
	pub fn new(payload: String) -> Self {
		let version = DocumentVersion::fingerprint(&payload);

		Self { payload, version }
	}
}

/// Result of a conditional document write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
	/// The expected version matched and the document was replaced.
	Committed(DocumentVersion),
	/// The stored document was modified by another writer.
	VersionMismatch,
}

/// Error type produced by [`StateStore`] implementations and their consumers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced while encoding or decoding a document.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// Conditional writes kept losing against concurrent writers.
	#[error("Gave up updating `{document}` after repeated version conflicts.")]
	Conflict {
		/// Object name of the contended document.
		document: String,
	},
}

//! Durable source→planner id mapping backing the sync core's idempotence.

// self
use crate::{
	_prelude::*,
	domain::{DownstreamId, LeaveCategory, TimeoffId},
	store::{DocumentKey, DocumentVersion, StateStore, StoreError, WriteOutcome},
};

/// Default retention window for aged mapping entries.
pub const DEFAULT_RETENTION_DAYS: u32 = 180;

const CAS_ATTEMPTS: usize = 4;

/// One persisted association between a source record and its planner record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
	/// Planner-assigned time-off identifier.
	pub downstream_id: DownstreamId,
	/// Category the entry was created under; selects the planner endpoint on
	/// update and delete.
	pub category: LeaveCategory,
	/// Subject email at sync time, kept for debugging.
	pub email: String,
	/// Instant the mapping was first created.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Instant the mapping was last touched; drives age-based cleanup.
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}

type MappingDocument = BTreeMap<TimeoffId, MappingEntry>;

/// Write-through store of [`MappingEntry`] keyed by source id.
///
/// Every mutation runs a load-mutate-persist cycle against the backing
/// [`StateStore`] and hands the loaded version back on write, retrying a
/// bounded number of times when another writer got there first. An async gate
/// serializes mutations within the process so retries are only spent on
/// genuinely external writers.
pub struct MappingStore {
	store: Arc<dyn StateStore>,
	gate: AsyncMutex<()>,
}
impl MappingStore {
	/// Creates a mapping store over the provided backend.
	pub fn new(store: Arc<dyn StateStore>) -> Self {
		Self { store, gate: AsyncMutex::new(()) }
	}

	/// Inserts or overwrites the entry for `source_id`.
	///
	/// `created_at` survives overwrites of the same source id; `updated_at`
	/// always moves to now.
	pub async fn add(
		&self,
		source_id: &TimeoffId,
		downstream_id: DownstreamId,
		category: LeaveCategory,
		email: &str,
	) -> Result<MappingEntry, StoreError> {
		let _gate = self.gate.lock().await;

		for _ in 0..CAS_ATTEMPTS {
			let (mut entries, version) = self.load_document().await?;
			let now = OffsetDateTime::now_utc();
			let created_at = entries.get(source_id).map(|entry| entry.created_at).unwrap_or(now);
			let entry = MappingEntry {
				downstream_id,
				category,
				email: email.to_owned(),
				created_at,
				updated_at: now,
			};

			entries.insert(source_id.clone(), entry.clone());

			if self.persist(&entries, version.as_ref()).await? {
				return Ok(entry);
			}
		}

		Err(Self::conflict())
	}

	/// Returns the entry for `source_id`, if one exists.
	pub async fn get(&self, source_id: &TimeoffId) -> Result<Option<MappingEntry>, StoreError> {
		let (entries, _) = self.load_document().await?;

		Ok(entries.get(source_id).cloned())
	}

	/// Deletes the entry for `source_id`; absent entries are a no-op success.
	///
	/// Returns `true` when an entry was actually removed.
	pub async fn remove(&self, source_id: &TimeoffId) -> Result<bool, StoreError> {
		let _gate = self.gate.lock().await;

		for _ in 0..CAS_ATTEMPTS {
			let (mut entries, version) = self.load_document().await?;

			if entries.remove(source_id).is_none() {
				return Ok(false);
			}
			if self.persist(&entries, version.as_ref()).await? {
				return Ok(true);
			}
		}

		Err(Self::conflict())
	}

	/// Removes every entry whose `updated_at` is older than the cutoff.
	///
	/// Intended for a periodic external trigger, not the per-event path.
	pub async fn cleanup_old(&self, max_age_days: u32) -> Result<usize, StoreError> {
		let _gate = self.gate.lock().await;

		for _ in 0..CAS_ATTEMPTS {
			let (mut entries, version) = self.load_document().await?;
			let cutoff = OffsetDateTime::now_utc() - Duration::days(i64::from(max_age_days));
			let before = entries.len();

			entries.retain(|_, entry| entry.updated_at >= cutoff);

			let removed = before - entries.len();

			if removed == 0 {
				return Ok(0);
			}
			if self.persist(&entries, version.as_ref()).await? {
				return Ok(removed);
			}
		}

		Err(Self::conflict())
	}

	/// Returns a snapshot of every entry, keyed by source id.
	pub async fn all(&self) -> Result<BTreeMap<TimeoffId, MappingEntry>, StoreError> {
		let (entries, _) = self.load_document().await?;

		Ok(entries)
	}

	async fn load_document(&self) -> Result<(MappingDocument, Option<DocumentVersion>), StoreError> {
		match self.store.load(DocumentKey::TimeoffMapping).await? {
			Some(document) => {
				let entries =
					serde_json::from_str(&document.payload).map_err(|e| StoreError::Serialization {
						message: format!("Failed to parse {}: {e}", DocumentKey::TimeoffMapping),
					})?;

				Ok((entries, Some(document.version)))
			},
			None => Ok((MappingDocument::new(), None)),
		}
	}

	async fn persist(
		&self,
		entries: &MappingDocument,
		expected: Option<&DocumentVersion>,
	) -> Result<bool, StoreError> {
		let payload =
			serde_json::to_string_pretty(entries).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize {}: {e}", DocumentKey::TimeoffMapping),
			})?;

		match self.store.write(DocumentKey::TimeoffMapping, expected, payload).await? {
			WriteOutcome::Committed(_) => Ok(true),
			WriteOutcome::VersionMismatch => Ok(false),
		}
	}

	fn conflict() -> StoreError {
		StoreError::Conflict { document: DocumentKey::TimeoffMapping.to_string() }
	}
}
impl Debug for MappingStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MappingStore").field("document", &DocumentKey::TimeoffMapping).finish()
	}
}

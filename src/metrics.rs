//! Durable sync counters, last-sync stamps, and the recent-error ring buffer.

// self
use crate::{
	_prelude::*,
	store::{DocumentKey, DocumentVersion, StateStore, StoreError, WriteOutcome},
};

/// Maximum number of retained recent errors.
pub const MAX_RECENT_ERRORS: usize = 100;

const CAS_ATTEMPTS: usize = 4;

/// One captured sync failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
	/// Instant the failure was recorded.
	#[serde(with = "time::serde::rfc3339")]
	pub timestamp: OffsetDateTime,
	/// Failure family, e.g. `timeoff` or `person`.
	pub kind: String,
	/// Human-readable summary.
	pub message: String,
	/// Identifier of the entity being processed, when known.
	pub entity_id: Option<String>,
}

/// RFC 3339 timestamp wrapper usable as a JSON map value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncStamp(#[serde(with = "time::serde::rfc3339")] pub OffsetDateTime);

/// Persisted shape of the metrics document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsState {
	/// Monotonic counters keyed by name.
	#[serde(default)]
	pub counters: BTreeMap<String, u64>,
	/// Last successful sync stamp per label.
	#[serde(default)]
	pub last_sync: BTreeMap<String, SyncStamp>,
	/// Recent failures, oldest first, capped at [`MAX_RECENT_ERRORS`].
	#[serde(default)]
	pub recent_errors: VecDeque<ErrorRecord>,
}

/// Write-through store of [`MetricsState`].
///
/// Same load-mutate-persist discipline as the mapping store: every mutation
/// is flushed before the triggering operation reports success, and writes
/// carry the loaded version so concurrent writers are retried instead of
/// clobbered.
pub struct SyncMetrics {
	store: Arc<dyn StateStore>,
	gate: AsyncMutex<()>,
}
impl SyncMetrics {
	/// Creates a metrics store over the provided backend.
	pub fn new(store: Arc<dyn StateStore>) -> Self {
		Self { store, gate: AsyncMutex::new(()) }
	}

	/// Adds `amount` to the named counter, creating it at zero.
	pub async fn increment(&self, counter: &str, amount: u64) -> Result<(), StoreError> {
		self.mutate(|state| {
			*state.counters.entry(counter.to_owned()).or_insert(0) += amount;
		})
		.await
	}

	/// Appends a failure to the ring and bumps the `{kind}_errors` counter.
	///
	/// The oldest entry is evicted once the ring exceeds its cap; insertion
	/// order is preserved, newest last.
	pub async fn record_error(
		&self,
		kind: &str,
		message: &str,
		entity_id: Option<&str>,
	) -> Result<(), StoreError> {
		let record = ErrorRecord {
			timestamp: OffsetDateTime::now_utc(),
			kind: kind.to_owned(),
			message: message.to_owned(),
			entity_id: entity_id.map(str::to_owned),
		};

		self.mutate(move |state| {
			state.recent_errors.push_back(record.clone());

			while state.recent_errors.len() > MAX_RECENT_ERRORS {
				state.recent_errors.pop_front();
			}

			*state.counters.entry(format!("{kind}_errors")).or_insert(0) += 1;
		})
		.await
	}

	/// Records when the labeled sync last completed.
	pub async fn set_last_sync(
		&self,
		label: &str,
		timestamp: OffsetDateTime,
	) -> Result<(), StoreError> {
		self.mutate(|state| {
			state.last_sync.insert(label.to_owned(), SyncStamp(timestamp));
		})
		.await
	}

	/// Returns a snapshot of every counter.
	pub async fn get_all_counters(&self) -> Result<BTreeMap<String, u64>, StoreError> {
		let (state, _) = self.load_document().await?;

		Ok(state.counters)
	}

	/// Returns the value of one counter, defaulting to zero.
	pub async fn get_counter(&self, counter: &str) -> Result<u64, StoreError> {
		let (state, _) = self.load_document().await?;

		Ok(state.counters.get(counter).copied().unwrap_or(0))
	}

	/// Returns up to `limit` recent failures, newest last.
	pub async fn get_recent_errors(&self, limit: usize) -> Result<Vec<ErrorRecord>, StoreError> {
		let (state, _) = self.load_document().await?;
		let skip = state.recent_errors.len().saturating_sub(limit);

		Ok(state.recent_errors.into_iter().skip(skip).collect())
	}

	/// Returns the last sync stamp for a label.
	pub async fn get_last_sync(&self, label: &str) -> Result<Option<OffsetDateTime>, StoreError> {
		let (state, _) = self.load_document().await?;

		Ok(state.last_sync.get(label).map(|stamp| stamp.0))
	}

	/// Zeroes every counter, leaving stamps and the error ring intact.
	pub async fn reset_counters(&self) -> Result<(), StoreError> {
		self.mutate(|state| {
			state.counters.clear();
		})
		.await
	}

	async fn mutate(&self, apply: impl Fn(&mut MetricsState)) -> Result<(), StoreError> {
		let _gate = self.gate.lock().await;

		for _ in 0..CAS_ATTEMPTS {
			let (mut state, version) = self.load_document().await?;

			apply(&mut state);

			if self.persist(&state, version.as_ref()).await? {
				return Ok(());
			}
		}

		Err(StoreError::Conflict { document: DocumentKey::SyncMetrics.to_string() })
	}

	async fn load_document(&self) -> Result<(MetricsState, Option<DocumentVersion>), StoreError> {
		match self.store.load(DocumentKey::SyncMetrics).await? {
			Some(document) => {
				let state =
					serde_json::from_str(&document.payload).map_err(|e| StoreError::Serialization {
						message: format!("Failed to parse {}: {e}", DocumentKey::SyncMetrics),
					})?;

				Ok((state, Some(document.version)))
			},
			None => Ok((MetricsState::default(), None)),
		}
	}

	async fn persist(
		&self,
		state: &MetricsState,
		expected: Option<&DocumentVersion>,
	) -> Result<bool, StoreError> {
		let payload = serde_json::to_string_pretty(state).map_err(|e| StoreError::Serialization {
			message: format!("Failed to serialize {}: {e}", DocumentKey::SyncMetrics),
		})?;

		match self.store.write(DocumentKey::SyncMetrics, expected, payload).await? {
			WriteOutcome::Committed(_) => Ok(true),
			WriteOutcome::VersionMismatch => Ok(false),
		}
	}
}
impl Debug for SyncMetrics {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SyncMetrics").field("document", &DocumentKey::SyncMetrics).finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;
	use crate::store::MemoryStore;

	fn build_metrics() -> SyncMetrics {
		SyncMetrics::new(Arc::new(MemoryStore::default()))
	}

	#[tokio::test]
	async fn counters_accumulate_from_zero() {
		let metrics = build_metrics();

		metrics.increment("timeoff_synced", 1).await.expect("Increment should persist.");
		metrics.increment("timeoff_synced", 2).await.expect("Increment should persist.");

		assert_eq!(
			metrics.get_counter("timeoff_synced").await.expect("Read should not error."),
			3,
		);
		assert_eq!(
			metrics.get_counter("timeoff_skipped").await.expect("Read should not error."),
			0,
		);
	}

	#[tokio::test]
	async fn error_ring_is_bounded_and_ordered() {
		let metrics = build_metrics();

		for index in 0..150 {
			metrics
				.record_error("timeoff", &format!("failure {index}"), Some("t-1"))
				.await
				.expect("Recording an error should persist.");
		}

		let errors =
			metrics.get_recent_errors(1_000).await.expect("Reading errors should not error.");

		assert_eq!(errors.len(), MAX_RECENT_ERRORS, "The 50 oldest entries are evicted.");
		assert_eq!(errors.first().map(|e| e.message.as_str()), Some("failure 50"));
		assert_eq!(errors.last().map(|e| e.message.as_str()), Some("failure 149"));
		assert_eq!(
			metrics.get_counter("timeoff_errors").await.expect("Read should not error."),
			150,
		);
	}

	#[tokio::test]
	async fn recent_error_limit_returns_the_newest() {
		let metrics = build_metrics();

		for index in 0..5 {
			metrics
				.record_error("person", &format!("failure {index}"), None)
				.await
				.expect("Recording an error should persist.");
		}

		let errors = metrics.get_recent_errors(2).await.expect("Reading errors should not error.");

		assert_eq!(errors.len(), 2);
		assert_eq!(errors.first().map(|e| e.message.as_str()), Some("failure 3"));
		assert_eq!(errors.last().map(|e| e.message.as_str()), Some("failure 4"));
	}

	#[tokio::test]
	async fn last_sync_stamps_round_trip() {
		let metrics = build_metrics();
		let stamp = datetime!(2025-10-28 12:00:00 UTC);

		metrics.set_last_sync("timeoff_event", stamp).await.expect("Stamp should persist.");

		assert_eq!(
			metrics.get_last_sync("timeoff_event").await.expect("Read should not error."),
			Some(stamp),
		);
		assert_eq!(
			metrics.get_last_sync("onboarding").await.expect("Read should not error."),
			None,
		);
	}

	#[tokio::test]
	async fn reset_clears_counters_but_keeps_the_ring() {
		let metrics = build_metrics();

		metrics.increment("timeoff_synced", 4).await.expect("Increment should persist.");
		metrics.record_error("timeoff", "boom", None).await.expect("Record should persist.");
		metrics.reset_counters().await.expect("Reset should persist.");

		assert!(metrics
			.get_all_counters()
			.await
			.expect("Read should not error.")
			.is_empty());
		assert_eq!(
			metrics.get_recent_errors(10).await.expect("Read should not error.").len(),
			1,
		);
	}
}

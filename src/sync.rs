//! Sync core orchestrating source reads, planner writes, and durable state.

pub mod onboarding;
pub mod outcome;
pub mod timeoff;
pub mod window;

pub use outcome::*;

// self
use crate::{
	_prelude::*,
	config::SyncWindows,
	domain::TimeoffId,
	mapping::MappingStore,
	metrics::SyncMetrics,
	obs,
	planner::Planner,
	source::TimeoffSource,
	store::StateStore,
};

/// Coordinates time-off and onboarding syncs against one planner deployment.
///
/// The hub owns the source client, the rate-limited planner facade, and both
/// durable stores, so flow implementations can focus on per-event decisions.
/// Every collaborator is injected at construction; there are no ambient
/// singletons, which keeps tests hermetic and lets suites run in parallel.
pub struct TimeoffHub {
	/// Read-only view of the HR source of truth.
	source: Arc<dyn TimeoffSource>,
	/// Rate-limited, cache-backed planner facade.
	planner: Planner,
	/// Durable source→planner id mapping.
	mapping: MappingStore,
	/// Durable sync counters and error ring.
	metrics: SyncMetrics,
	/// Day windows bounding periodic sweeps and mapping retention.
	windows: SyncWindows,
	entry_guards: Mutex<HashMap<TimeoffId, Arc<AsyncMutex<()>>>>,
}
impl TimeoffHub {
	/// Creates a hub whose durable documents live in the provided store.
	pub fn new(
		source: Arc<dyn TimeoffSource>,
		planner: Planner,
		state: Arc<dyn StateStore>,
	) -> Self {
		Self {
			source,
			planner,
			mapping: MappingStore::new(state.clone()),
			metrics: SyncMetrics::new(state),
			windows: SyncWindows::default(),
			entry_guards: Default::default(),
		}
	}

	/// Overrides the sweep and retention windows.
	pub fn with_windows(mut self, windows: SyncWindows) -> Self {
		self.windows = windows;

		self
	}

	/// Read access to the mapping store for observability endpoints.
	pub fn mapping(&self) -> &MappingStore {
		&self.mapping
	}

	/// Read access to the durable metrics for observability endpoints.
	pub fn metrics(&self) -> &SyncMetrics {
		&self.metrics
	}

	/// Access to the planner facade, e.g. to flush the person cache after
	/// suspected staleness.
	pub fn planner(&self) -> &Planner {
		&self.planner
	}

	/// Drops mapping entries older than the configured retention window.
	///
	/// Meant for a periodic external trigger, not the per-event path.
	pub async fn cleanup_mappings(&self) -> Result<usize> {
		Ok(self.mapping.cleanup_old(self.windows.mapping_retention_days).await?)
	}

	/// Returns (and creates on demand) the singleflight guard for a source id.
	///
	/// Two events for the same entity processed concurrently would otherwise
	/// race the mapping's load-modify-store cycle into duplicate creates.
	pub(crate) fn entry_guard(&self, id: &TimeoffId) -> Arc<AsyncMutex<()>> {
		let mut guards = self.entry_guards.lock();

		guards.entry(id.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}

	/// Records a failure in the durable metrics without masking the original
	/// error when the metrics write itself fails.
	pub(crate) async fn record_failure(&self, kind: &str, entity: Option<&str>, message: &str) {
		if let Err(e) = self.metrics.record_error(kind, message, entity).await {
			obs::warn_non_fatal("metrics_record_error", &e);
		}
	}

	/// Stamps the per-event last-sync label.
	///
	/// Called on success and on skip, never on hard failure, so operators can
	/// tell "still trying" apart from "last known good".
	pub(crate) async fn stamp_timeoff_event(&self) -> Result<()> {
		Ok(self.metrics.set_last_sync("timeoff_event", OffsetDateTime::now_utc()).await?)
	}
}
impl Debug for TimeoffHub {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TimeoffHub")
			.field("planner", &self.planner)
			.field("windows", &self.windows)
			.finish()
	}
}

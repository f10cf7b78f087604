//! Windowed periodic time-off sweep.

// self
use crate::{
	_prelude::*,
	obs::{self, SyncKind, SyncOutcomeLabel, SyncSpan},
	sync::{SyncOutcome, TimeoffHub, WindowReport},
};

impl TimeoffHub {
	/// Sweeps every source record whose start date falls inside the
	/// configured lookback/lookahead window around `reference`.
	///
	/// Each record runs the same pipeline as a webhook event, so the sweep is
	/// idempotent against already-synced state. Per-record failures are
	/// tallied and recorded without aborting the batch.
	pub async fn sync_window(&self, reference: Date) -> Result<WindowReport> {
		const KIND: SyncKind = SyncKind::TimeoffWindow;

		let span = SyncSpan::new(KIND, "sync_window");

		obs::record_sync_outcome(KIND, SyncOutcomeLabel::Attempt);

		let result = span.instrument(self.sync_window_inner(reference)).await;
		let label =
			if result.is_ok() { SyncOutcomeLabel::Success } else { SyncOutcomeLabel::Failure };

		obs::record_sync_outcome(KIND, label);

		result
	}

	async fn sync_window_inner(&self, reference: Date) -> Result<WindowReport> {
		let start = reference - Duration::days(i64::from(self.windows.timeoff_lookback_days));
		let end = reference + Duration::days(i64::from(self.windows.timeoff_lookahead_days));
		let records = match self.source.fetch_timeoff_between(start, end).await {
			Ok(records) => records,
			Err(e) => {
				self.record_failure("timeoff", None, &e.to_string()).await;

				return Err(e.into());
			},
		};
		let mut report = WindowReport { processed: records.len(), ..Default::default() };

		for record in &records {
			match self.run_pipeline(record).await {
				Ok(SyncOutcome::Created { .. }) => report.created += 1,
				Ok(SyncOutcome::Updated { .. }) => report.updated += 1,
				Ok(SyncOutcome::Skipped { .. }) => report.skipped += 1,
				// Already recorded inside the pipeline; the sweep goes on.
				Err(_) => report.errors += 1,
			}
		}

		self.metrics.set_last_sync("timeoff", OffsetDateTime::now_utc()).await?;

		Ok(report)
	}
}

//! Per-event time-off sync and deletion flows.

// self
use crate::{
	_prelude::*,
	domain::{TimeOffRecord, TimeoffId},
	error::{DownstreamError, SourceError},
	obs::{self, SyncKind, SyncOutcomeLabel, SyncSpan},
	planner::TimeoffWrite,
	sync::{DeleteOutcome, SkipReason, SyncOutcome, TimeoffHub, outcome},
};

impl TimeoffHub {
	/// Processes one sync event for a source record id.
	///
	/// Fetches the record, applies the approval filter and date validation,
	/// resolves the subject downstream, then updates the mapped record or
	/// creates and maps a new one. Skips are deliberate outcomes; only
	/// failures worth a redelivery surface as errors.
	pub async fn sync_entry(&self, id: &TimeoffId) -> Result<SyncOutcome> {
		const KIND: SyncKind = SyncKind::Timeoff;

		let span = SyncSpan::new(KIND, "sync_entry");

		obs::record_sync_outcome(KIND, SyncOutcomeLabel::Attempt);

		let result = span.instrument(self.sync_entry_inner(id)).await;

		obs::record_sync_outcome(KIND, outcome::sync_label(&result));

		result
	}

	/// Processes one deletion event for a source record id.
	///
	/// An absent mapping is an idempotent success; a failed downstream delete
	/// leaves the mapping intact so a retry can find it again.
	pub async fn delete_entry(&self, id: &TimeoffId) -> Result<DeleteOutcome> {
		const KIND: SyncKind = SyncKind::TimeoffDelete;

		let span = SyncSpan::new(KIND, "delete_entry");

		obs::record_sync_outcome(KIND, SyncOutcomeLabel::Attempt);

		let result = span.instrument(self.delete_entry_inner(id)).await;

		obs::record_sync_outcome(KIND, outcome::delete_label(&result));

		result
	}

	async fn sync_entry_inner(&self, id: &TimeoffId) -> Result<SyncOutcome> {
		let record = match self.source.fetch_timeoff(id).await {
			Ok(record) => record,
			Err(SourceError::NotFound { .. }) => {
				// A deletion event may have raced the enqueued sync.
				return self.skip_timeoff(SkipReason::SourceMissing).await;
			},
			Err(e) => {
				self.record_failure("timeoff", Some(id.as_ref()), &e.to_string()).await;

				return Err(e.into());
			},
		};

		self.run_pipeline(&record).await
	}

	/// Runs the sync pipeline for an already-fetched record.
	///
	/// Shared between the per-event path and the windowed sweep.
	pub(crate) async fn run_pipeline(&self, record: &TimeOffRecord) -> Result<SyncOutcome> {
		let guard = self.entry_guard(&record.id);
		let _serialized = guard.lock().await;

		if record.status.is_skipped() {
			return self
				.skip_timeoff(SkipReason::NotApproved { status: record.status.clone() })
				.await;
		}

		let Some((starts_at, ends_at)) = record.date_window() else {
			self.record_failure(
				"validation",
				Some(record.id.as_ref()),
				"no parseable start or end date",
			)
			.await;

			return self.skip_timeoff(SkipReason::InvalidDates).await;
		};
		let Some(email) = record.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) else {
			return self.skip_timeoff(SkipReason::MissingEmail).await;
		};
		let person = match self.planner.find_person_by_email(email, true).await {
			Ok(person) => person,
			Err(e) => {
				self.record_failure("timeoff", Some(record.id.as_ref()), &e.to_string()).await;

				return Err(e.into());
			},
		};
		let Some(person) = person else {
			// Expected steady state for HR-only staff.
			return self.skip_timeoff(SkipReason::PersonNotFound { email: email.to_owned() }).await;
		};
		let write = TimeoffWrite {
			person_id: person.id,
			category: record.category(),
			starts_at,
			ends_at,
			reason: record.reason().to_owned(),
			external_ref: Some(record.id.clone()),
			note: record.note.clone(),
		};
		let outcome = match self.mapping.get(&record.id).await? {
			Some(entry) => match self.planner.update_timeoff(entry.downstream_id, &write).await {
				Ok(_) => {
					// Timestamp refresh only; the downstream id is stable
					// across updates.
					self.mapping.add(&record.id, entry.downstream_id, write.category, email).await?;
					self.metrics.increment("timeoff_updated", 1).await?;

					SyncOutcome::Updated { downstream_id: entry.downstream_id }
				},
				Err(DownstreamError::NotFound { .. }) => {
					// The downstream record was removed independently; create
					// a fresh one and remap instead of failing.
					self.create_and_map(record, &write, email).await?
				},
				Err(e) => {
					self.record_failure("timeoff", Some(record.id.as_ref()), &e.to_string()).await;

					return Err(e.into());
				},
			},
			None => self.create_and_map(record, &write, email).await?,
		};

		self.stamp_timeoff_event().await?;

		Ok(outcome)
	}

	async fn create_and_map(
		&self,
		record: &TimeOffRecord,
		write: &TimeoffWrite,
		email: &str,
	) -> Result<SyncOutcome> {
		match self.planner.create_timeoff(write).await {
			Ok(Some(created)) => {
				self.mapping.add(&record.id, created.id, write.category, email).await?;
				self.metrics.increment("timeoff_synced", 1).await?;

				Ok(SyncOutcome::Created { downstream_id: created.id })
			},
			Ok(None) => {
				self.metrics.increment("timeoff_skipped", 1).await?;

				Ok(SyncOutcome::Skipped { reason: SkipReason::DuplicateTimeoff })
			},
			Err(e) => {
				self.record_failure("timeoff", Some(record.id.as_ref()), &e.to_string()).await;

				Err(e.into())
			},
		}
	}

	async fn skip_timeoff(&self, reason: SkipReason) -> Result<SyncOutcome> {
		self.metrics.increment("timeoff_skipped", 1).await?;
		self.stamp_timeoff_event().await?;

		Ok(SyncOutcome::Skipped { reason })
	}

	async fn delete_entry_inner(&self, id: &TimeoffId) -> Result<DeleteOutcome> {
		let guard = self.entry_guard(id);
		let _serialized = guard.lock().await;
		let Some(entry) = self.mapping.get(id).await? else {
			// Already deleted, or never mapped; duplicate deliveries land here.
			self.metrics.increment("timeoff_skipped", 1).await?;
			self.stamp_timeoff_event().await?;

			return Ok(DeleteOutcome::Skipped { reason: SkipReason::NothingToDelete });
		};

		match self.planner.delete_timeoff(entry.downstream_id, entry.category).await {
			Ok(_) => {
				self.mapping.remove(id).await?;
				self.metrics.increment("timeoff_deleted", 1).await?;
				self.stamp_timeoff_event().await?;

				Ok(DeleteOutcome::Deleted { downstream_id: entry.downstream_id })
			},
			Err(e) => {
				// The mapping stays put so a retry can find it again.
				self.record_failure("timeoff", Some(id.as_ref()), &format!("delete failed: {e}"))
					.await;

				Err(e.into())
			},
		}
	}
}

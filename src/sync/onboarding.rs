//! Onboarding sweep upserting newly starting people into the planner.

// self
use crate::{
	_prelude::*,
	domain::safe_date,
	obs::{self, SyncKind, SyncOutcomeLabel, SyncSpan},
	planner::PersonWrite,
	sync::{OnboardingReport, TimeoffHub},
};

impl TimeoffHub {
	/// Upserts every person starting within the onboarding lookahead window.
	///
	/// People without any email cannot be deduplicated downstream and are
	/// skipped. Per-person failures are tallied and recorded without aborting
	/// the batch.
	pub async fn sync_onboarding(&self, reference: Date) -> Result<OnboardingReport> {
		const KIND: SyncKind = SyncKind::Onboarding;

		let span = SyncSpan::new(KIND, "sync_onboarding");

		obs::record_sync_outcome(KIND, SyncOutcomeLabel::Attempt);

		let result = span.instrument(self.sync_onboarding_inner(reference)).await;
		let label =
			if result.is_ok() { SyncOutcomeLabel::Success } else { SyncOutcomeLabel::Failure };

		obs::record_sync_outcome(KIND, label);

		result
	}

	async fn sync_onboarding_inner(&self, reference: Date) -> Result<OnboardingReport> {
		let end = reference + Duration::days(i64::from(self.windows.onboarding_lookahead_days));
		let people = match self.source.people_starting_between(reference, end).await {
			Ok(people) => people,
			Err(e) => {
				self.record_failure("person", None, &e.to_string()).await;

				return Err(e.into());
			},
		};
		let mut report = OnboardingReport { processed: people.len(), ..Default::default() };

		for person in &people {
			let Some(email) = person.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
			else {
				report.skipped += 1;

				continue;
			};
			let name =
				if person.name.trim().is_empty() { email.to_owned() } else { person.name.clone() };
			let write = PersonWrite {
				name,
				email: email.to_owned(),
				employment_type: person
					.employment_type
					.clone()
					.or_else(|| Some("employee".to_owned())),
				starts_at: safe_date(&person.start_date).or(Some(reference)),
			};

			match self.planner.upsert_person(&write).await {
				Ok(_) => {
					self.metrics.increment("person_synced", 1).await?;

					report.synced += 1;
				},
				Err(e) => {
					self.record_failure("person", Some(person.id.as_ref()), &e.to_string()).await;

					report.errors += 1;
				},
			}
		}

		self.metrics.set_last_sync("onboarding", OffsetDateTime::now_utc()).await?;

		Ok(report)
	}
}

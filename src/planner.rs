//! Downstream planner contract plus the rate-limited, cache-backed wrapper
//! the sync core talks to.

#[cfg(feature = "reqwest")] pub mod runn;
#[cfg(feature = "reqwest")] pub use runn::RunnClient;

// self
use crate::{
	_prelude::*,
	domain::{DownstreamId, LeaveCategory, PersonRecord, TimeoffId},
	error::DownstreamError,
	ext::{PersonCache, RateLimiter},
};

/// Boxed future returned by [`PlannerApi`] operations.
pub type PlannerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DownstreamError>> + 'a + Send>>;

/// Raw transport contract over the resource-planning API.
///
/// Implementations perform exactly one HTTP call per method; budgeting and
/// caching live in [`Planner`], so fakes in tests observe the same call
/// pattern the real client would produce.
pub trait PlannerApi
where
	Self: Send + Sync,
{
	/// Looks up a person by normalized email; `None` when no match exists.
	fn find_person_by_email<'a>(&'a self, email: &'a str)
	-> PlannerFuture<'a, Option<PersonRecord>>;

	/// Creates a person; `None` when the planner reports a duplicate.
	fn create_person<'a>(&'a self, request: &'a PersonWrite)
	-> PlannerFuture<'a, Option<PersonRecord>>;

	/// Updates an existing person.
	fn update_person<'a>(
		&'a self,
		id: DownstreamId,
		request: &'a PersonWrite,
	) -> PlannerFuture<'a, PersonRecord>;

	/// Creates a time-off entry; `None` when an identical entry already
	/// exists and the call should be treated as a skip.
	fn create_timeoff<'a>(
		&'a self,
		request: &'a TimeoffWrite,
	) -> PlannerFuture<'a, Option<TimeoffAssignment>>;

	/// Updates an existing time-off entry.
	///
	/// Fails with [`DownstreamError::NotFound`] when the entry vanished,
	/// which callers use to fall back to create-and-remap.
	fn update_timeoff<'a>(
		&'a self,
		id: DownstreamId,
		request: &'a TimeoffWrite,
	) -> PlannerFuture<'a, TimeoffAssignment>;

	/// Deletes a time-off entry; `Ok(false)` when it was already absent.
	fn delete_timeoff<'a>(
		&'a self,
		id: DownstreamId,
		category: LeaveCategory,
	) -> PlannerFuture<'a, bool>;
}

/// Payload for creating or updating a downstream time-off entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TimeoffWrite {
	/// Planner person the entry belongs to.
	pub person_id: DownstreamId,
	/// Category selecting the planner endpoint.
	pub category: LeaveCategory,
	/// Inclusive start date.
	pub starts_at: Date,
	/// Inclusive end date.
	pub ends_at: Date,
	/// Reason label shown in the planner.
	pub reason: String,
	/// Source-system reference carried for traceability.
	pub external_ref: Option<TimeoffId>,
	/// Optional free-form note.
	pub note: Option<String>,
}

/// Payload for creating or updating a downstream person.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PersonWrite {
	/// Display name.
	pub name: String,
	/// Email; the planner's dedupe key.
	pub email: String,
	/// Employment type, defaulting downstream when absent.
	pub employment_type: Option<String>,
	/// Organization start date.
	pub starts_at: Option<Date>,
}

/// Downstream time-off record as returned by the planner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoffAssignment {
	/// Planner-assigned identifier.
	pub id: DownstreamId,
	/// Planner person the entry belongs to, when echoed back.
	#[serde(default, rename = "personId")]
	pub person_id: Option<DownstreamId>,
}

/// Rate-limited, cache-backed facade over a [`PlannerApi`].
pub struct Planner {
	api: Arc<dyn PlannerApi>,
	limiter: RateLimiter,
	cache: PersonCache,
}
impl Planner {
	/// Wraps an API transport with the default budget and cache TTL.
	pub fn new(api: Arc<dyn PlannerApi>) -> Self {
		Self { api, limiter: RateLimiter::default(), cache: PersonCache::default() }
	}

	/// Replaces the rate limiter.
	pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
		self.limiter = limiter;

		self
	}

	/// Replaces the person cache.
	pub fn with_person_cache(mut self, cache: PersonCache) -> Self {
		self.cache = cache;

		self
	}

	/// Looks up a person by email.
	///
	/// With `use_cache`, a live cached answer (including a cached miss) is
	/// returned without a network call; otherwise the lookup is rate-limited
	/// and its result cached under the normalized email either way.
	pub async fn find_person_by_email(
		&self,
		email: &str,
		use_cache: bool,
	) -> Result<Option<PersonRecord>, DownstreamError> {
		let key = PersonCache::normalize_email(email);

		if key.is_empty() {
			return Ok(None);
		}
		if use_cache && let Some(cached) = self.cache.get(&key) {
			return Ok(cached);
		}

		self.limiter.acquire().await;

		let person = self.api.find_person_by_email(&key).await?;

		self.cache.store(key, person.clone());

		Ok(person)
	}

	/// Creates a time-off entry; `Ok(None)` means duplicate-treated-as-skip.
	pub async fn create_timeoff(
		&self,
		request: &TimeoffWrite,
	) -> Result<Option<TimeoffAssignment>, DownstreamError> {
		self.limiter.acquire().await;
		self.api.create_timeoff(request).await
	}

	/// Updates a time-off entry.
	pub async fn update_timeoff(
		&self,
		id: DownstreamId,
		request: &TimeoffWrite,
	) -> Result<TimeoffAssignment, DownstreamError> {
		self.limiter.acquire().await;
		self.api.update_timeoff(id, request).await
	}

	/// Deletes a time-off entry; already-absent entries are a success.
	pub async fn delete_timeoff(
		&self,
		id: DownstreamId,
		category: LeaveCategory,
	) -> Result<bool, DownstreamError> {
		self.limiter.acquire().await;
		self.api.delete_timeoff(id, category).await
	}

	/// Creates a person, updating the existing record on a duplicate.
	pub async fn upsert_person(
		&self,
		request: &PersonWrite,
	) -> Result<PersonRecord, DownstreamError> {
		self.limiter.acquire().await;

		if let Some(created) = self.api.create_person(request).await? {
			self.cache.store(PersonCache::normalize_email(&created.email), Some(created.clone()));

			return Ok(created);
		}

		// Duplicate: resolve the existing record and patch it instead.
		let existing = self.find_person_by_email(&request.email, false).await?;
		let Some(existing) = existing else {
			return Err(DownstreamError::Client {
				status: 409,
				message: format!(
					"planner reported `{}` as a duplicate but no person matches that email",
					request.email,
				),
			});
		};

		self.limiter.acquire().await;

		let updated = self.api.update_person(existing.id, request).await?;

		self.cache.store(PersonCache::normalize_email(&updated.email), Some(updated.clone()));

		Ok(updated)
	}

	/// Evicts every cached person lookup immediately.
	pub fn clear_cache(&self) {
		self.cache.clear();
	}
}
impl Debug for Planner {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Planner").field("limiter", &self.limiter).finish()
	}
}
impl From<Arc<dyn PlannerApi>> for Planner {
	fn from(api: Arc<dyn PlannerApi>) -> Self {
		Self::new(api)
	}
}

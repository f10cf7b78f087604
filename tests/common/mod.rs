//! Shared fakes and fixtures for integration tests.

#![allow(dead_code)]

// std
use std::{
	collections::HashMap,
	sync::Arc,
	time::Duration as StdDuration,
};
// crates.io
use parking_lot::Mutex;
// self
use timeoff_hub::{
	domain::{
		ApprovalStatus, DownstreamId, LeaveCategory, PersonRecord, SourcePerson, TimeOffRecord,
		TimeoffId,
	},
	error::{DownstreamError, SourceError},
	ext::{PersonCache, RateLimiter},
	planner::{PersonWrite, Planner, PlannerApi, PlannerFuture, TimeoffAssignment, TimeoffWrite},
	source::{SourceFuture, TimeoffSource},
	store::MemoryStore,
	sync::TimeoffHub,
};

/// Builds a validated source id from a fixture literal.
pub fn timeoff_id(raw: &str) -> TimeoffId {
	TimeoffId::new(raw).expect("Timeoff fixture id should be valid.")
}

/// Builds an approved record with parseable dates.
pub fn approved_record(id: &str, email: &str, start: &str, end: &str) -> TimeOffRecord {
	TimeOffRecord {
		id: timeoff_id(id),
		person_id: None,
		email: Some(email.to_owned()),
		status: ApprovalStatus::Approved,
		kind: "Vacation".into(),
		start_date: start.to_owned(),
		end_date: end.to_owned(),
		note: None,
	}
}

/// In-memory [`TimeoffSource`] with mutable fixtures.
#[derive(Default)]
pub struct FakeSource {
	records: Mutex<HashMap<TimeoffId, TimeOffRecord>>,
	people: Mutex<Vec<SourcePerson>>,
}
impl FakeSource {
	pub fn insert(&self, record: TimeOffRecord) {
		self.records.lock().insert(record.id.clone(), record);
	}

	pub fn remove(&self, id: &TimeoffId) {
		self.records.lock().remove(id);
	}

	pub fn insert_person(&self, person: SourcePerson) {
		self.people.lock().push(person);
	}
}
impl TimeoffSource for FakeSource {
	fn fetch_timeoff<'a>(&'a self, id: &'a TimeoffId) -> SourceFuture<'a, TimeOffRecord> {
		let found = self.records.lock().get(id).cloned();

		Box::pin(async move {
			found.ok_or_else(|| SourceError::NotFound { id: id.to_string() })
		})
	}

	fn fetch_timeoff_between<'a>(
		&'a self,
		_start: time::Date,
		_end: time::Date,
	) -> SourceFuture<'a, Vec<TimeOffRecord>> {
		let mut records: Vec<_> = self.records.lock().values().cloned().collect();

		records.sort_by(|a, b| a.id.cmp(&b.id));

		Box::pin(async move { Ok(records) })
	}

	fn people_starting_between<'a>(
		&'a self,
		_start: time::Date,
		_end: time::Date,
	) -> SourceFuture<'a, Vec<SourcePerson>> {
		let people = self.people.lock().clone();

		Box::pin(async move { Ok(people) })
	}
}

/// Per-method call counters recorded by [`FakePlanner`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
	pub find_person: usize,
	pub create_person: usize,
	pub update_person: usize,
	pub create_timeoff: usize,
	pub update_timeoff: usize,
	pub delete_timeoff: usize,
}

/// In-memory [`PlannerApi`] that records calls and supports injected failures.
#[derive(Default)]
pub struct FakePlanner {
	people: Mutex<HashMap<String, PersonRecord>>,
	timeoffs: Mutex<HashMap<i64, TimeoffWrite>>,
	next_id: Mutex<i64>,
	calls: Mutex<CallCounts>,
	duplicate_next_create: Mutex<bool>,
	fail_next_delete: Mutex<bool>,
	fail_next_create: Mutex<bool>,
}
impl FakePlanner {
	pub fn insert_person(&self, email: &str, id: i64, name: &str) {
		self.people.lock().insert(
			email.to_lowercase(),
			PersonRecord { id: DownstreamId(id), email: email.to_owned(), name: name.to_owned() },
		);
	}

	pub fn calls(&self) -> CallCounts {
		*self.calls.lock()
	}

	pub fn timeoff(&self, id: DownstreamId) -> Option<TimeoffWrite> {
		self.timeoffs.lock().get(&id.value()).cloned()
	}

	pub fn timeoff_count(&self) -> usize {
		self.timeoffs.lock().len()
	}

	/// Drops a downstream record behind the hub's back, simulating an
	/// independent deletion that leaves the mapping dangling.
	pub fn drop_timeoff(&self, id: DownstreamId) {
		self.timeoffs.lock().remove(&id.value());
	}

	pub fn duplicate_next_create(&self) {
		*self.duplicate_next_create.lock() = true;
	}

	pub fn fail_next_delete(&self) {
		*self.fail_next_delete.lock() = true;
	}

	pub fn fail_next_create(&self) {
		*self.fail_next_create.lock() = true;
	}

	fn allocate_id(&self) -> i64 {
		let mut next = self.next_id.lock();

		*next += 1;

		*next + 100
	}

	fn transient() -> DownstreamError {
		DownstreamError::Transient { message: "HTTP 503".into(), status: Some(503), retry_after: None }
	}
}
impl PlannerApi for FakePlanner {
	fn find_person_by_email<'a>(
		&'a self,
		email: &'a str,
	) -> PlannerFuture<'a, Option<PersonRecord>> {
		self.calls.lock().find_person += 1;

		let found = self.people.lock().get(email).cloned();

		Box::pin(async move { Ok(found) })
	}

	fn create_person<'a>(
		&'a self,
		request: &'a PersonWrite,
	) -> PlannerFuture<'a, Option<PersonRecord>> {
		self.calls.lock().create_person += 1;

		let key = request.email.to_lowercase();
		let result = {
			let mut people = self.people.lock();

			if people.contains_key(&key) {
				None
			} else {
				let person = PersonRecord {
					id: DownstreamId(self.allocate_id()),
					email: request.email.clone(),
					name: request.name.clone(),
				};

				people.insert(key, person.clone());

				Some(person)
			}
		};

		Box::pin(async move { Ok(result) })
	}

	fn update_person<'a>(
		&'a self,
		id: DownstreamId,
		request: &'a PersonWrite,
	) -> PlannerFuture<'a, PersonRecord> {
		self.calls.lock().update_person += 1;

		let updated = PersonRecord {
			id,
			email: request.email.clone(),
			name: request.name.clone(),
		};

		self.people.lock().insert(request.email.to_lowercase(), updated.clone());

		Box::pin(async move { Ok(updated) })
	}

	fn create_timeoff<'a>(
		&'a self,
		request: &'a TimeoffWrite,
	) -> PlannerFuture<'a, Option<TimeoffAssignment>> {
		self.calls.lock().create_timeoff += 1;

		if std::mem::take(&mut *self.fail_next_create.lock()) {
			return Box::pin(async move { Err(Self::transient()) });
		}
		if std::mem::take(&mut *self.duplicate_next_create.lock()) {
			return Box::pin(async move { Ok(None) });
		}

		let id = self.allocate_id();

		self.timeoffs.lock().insert(id, request.clone());

		Box::pin(async move {
			Ok(Some(TimeoffAssignment {
				id: DownstreamId(id),
				person_id: Some(request.person_id),
			}))
		})
	}

	fn update_timeoff<'a>(
		&'a self,
		id: DownstreamId,
		request: &'a TimeoffWrite,
	) -> PlannerFuture<'a, TimeoffAssignment> {
		self.calls.lock().update_timeoff += 1;

		let exists = self.timeoffs.lock().contains_key(&id.value());

		if exists {
			self.timeoffs.lock().insert(id.value(), request.clone());
		}

		Box::pin(async move {
			if exists {
				Ok(TimeoffAssignment { id, person_id: Some(request.person_id) })
			} else {
				Err(DownstreamError::NotFound { id: id.value() })
			}
		})
	}

	fn delete_timeoff<'a>(
		&'a self,
		id: DownstreamId,
		_category: LeaveCategory,
	) -> PlannerFuture<'a, bool> {
		self.calls.lock().delete_timeoff += 1;

		if std::mem::take(&mut *self.fail_next_delete.lock()) {
			return Box::pin(async move { Err(Self::transient()) });
		}

		let existed = self.timeoffs.lock().remove(&id.value()).is_some();

		Box::pin(async move { Ok(existed) })
	}
}

/// Everything a sync test needs, wired through in-memory backends.
pub struct TestHub {
	pub source: Arc<FakeSource>,
	pub api: Arc<FakePlanner>,
	pub state: Arc<MemoryStore>,
	pub hub: TimeoffHub,
}

/// Builds a hub over fake clients, a generous rate budget, and memory state.
pub fn build_test_hub() -> TestHub {
	let source = Arc::new(FakeSource::default());
	let api = Arc::new(FakePlanner::default());
	let planner = Planner::new(api.clone())
		.with_rate_limiter(RateLimiter::new(10_000, StdDuration::from_secs(60)))
		.with_person_cache(PersonCache::new(StdDuration::from_secs(300)));
	let state = Arc::new(MemoryStore::default());
	let hub = TimeoffHub::new(source.clone(), planner, state.clone());

	TestHub { source, api, state, hub }
}

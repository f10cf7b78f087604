//! HR source API contract and the ChartHop-backed implementation.
//!
//! The trait is the sync core's only view of the HR system, so tests and
//! alternative deployments can substitute their own transport.

#[cfg(feature = "reqwest")] pub mod charthop;
#[cfg(feature = "reqwest")] pub use charthop::CharthopClient;

// self
use crate::{
	_prelude::*,
	domain::{SourcePerson, TimeOffRecord, TimeoffId},
	error::SourceError,
};

/// Boxed future returned by [`TimeoffSource`] operations.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + 'a + Send>>;

/// Read-only contract over the HR source of truth.
pub trait TimeoffSource
where
	Self: Send + Sync,
{
	/// Fetches one time-off record by source id.
	///
	/// Returns [`SourceError::NotFound`] when the record vanished between
	/// event enqueue and processing.
	fn fetch_timeoff<'a>(&'a self, id: &'a TimeoffId) -> SourceFuture<'a, TimeOffRecord>;

	/// Fetches every time-off record whose start date falls inside the
	/// inclusive window.
	fn fetch_timeoff_between<'a>(
		&'a self,
		start: Date,
		end: Date,
	) -> SourceFuture<'a, Vec<TimeOffRecord>>;

	/// Fetches people whose organization start date falls inside the
	/// inclusive window.
	fn people_starting_between<'a>(
		&'a self,
		start: Date,
		end: Date,
	) -> SourceFuture<'a, Vec<SourcePerson>>;
}

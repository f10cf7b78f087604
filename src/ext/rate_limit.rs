//! Sliding-window rate limiting applied to every outbound planner call.

// self
use crate::_prelude::*;

/// Sliding-window limiter that paces calls against a fixed budget.
///
/// [`RateLimiter::acquire`] never fails; when the window is full the caller is
/// parked until the oldest recorded call exits the window. The timestamp
/// ledger lives behind a mutex because multiple event executions share one
/// client within a process. Nothing is persisted; the budget is a courtesy to
/// the downstream API and resets on restart.
#[derive(Debug)]
pub struct RateLimiter {
	max_requests: usize,
	window: StdDuration,
	ledger: Mutex<VecDeque<Instant>>,
}
impl RateLimiter {
	/// Default call budget per window.
	pub const DEFAULT_MAX_REQUESTS: usize = 100;
	/// Default window the budget applies to.
	pub const DEFAULT_WINDOW: StdDuration = StdDuration::from_secs(60);

	/// Creates a limiter allowing `max_requests` calls per `window`.
	pub fn new(max_requests: usize, window: StdDuration) -> Self {
		Self {
			max_requests: max_requests.max(1),
			window,
			ledger: Mutex::new(VecDeque::with_capacity(max_requests.max(1))),
		}
	}

	/// Waits until one more call fits the budget, then records it.
	///
	/// The lock is released while sleeping so concurrent callers queue on the
	/// ledger, not on each other's naps.
	pub async fn acquire(&self) {
		loop {
			let wait = {
				let mut ledger = self.ledger.lock();
				let now = Instant::now();

				while ledger
					.front()
					.is_some_and(|stamp| now.duration_since(*stamp) >= self.window)
				{
					ledger.pop_front();
				}

				if ledger.len() < self.max_requests {
					ledger.push_back(now);

					None
				} else {
					// The oldest entry decides when the next slot frees up.
					ledger
						.front()
						.map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
				}
			};

			match wait {
				None => return,
				Some(delay) if delay.is_zero() => continue,
				Some(delay) => tokio::time::sleep(delay).await,
			}
		}
	}

	/// Returns how many calls currently count against the window.
	pub fn in_window(&self) -> usize {
		let mut ledger = self.ledger.lock();
		let now = Instant::now();

		while ledger.front().is_some_and(|stamp| now.duration_since(*stamp) >= self.window) {
			ledger.pop_front();
		}

		ledger.len()
	}
}
impl Default for RateLimiter {
	fn default() -> Self {
		Self::new(Self::DEFAULT_MAX_REQUESTS, Self::DEFAULT_WINDOW)
	}
}

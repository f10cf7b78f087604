//! Throughput guards wrapped around the downstream client (rate budgeting,
//! person lookups caching).

pub mod person_cache;
pub mod rate_limit;

pub use person_cache::*;
pub use rate_limit::*;

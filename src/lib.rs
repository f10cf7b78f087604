//! Webhook-driven time-off sync hub—propagate HR leave records into resource
//! planning with CAS-guarded state, rate-limited clients, and transport-aware
//! observability.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod error;
pub mod ext;
pub mod mapping;
pub mod metrics;
pub mod obs;
pub mod planner;
pub mod source;
pub mod store;
pub mod sync;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap, VecDeque},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::{Duration as StdDuration, Instant},
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::Client as ReqwestClient;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Date, Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;

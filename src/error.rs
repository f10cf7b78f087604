//! Hub-level error types shared across clients, stores, and the sync core.

// self
use crate::_prelude::*;

/// Hub-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical hub error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// HR source API failure.
	#[error(transparent)]
	Source(#[from] SourceError),
	/// Resource-planning API failure.
	#[error(transparent)]
	Downstream(#[from] DownstreamError),
}
impl Error {
	/// Returns `true` when the delivery transport should redeliver the event.
	///
	/// Skips are never surfaced as errors, so everything here is retried
	/// conservatively except local configuration mistakes, which no amount of
	/// redelivery will fix.
	pub fn should_retry(&self) -> bool {
		!matches!(self, Self::Config(_))
	}
}

/// Configuration and validation failures raised by the hub.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Required environment variable is absent.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// Environment variable holds a value that cannot be parsed.
	#[error("Environment variable `{name}` holds an invalid value.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: BoxError,
	},
	/// Configured base URL cannot be parsed or cannot serve as a base.
	#[error("Configured URL for `{name}` is invalid.")]
	InvalidUrl {
		/// Variable name the URL came from.
		name: &'static str,
		/// Underlying parsing failure, when one exists.
		#[source]
		source: Option<url::ParseError>,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised by the HR source API.
#[derive(Debug, ThisError)]
pub enum SourceError {
	/// Requested record no longer exists upstream.
	///
	/// The sync core treats this as a skip, since a deletion event may have
	/// raced the enqueued sync event.
	#[error("Source record `{id}` was not found.")]
	NotFound {
		/// Source-system identifier of the missing record.
		id: String,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the source API.")]
	Transport {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Source API responded with malformed JSON.
	#[error("Source API returned malformed JSON.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Source API returned an unexpected but classified response.
	#[error("Source API returned an unexpected response: {message}.")]
	Unexpected {
		/// Human-readable summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
impl SourceError {
	/// Wraps a transport-specific network error.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}
}

/// Failures raised by the resource-planning API.
#[derive(Debug, ThisError)]
pub enum DownstreamError {
	/// Downstream record no longer exists.
	///
	/// On update paths this signals a stale mapping; the sync core recreates
	/// the record and remaps instead of failing.
	#[error("Downstream record `{id}` was not found.")]
	NotFound {
		/// Downstream identifier of the missing record.
		id: i64,
	},
	/// Temporary upstream failure; safe for the delivery transport to retry.
	#[error("Downstream API returned a transient failure: {message}.")]
	Transient {
		/// Human-readable summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Credentials were rejected.
	#[error("Downstream API rejected the credentials (HTTP {status}).")]
	Auth {
		/// HTTP status code.
		status: u16,
	},
	/// Request was rejected for a non-auth, non-transient reason.
	#[error("Downstream API rejected the request (HTTP {status}): {message}.")]
	Client {
		/// HTTP status code.
		status: u16,
		/// Body preview or summary supplied by the API.
		message: String,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the downstream API.")]
	Transport {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Downstream API responded with malformed JSON.
	#[error("Downstream API returned malformed JSON.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
impl DownstreamError {
	/// Wraps a transport-specific network error.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}

	/// Returns `true` for failures a redelivered event could recover from.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::Transient { .. } | Self::Transport { .. })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StoreError;
	use std::error::Error as StdError;

	#[test]
	fn store_error_converts_into_hub_error_with_source() {
		let store_error = StoreError::Backend { message: "blob unreachable".into() };
		let hub_error: Error = store_error.clone().into();

		assert!(matches!(hub_error, Error::Storage(_)));
		assert!(hub_error.to_string().contains("blob unreachable"));

		let source = StdError::source(&hub_error)
			.expect("Hub error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn retry_policy_spares_config_errors_only() {
		let config: Error = ConfigError::MissingEnv { name: "RUNN_API_TOKEN" }.into();
		let transient: Error = DownstreamError::Transient {
			message: "HTTP 503".into(),
			status: Some(503),
			retry_after: None,
		}
		.into();
		let client: Error = DownstreamError::Client { status: 422, message: "bad body".into() }.into();

		assert!(!config.should_retry());
		assert!(transient.should_retry());
		assert!(client.should_retry(), "Client errors are escalated conservatively.");
	}

	#[test]
	fn downstream_retryability_is_limited_to_transient_kinds() {
		let transient = DownstreamError::Transient {
			message: "HTTP 429".into(),
			status: Some(429),
			retry_after: Some(Duration::seconds(5)),
		};
		let auth = DownstreamError::Auth { status: 401 };
		let not_found = DownstreamError::NotFound { id: 7 };

		assert!(transient.is_retryable());
		assert!(!auth.is_retryable());
		assert!(!not_found.is_retryable());
	}
}

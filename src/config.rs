//! Environment-backed configuration for the hub's clients and stores.

// std
use std::env;
// self
use crate::{_prelude::*, error::ConfigError, ext::{PersonCache, RateLimiter}};

/// Fully resolved hub configuration.
#[derive(Clone, Debug)]
pub struct HubConfig {
	/// HR source API settings.
	pub source: SourceConfig,
	/// Resource-planning API settings.
	pub planner: PlannerConfig,
	/// Outbound planner call budget.
	pub rate_limit: RateLimitConfig,
	/// Person-cache entry time-to-live.
	pub cache_ttl: StdDuration,
	/// Timeout applied to every outbound HTTP call.
	pub http_timeout: StdDuration,
	/// Day windows bounding periodic syncs and mapping retention.
	pub windows: SyncWindows,
}
impl HubConfig {
	/// Builds the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Ok(Self {
			source: SourceConfig {
				base_url: parse_url("CH_API", env_or("CH_API", "https://api.charthop.com"))?,
				org_id: require_env("CH_ORG_ID")?,
				token: require_env("CH_API_TOKEN")?,
			},
			planner: PlannerConfig {
				base_url: parse_url("RUNN_API", env_or("RUNN_API", "https://api.runn.io"))?,
				token: require_env("RUNN_API_TOKEN")?,
				api_version: env_or("RUNN_API_VERSION", "1.0.0"),
			},
			rate_limit: RateLimitConfig {
				max_requests: env_parsed(
					"RUNN_RATE_LIMIT_MAX_REQUESTS",
					RateLimiter::DEFAULT_MAX_REQUESTS,
				)?,
				window: StdDuration::from_secs(env_parsed(
					"RUNN_RATE_LIMIT_WINDOW_SECONDS",
					RateLimiter::DEFAULT_WINDOW.as_secs(),
				)?),
			},
			cache_ttl: StdDuration::from_secs(env_parsed(
				"RUNN_PERSON_CACHE_TTL_SECONDS",
				PersonCache::DEFAULT_TTL.as_secs(),
			)?),
			http_timeout: StdDuration::from_secs(env_parsed("HTTP_TIMEOUT", 30)?),
			windows: SyncWindows {
				timeoff_lookback_days: env_parsed("RUNN_TIMEOFF_LOOKBACK_DAYS", 7)?,
				timeoff_lookahead_days: env_parsed("RUNN_TIMEOFF_LOOKAHEAD_DAYS", 30)?,
				onboarding_lookahead_days: env_parsed("RUNN_ONBOARDING_LOOKAHEAD_DAYS", 0)?,
				mapping_retention_days: env_parsed(
					"TIMEOFF_MAPPING_RETENTION_DAYS",
					crate::mapping::DEFAULT_RETENTION_DAYS,
				)?,
			},
		})
	}
}

/// HR source API settings.
#[derive(Clone, Debug)]
pub struct SourceConfig {
	/// API base URL.
	pub base_url: Url,
	/// Organization identifier embedded in every endpoint path.
	pub org_id: String,
	/// Bearer token.
	pub token: String,
}

/// Resource-planning API settings.
#[derive(Clone, Debug)]
pub struct PlannerConfig {
	/// API base URL.
	pub base_url: Url,
	/// Bearer token.
	pub token: String,
	/// Value of the `Accept-Version` header.
	pub api_version: String,
}

/// Outbound planner call budget.
#[derive(Clone, Copy, Debug)]
pub struct RateLimitConfig {
	/// Calls allowed per window.
	pub max_requests: usize,
	/// Window the budget applies to.
	pub window: StdDuration,
}
impl Default for RateLimitConfig {
	fn default() -> Self {
		Self { max_requests: RateLimiter::DEFAULT_MAX_REQUESTS, window: RateLimiter::DEFAULT_WINDOW }
	}
}

/// Day windows bounding periodic syncs and mapping retention.
#[derive(Clone, Copy, Debug)]
pub struct SyncWindows {
	/// How far back the windowed time-off sweep reaches.
	pub timeoff_lookback_days: u32,
	/// How far ahead the windowed time-off sweep reaches.
	pub timeoff_lookahead_days: u32,
	/// How far ahead the onboarding sweep reaches.
	pub onboarding_lookahead_days: u32,
	/// Age after which mapping entries are cleaned up.
	pub mapping_retention_days: u32,
}
impl Default for SyncWindows {
	fn default() -> Self {
		Self {
			timeoff_lookback_days: 7,
			timeoff_lookahead_days: 30,
			onboarding_lookahead_days: 0,
			mapping_retention_days: crate::mapping::DEFAULT_RETENTION_DAYS,
		}
	}
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
	match env::var(name) {
		Ok(value) if !value.trim().is_empty() => Ok(value),
		_ => Err(ConfigError::MissingEnv { name }),
	}
}

fn env_or(name: &'static str, default: &str) -> String {
	env::var(name).ok().filter(|value| !value.trim().is_empty()).unwrap_or_else(|| default.to_owned())
}

fn env_parsed<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
	T: FromStr,
	T::Err: 'static + Send + Sync + std::error::Error,
{
	match env::var(name) {
		Ok(value) if !value.trim().is_empty() => value
			.trim()
			.parse()
			.map_err(|e| ConfigError::InvalidEnv { name, source: Box::new(e) }),
		_ => Ok(default),
	}
}

fn parse_url(name: &'static str, raw: String) -> Result<Url, ConfigError> {
	let url =
		Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl { name, source: Some(e) })?;

	if url.cannot_be_a_base() {
		return Err(ConfigError::InvalidUrl { name, source: None });
	}

	Ok(url)
}

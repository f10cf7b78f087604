//! Runn-backed [`PlannerApi`] implementation.
//!
//! Every call is a single authenticated HTTP request carrying the
//! `Accept-Version` header; budgeting and caching live in
//! [`Planner`](crate::planner::Planner). Status mapping: 404 turns into
//! [`DownstreamError::NotFound`] (or an idempotent answer where absence is
//! success), 409 on creates reports a duplicate, 401/403 are auth failures,
//! 408/429/5xx are transient with Retry-After honored when present.

// crates.io
use reqwest::{
	Method, RequestBuilder,
	header::{HeaderMap, RETRY_AFTER},
};
use serde::de::DeserializeOwned;
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	config::PlannerConfig,
	domain::{DownstreamId, LeaveCategory, PersonRecord, format_date},
	error::{ConfigError, DownstreamError},
	planner::{PersonWrite, PlannerApi, PlannerFuture, TimeoffAssignment, TimeoffWrite},
};

const BODY_PREVIEW_LEN: usize = 200;

/// Authenticated reqwest-backed client for the Runn API.
#[derive(Clone)]
pub struct RunnClient {
	http: ReqwestClient,
	base_url: Url,
	token: String,
	api_version: String,
}
impl RunnClient {
	/// Builds a client with its own transport carrying the given timeout.
	pub fn new(config: &PlannerConfig, http_timeout: StdDuration) -> Result<Self, ConfigError> {
		let http = ReqwestClient::builder().timeout(http_timeout).build()?;

		Ok(Self::with_client(http, config))
	}

	/// Wraps an existing [`ReqwestClient`].
	///
	/// The client must already carry a finite timeout; the hub treats
	/// timeouts as transient failures and relies on them firing.
	pub fn with_client(client: ReqwestClient, config: &PlannerConfig) -> Self {
		Self {
			http: client,
			base_url: config.base_url.clone(),
			token: config.token.clone(),
			api_version: config.api_version.clone(),
		}
	}

	fn endpoint(&self, segments: &[&str]) -> Url {
		let mut url = self.base_url.clone();

		if let Ok(mut path) = url.path_segments_mut() {
			path.pop_if_empty().extend(segments);
		}

		url
	}

	fn request(&self, method: Method, url: Url) -> RequestBuilder {
		self.http
			.request(method, url)
			.bearer_auth(&self.token)
			.header("Accept-Version", &self.api_version)
	}

	async fn execute(&self, builder: RequestBuilder) -> Result<ApiResponse, DownstreamError> {
		let response = builder.send().await.map_err(map_send_error)?;
		let status = response.status().as_u16();
		let retry_after = parse_retry_after(response.headers());
		let bytes = response.bytes().await.map_err(DownstreamError::transport)?;

		Ok(ApiResponse { status, retry_after, body: bytes.to_vec() })
	}

	async fn find_person_inner(
		&self,
		email: &str,
	) -> Result<Option<PersonRecord>, DownstreamError> {
		let url = self.endpoint(&["people"]);
		let request = self.request(Method::GET, url).query(&[("email", email)]);
		let response = self.execute(request).await?;

		match response.status {
			200 => {
				let people: Vec<RunnPerson> = response.decode()?;

				Ok(people.into_iter().next().map(|person| person.into_record(email)))
			},
			404 => Ok(None),
			_ => Err(response.classify()),
		}
	}

	async fn create_person_inner(
		&self,
		request: &PersonWrite,
	) -> Result<Option<PersonRecord>, DownstreamError> {
		let url = self.endpoint(&["people"]);
		let builder = self.request(Method::POST, url).json(&PersonPayload::from_write(request));
		let response = self.execute(builder).await?;

		match response.status {
			200 | 201 => {
				let person: RunnPerson = response.decode()?;

				Ok(Some(person.into_record(&request.email)))
			},
			409 => Ok(None),
			_ => Err(response.classify()),
		}
	}

	async fn update_person_inner(
		&self,
		id: DownstreamId,
		request: &PersonWrite,
	) -> Result<PersonRecord, DownstreamError> {
		let url = self.endpoint(&["people", &id.to_string()]);
		let builder = self.request(Method::PATCH, url).json(&PersonPayload::from_write(request));
		let response = self.execute(builder).await?;

		match response.status {
			200 => {
				let person: RunnPerson = response.decode()?;

				Ok(person.into_record(&request.email))
			},
			404 => Err(DownstreamError::NotFound { id: id.value() }),
			_ => Err(response.classify()),
		}
	}

	async fn create_timeoff_inner(
		&self,
		request: &TimeoffWrite,
	) -> Result<Option<TimeoffAssignment>, DownstreamError> {
		let url = self.endpoint(&["time-offs", request.category.as_str()]);
		let builder = self.request(Method::POST, url).json(&TimeoffPayload::from_write(request));
		let response = self.execute(builder).await?;

		match response.status {
			200 | 201 => Ok(Some(response.decode()?)),
			409 => Ok(None),
			_ => Err(response.classify()),
		}
	}

	async fn update_timeoff_inner(
		&self,
		id: DownstreamId,
		request: &TimeoffWrite,
	) -> Result<TimeoffAssignment, DownstreamError> {
		let url = self.endpoint(&["time-offs", request.category.as_str(), &id.to_string()]);
		let builder = self.request(Method::PATCH, url).json(&TimeoffPayload::from_write(request));
		let response = self.execute(builder).await?;

		match response.status {
			200 => response.decode(),
			404 => Err(DownstreamError::NotFound { id: id.value() }),
			_ => Err(response.classify()),
		}
	}

	async fn delete_timeoff_inner(
		&self,
		id: DownstreamId,
		category: LeaveCategory,
	) -> Result<bool, DownstreamError> {
		let url = self.endpoint(&["time-offs", category.as_str(), &id.to_string()]);
		let builder = self.request(Method::DELETE, url);
		let response = self.execute(builder).await?;

		match response.status {
			200 | 204 => Ok(true),
			// Already absent downstream; deletion is idempotent.
			404 => Ok(false),
			_ => Err(response.classify()),
		}
	}
}
impl PlannerApi for RunnClient {
	fn find_person_by_email<'a>(
		&'a self,
		email: &'a str,
	) -> PlannerFuture<'a, Option<PersonRecord>> {
		Box::pin(self.find_person_inner(email))
	}

	fn create_person<'a>(
		&'a self,
		request: &'a PersonWrite,
	) -> PlannerFuture<'a, Option<PersonRecord>> {
		Box::pin(self.create_person_inner(request))
	}

	fn update_person<'a>(
		&'a self,
		id: DownstreamId,
		request: &'a PersonWrite,
	) -> PlannerFuture<'a, PersonRecord> {
		Box::pin(self.update_person_inner(id, request))
	}

	fn create_timeoff<'a>(
		&'a self,
		request: &'a TimeoffWrite,
	) -> PlannerFuture<'a, Option<TimeoffAssignment>> {
		Box::pin(self.create_timeoff_inner(request))
	}

	fn update_timeoff<'a>(
		&'a self,
		id: DownstreamId,
		request: &'a TimeoffWrite,
	) -> PlannerFuture<'a, TimeoffAssignment> {
		Box::pin(self.update_timeoff_inner(id, request))
	}

	fn delete_timeoff<'a>(
		&'a self,
		id: DownstreamId,
		category: LeaveCategory,
	) -> PlannerFuture<'a, bool> {
		Box::pin(self.delete_timeoff_inner(id, category))
	}
}
impl Debug for RunnClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RunnClient")
			.field("base_url", &self.base_url.as_str())
			.field("api_version", &self.api_version)
			.finish()
	}
}

struct ApiResponse {
	status: u16,
	retry_after: Option<Duration>,
	body: Vec<u8>,
}
impl ApiResponse {
	fn decode<T>(&self) -> Result<T, DownstreamError>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|e| DownstreamError::Decode { source: e, status: Some(self.status) })
	}

	fn classify(&self) -> DownstreamError {
		let message = self.body_preview();

		match self.status {
			401 | 403 => DownstreamError::Auth { status: self.status },
			408 | 429 | 500..=599 => DownstreamError::Transient {
				message,
				status: Some(self.status),
				retry_after: self.retry_after,
			},
			_ => DownstreamError::Client { status: self.status, message },
		}
	}

	fn body_preview(&self) -> String {
		let text = String::from_utf8_lossy(&self.body);
		let trimmed = text.trim();

		if trimmed.is_empty() {
			return format!("HTTP {}", self.status);
		}

		trimmed.chars().take(BODY_PREVIEW_LEN).collect()
	}
}

fn map_send_error(error: reqwest::Error) -> DownstreamError {
	if error.is_timeout() {
		return DownstreamError::Transient {
			message: "request timed out".into(),
			status: None,
			retry_after: None,
		};
	}

	DownstreamError::transport(error)
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(secs as i64));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[derive(Debug, Deserialize)]
struct RunnPerson {
	id: i64,
	#[serde(default)]
	email: Option<String>,
	#[serde(default)]
	name: Option<String>,
}
impl RunnPerson {
	fn into_record(self, fallback_email: &str) -> PersonRecord {
		PersonRecord {
			id: DownstreamId(self.id),
			email: self.email.unwrap_or_else(|| fallback_email.to_owned()),
			name: self.name.unwrap_or_default(),
		}
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TimeoffPayload<'a> {
	person_id: i64,
	starts_at: String,
	ends_at: String,
	reason: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	external_ref: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	note: Option<&'a str>,
}
impl<'a> TimeoffPayload<'a> {
	fn from_write(write: &'a TimeoffWrite) -> Self {
		Self {
			person_id: write.person_id.value(),
			starts_at: format_date(write.starts_at),
			ends_at: format_date(write.ends_at),
			reason: &write.reason,
			external_ref: write.external_ref.as_ref().map(AsRef::as_ref),
			note: write.note.as_deref(),
		}
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PersonPayload<'a> {
	name: &'a str,
	email: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	employment_type: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	starts_at: Option<String>,
}
impl<'a> PersonPayload<'a> {
	fn from_write(write: &'a PersonWrite) -> Self {
		Self {
			name: &write.name,
			email: &write.email,
			employment_type: write.employment_type.as_deref(),
			starts_at: write.starts_at.map(format_date),
		}
	}
}

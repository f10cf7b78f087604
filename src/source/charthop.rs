//! ChartHop-backed [`TimeoffSource`] implementation.
//!
//! Endpoints follow the v1 time-off API (`/v1/org/{org}/timeoff`, offset
//! pagination via the page's `next` token) and the v2 people API for the
//! onboarding feed. Email extraction prefers the modern `contacts` list
//! (work, then home) and falls back to the legacy `contact` object.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	config::SourceConfig,
	domain::{ApprovalStatus, PersonId, SourcePerson, TimeOffRecord, TimeoffId, format_date, safe_date},
	error::{ConfigError, SourceError},
	obs,
	source::{SourceFuture, TimeoffSource},
};

const PAGE_SIZE: &str = "200";
const ONBOARD_FIELDS: &str =
	"name,startDateOrg,employmentType,contact.workEmail,contact.personalEmail";

/// Authenticated reqwest-backed client for the ChartHop API.
#[derive(Clone)]
pub struct CharthopClient {
	http: ReqwestClient,
	base_url: Url,
	org_id: String,
	token: String,
}
impl CharthopClient {
	/// Builds a client with its own transport carrying the given timeout.
	pub fn new(config: &SourceConfig, http_timeout: StdDuration) -> Result<Self, ConfigError> {
		let http = ReqwestClient::builder().timeout(http_timeout).build()?;

		Ok(Self::with_client(http, config))
	}

	/// Wraps an existing [`ReqwestClient`].
	///
	/// The client must already carry a finite timeout; the hub treats
	/// timeouts as transient failures and relies on them firing.
	pub fn with_client(client: ReqwestClient, config: &SourceConfig) -> Self {
		Self {
			http: client,
			base_url: config.base_url.clone(),
			org_id: config.org_id.clone(),
			token: config.token.clone(),
		}
	}

	fn endpoint(&self, segments: &[&str]) -> Url {
		let mut url = self.base_url.clone();

		if let Ok(mut path) = url.path_segments_mut() {
			path.pop_if_empty().extend(segments);
		}

		url
	}

	async fn get(&self, url: Url, query: &[(&str, String)]) -> Result<(u16, Vec<u8>), SourceError> {
		let response = self
			.http
			.get(url)
			.bearer_auth(&self.token)
			.query(query)
			.send()
			.await
			.map_err(SourceError::transport)?;
		let status = response.status().as_u16();
		let bytes = response.bytes().await.map_err(SourceError::transport)?;

		Ok((status, bytes.to_vec()))
	}

	async fn fetch_timeoff_inner(&self, id: &TimeoffId) -> Result<TimeOffRecord, SourceError> {
		let url = self.endpoint(&["v1", "org", &self.org_id, "timeoff", id.as_ref()]);
		let (status, bytes) = self.get(url, &[("include", "person".to_owned())]).await?;

		match status {
			200 => decode::<TimeoffPayload>(&bytes, status)?.into_entry().into_record(),
			404 => Err(SourceError::NotFound { id: id.to_string() }),
			_ => Err(SourceError::Unexpected {
				message: format!("HTTP {status} while fetching time-off `{id}`"),
				status: Some(status),
			}),
		}
	}

	async fn fetch_timeoff_between_inner(
		&self,
		start: Date,
		end: Date,
	) -> Result<Vec<TimeOffRecord>, SourceError> {
		let url = self.endpoint(&["v1", "org", &self.org_id, "timeoff"]);
		let mut records = Vec::new();
		let mut offset: Option<String> = None;

		loop {
			let mut query = vec![
				("limit", PAGE_SIZE.to_owned()),
				("include", "person".to_owned()),
				("startDate[gte]", format_date(start)),
				("startDate[lte]", format_date(end)),
			];

			if let Some(token) = &offset {
				query.push(("offset", token.clone()));
			}

			let (status, bytes) = self.get(url.clone(), &query).await?;

			if status != 200 {
				return Err(SourceError::Unexpected {
					message: format!("HTTP {status} while listing time-off records"),
					status: Some(status),
				});
			}

			let page: TimeoffPage = decode(&bytes, status)?;

			if page.data.is_empty() {
				break;
			}

			for entry in page.data {
				match entry.into_record() {
					Ok(record) => records.push(record),
					// Entries with malformed identifiers cannot be synced or
					// retried; dropping them keeps the sweep going.
					Err(e) => obs::warn_non_fatal("charthop_timeoff_page", &e),
				}
			}

			offset = page.next;

			if offset.is_none() {
				break;
			}
		}

		Ok(records)
	}

	async fn people_starting_between_inner(
		&self,
		start: Date,
		end: Date,
	) -> Result<Vec<SourcePerson>, SourceError> {
		let url = self.endpoint(&["v2", "org", &self.org_id, "person"]);
		let mut people = Vec::new();
		let mut offset: Option<String> = None;

		loop {
			let mut query =
				vec![("limit", PAGE_SIZE.to_owned()), ("fields", ONBOARD_FIELDS.to_owned())];

			if let Some(token) = &offset {
				query.push(("from", token.clone()));
			}

			let (status, bytes) = self.get(url.clone(), &query).await?;

			if status != 200 {
				return Err(SourceError::Unexpected {
					message: format!("HTTP {status} while listing people"),
					status: Some(status),
				});
			}

			let page: PersonPage = decode(&bytes, status)?;

			if page.data.is_empty() {
				break;
			}

			for entry in page.data {
				let Some(start_date) = entry.start_date.as_deref().and_then(safe_date) else {
					continue;
				};

				if start_date < start || start_date > end {
					continue;
				}
				match entry.into_person() {
					Ok(person) => people.push(person),
					Err(e) => obs::warn_non_fatal("charthop_person_page", &e),
				}
			}

			offset = page.next;

			if offset.is_none() {
				break;
			}
		}

		Ok(people)
	}
}
impl TimeoffSource for CharthopClient {
	fn fetch_timeoff<'a>(&'a self, id: &'a TimeoffId) -> SourceFuture<'a, TimeOffRecord> {
		Box::pin(self.fetch_timeoff_inner(id))
	}

	fn fetch_timeoff_between<'a>(
		&'a self,
		start: Date,
		end: Date,
	) -> SourceFuture<'a, Vec<TimeOffRecord>> {
		Box::pin(self.fetch_timeoff_between_inner(start, end))
	}

	fn people_starting_between<'a>(
		&'a self,
		start: Date,
		end: Date,
	) -> SourceFuture<'a, Vec<SourcePerson>> {
		Box::pin(self.people_starting_between_inner(start, end))
	}
}
impl Debug for CharthopClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CharthopClient")
			.field("base_url", &self.base_url.as_str())
			.field("org_id", &self.org_id)
			.finish()
	}
}

fn decode<T>(bytes: &[u8], status: u16) -> Result<T, SourceError>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|e| SourceError::Decode { source: e, status: Some(status) })
}

/// Single-record payload; some deployments wrap the entry in `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TimeoffPayload {
	Wrapped { data: TimeoffEntry },
	Bare(TimeoffEntry),
}
impl TimeoffPayload {
	fn into_entry(self) -> TimeoffEntry {
		match self {
			Self::Wrapped { data } => data,
			Self::Bare(entry) => entry,
		}
	}
}

#[derive(Debug, Deserialize)]
struct TimeoffPage {
	#[serde(default)]
	data: Vec<TimeoffEntry>,
	#[serde(default)]
	next: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeoffEntry {
	id: String,
	#[serde(default)]
	person_id: Option<String>,
	#[serde(default)]
	start_date: Option<String>,
	#[serde(default)]
	end_date: Option<String>,
	#[serde(default)]
	status: Option<String>,
	#[serde(default)]
	reason: Option<String>,
	#[serde(default, rename = "type")]
	kind: Option<String>,
	#[serde(default)]
	note: Option<String>,
	#[serde(default)]
	person: Option<PersonPayload>,
}
impl TimeoffEntry {
	fn into_record(self) -> Result<TimeOffRecord, SourceError> {
		let id = TimeoffId::new(&self.id).map_err(|e| SourceError::Unexpected {
			message: format!("Payload carries an invalid time-off id: {e}"),
			status: None,
		})?;
		let person_id = self.person_id.as_deref().and_then(|raw| PersonId::new(raw).ok());
		let email = self.person.as_ref().and_then(PersonPayload::primary_email);
		// Records predating the approval workflow carry no status and were
		// always synced; absence keeps that behavior.
		let status = ApprovalStatus::parse(self.status.as_deref().unwrap_or("approved"));
		let kind = self.reason.or(self.kind).unwrap_or_default();

		Ok(TimeOffRecord {
			id,
			person_id,
			email,
			status,
			kind,
			start_date: self.start_date.unwrap_or_default(),
			end_date: self.end_date.unwrap_or_default(),
			note: self.note,
		})
	}
}

#[derive(Debug, Default, Deserialize)]
struct PersonPayload {
	#[serde(default)]
	contacts: Vec<ContactPayload>,
	#[serde(default)]
	contact: Option<LegacyContact>,
}
impl PersonPayload {
	fn primary_email(&self) -> Option<String> {
		for wanted in ["WORK_EMAIL", "HOME_EMAIL"] {
			if let Some(contact) =
				self.contacts.iter().find(|c| c.kind == wanted && !c.value.trim().is_empty())
			{
				return Some(contact.value.trim().to_owned());
			}
		}

		let legacy = self.contact.as_ref()?;

		[legacy.work_email.as_deref(), legacy.personal_email.as_deref()]
			.into_iter()
			.flatten()
			.map(str::trim)
			.find(|value| !value.is_empty())
			.map(str::to_owned)
	}
}

#[derive(Debug, Deserialize)]
struct ContactPayload {
	#[serde(default, rename = "type")]
	kind: String,
	#[serde(default)]
	value: String,
}

#[derive(Debug, Default, Deserialize)]
struct LegacyContact {
	#[serde(default, alias = "workEmail")]
	#[serde(rename = "workemail")]
	work_email: Option<String>,
	#[serde(default, alias = "personalEmail")]
	#[serde(rename = "personalemail")]
	personal_email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PersonPage {
	#[serde(default)]
	data: Vec<PersonEntry>,
	#[serde(default)]
	next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PersonEntry {
	id: String,
	#[serde(default, rename = "name.full")]
	name_full: Option<String>,
	#[serde(default, rename = "name.first")]
	name_first: Option<String>,
	#[serde(default, rename = "name.last")]
	name_last: Option<String>,
	#[serde(default, rename = "name.pref")]
	name_pref: Option<String>,
	#[serde(default, rename = "name.preflast")]
	name_pref_last: Option<String>,
	#[serde(default, rename = "contact.workEmail")]
	work_email: Option<String>,
	#[serde(default, rename = "contact.personalEmail")]
	personal_email: Option<String>,
	#[serde(default, rename = "startDateOrg")]
	start_date: Option<String>,
	#[serde(default, rename = "employmentType")]
	employment_type: Option<String>,
}
impl PersonEntry {
	fn into_person(self) -> Result<SourcePerson, SourceError> {
		let id = PersonId::new(&self.id).map_err(|e| SourceError::Unexpected {
			message: format!("Payload carries an invalid person id: {e}"),
			status: None,
		})?;
		let first = non_empty(self.name_pref).or_else(|| non_empty(self.name_first));
		let last = non_empty(self.name_pref_last).or_else(|| non_empty(self.name_last));
		let name = non_empty(self.name_full).unwrap_or_else(|| {
			[first, last].into_iter().flatten().collect::<Vec<_>>().join(" ")
		});
		let email = non_empty(self.work_email).or_else(|| non_empty(self.personal_email));

		Ok(SourcePerson {
			id,
			name,
			email,
			employment_type: non_empty(self.employment_type),
			start_date: self.start_date.unwrap_or_default(),
		})
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

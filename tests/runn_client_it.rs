// crates.io
use httpmock::prelude::*;
use serde_json::json;
use time::macros::date;
// self
use timeoff_hub::{
	config::PlannerConfig,
	domain::{DownstreamId, LeaveCategory},
	error::DownstreamError,
	planner::{PlannerApi, RunnClient, TimeoffWrite},
	url::Url,
};

fn build_client(server: &MockServer) -> RunnClient {
	let config = PlannerConfig {
		base_url: Url::parse(&server.base_url()).expect("Mock server URL should parse."),
		token: "runn-token".into(),
		api_version: "1.0.0".into(),
	};

	RunnClient::with_client(timeoff_hub::reqwest::Client::new(), &config)
}

fn leave_write(person_id: i64) -> TimeoffWrite {
	TimeoffWrite {
		person_id: DownstreamId(person_id),
		category: LeaveCategory::Leave,
		starts_at: date!(2025 - 10 - 28),
		ends_at: date!(2025 - 10 - 30),
		reason: "Vacation".into(),
		external_ref: None,
		note: None,
	}
}

#[tokio::test]
async fn person_lookup_sends_auth_headers_and_decodes_the_first_match() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/people")
				.query_param("email", "ada@x.com")
				.header("authorization", "Bearer runn-token")
				.header("accept-version", "1.0.0");
			then.status(200).json_body(json!([
				{ "id": 9, "email": "ada@x.com", "name": "Ada" },
				{ "id": 10, "email": "ada@x.com", "name": "Shadow" },
			]));
		})
		.await;
	let client = build_client(&server);
	let person = client
		.find_person_by_email("ada@x.com")
		.await
		.expect("Lookup should succeed.")
		.expect("A match should be returned.");

	mock.assert_async().await;

	assert_eq!(person.id, DownstreamId(9));
	assert_eq!(person.name, "Ada");
}

#[tokio::test]
async fn person_lookup_miss_is_not_an_error() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/people");
			then.status(200).json_body(json!([]));
		})
		.await;

	let client = build_client(&server);
	let person =
		client.find_person_by_email("ghost@x.com").await.expect("Lookup should succeed.");

	assert_eq!(person, None);
}

#[tokio::test]
async fn timeoff_create_posts_to_the_category_endpoint() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/time-offs/leave")
				.json_body_includes(r#"{ "personId": 9, "startsAt": "2025-10-28" }"#);
			then.status(201).json_body(json!({ "id": 501, "personId": 9 }));
		})
		.await;
	let client = build_client(&server);
	let created = client
		.create_timeoff(&leave_write(9))
		.await
		.expect("Create should succeed.")
		.expect("Create should return the new record.");

	mock.assert_async().await;

	assert_eq!(created.id, DownstreamId(501));
}

#[tokio::test]
async fn duplicate_create_maps_to_a_skip() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/time-offs/leave");
			then.status(409).json_body(json!({ "message": "already exists" }));
		})
		.await;

	let client = build_client(&server);
	let created = client.create_timeoff(&leave_write(9)).await.expect("409 is not an error.");

	assert_eq!(created, None);
}

#[tokio::test]
async fn update_of_a_vanished_record_reports_not_found() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(PATCH).path("/time-offs/leave/501");
			then.status(404);
		})
		.await;

	let client = build_client(&server);
	let error = client
		.update_timeoff(DownstreamId(501), &leave_write(9))
		.await
		.expect_err("A vanished record must surface as not-found.");

	assert!(matches!(error, DownstreamError::NotFound { id: 501 }));
}

#[tokio::test]
async fn delete_is_idempotent_against_absent_records() {
	let server = MockServer::start_async().await;
	let deleted = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/time-offs/holidays/7");
			then.status(204);
		})
		.await;
	let client = build_client(&server);

	assert!(
		client
			.delete_timeoff(DownstreamId(7), LeaveCategory::Holidays)
			.await
			.expect("Delete should succeed."),
	);
	deleted.assert_async().await;

	server
		.mock_async(|when, then| {
			when.method(DELETE).path("/time-offs/leave/8");
			then.status(404);
		})
		.await;

	assert!(
		!client
			.delete_timeoff(DownstreamId(8), LeaveCategory::Leave)
			.await
			.expect("An already-absent record is a success."),
	);
}

#[tokio::test]
async fn throttling_surfaces_as_transient_with_the_retry_hint() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/time-offs/leave");
			then.status(429).header("Retry-After", "7").body("slow down");
		})
		.await;

	let client = build_client(&server);
	let error = client
		.create_timeoff(&leave_write(9))
		.await
		.expect_err("Throttling must surface as an error.");

	match &error {
		DownstreamError::Transient { status, retry_after, .. } => {
			assert_eq!(*status, Some(429));
			assert_eq!(*retry_after, Some(time::Duration::seconds(7)));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
	assert!(error.is_retryable());
}

#[tokio::test]
async fn rejected_credentials_surface_as_auth_errors() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/people");
			then.status(401);
		})
		.await;

	let client = build_client(&server);
	let error = client
		.find_person_by_email("ada@x.com")
		.await
		.expect_err("Rejected credentials must surface as an error.");

	assert!(matches!(error, DownstreamError::Auth { status: 401 }));
	assert!(!error.is_retryable());
}

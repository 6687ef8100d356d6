// crates.io
use httpmock::prelude::*;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use power_platform_api::{
	auth::TEST_MODE_TOKEN,
	client::{ApiClient, ApiRequest, PRODUCT_IDENTIFIER},
	config::CredentialSet,
	error::Error,
	scope::Scope,
	token::Token,
};

fn scope() -> Scope {
	Scope::new("https://service.powerapps.com/.default")
		.expect("Scope fixture should be valid for executor tests.")
}

fn test_mode_client() -> ApiClient {
	ApiClient::new(CredentialSet::test_mode())
		.expect("Test-mode API client should build successfully.")
}

fn request(server: &MockServer, method: Method, path: &str) -> ApiRequest {
	let url = Url::parse(&server.url(path)).expect("Mock server URL should parse successfully.");

	ApiRequest::new(method, url).scope(scope())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Environment {
	name: String,
	region: String,
	capacity: u32,
}

#[tokio::test]
async fn execute_injects_standard_headers_and_decodes() {
	let server = MockServer::start_async().await;
	let client = test_mode_client();
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/environments/dev")
				.header("authorization", format!("Bearer {TEST_MODE_TOKEN}"))
				.header("content-type", "application/json")
				.header("user-agent", PRODUCT_IDENTIFIER);
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"name":"dev","region":"westeurope","capacity":3}"#);
		})
		.await;
	let envelope = client
		.execute(request(&server, Method::GET, "/environments/dev").accept([StatusCode::OK]))
		.await
		.expect("Authenticated request should succeed.");
	let decoded: Environment =
		envelope.decode().expect("Response body should decode into the environment shape.");

	assert_eq!(decoded, Environment {
		name: "dev".into(),
		region: "westeurope".into(),
		capacity: 3,
	});

	mock.assert_async().await;
}

#[tokio::test]
async fn round_trip_preserves_body_fidelity() {
	let server = MockServer::start_async().await;
	let client = test_mode_client();
	let payload =
		Environment { name: "prod".into(), region: "northeurope".into(), capacity: 12 };
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/environments")
				.json_body(serde_json::json!({
					"name": "prod",
					"region": "northeurope",
					"capacity": 12,
				}));
			then.status(201)
				.header("content-type", "application/json")
				.body(serde_json::to_string(&payload).expect("Payload fixture should serialize."));
		})
		.await;
	let decoded: Environment = client
		.execute_into(
			request(&server, Method::POST, "/environments")
				.json(&payload)
				.expect("Request body should serialize.")
				.accept([StatusCode::CREATED]),
		)
		.await
		.expect("Round-trip request should succeed and decode.");

	assert_eq!(decoded, payload);
}

#[tokio::test]
async fn non_2xx_with_body_carries_status_and_body_text() {
	let server = MockServer::start_async().await;
	let client = test_mode_client();
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/environments/missing");
			then.status(404).body("environment does not exist");
		})
		.await;
	let err = client
		.execute(request(&server, Method::GET, "/environments/missing").accept([StatusCode::OK]))
		.await
		.expect_err("A 404 response must fail.");

	match &err {
		Error::Status { status, body } => {
			assert_eq!(*status, StatusCode::NOT_FOUND);
			assert_eq!(body, "environment does not exist");
		},
		other => panic!("Expected a status error, got: {other:?}."),
	}

	assert!(err.to_string().contains("404"));
	assert!(err.to_string().contains("environment does not exist"));
}

#[tokio::test]
async fn non_2xx_with_empty_body_carries_status_only() {
	let server = MockServer::start_async().await;
	let client = test_mode_client();
	let _mock = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/environments/gone");
			then.status(404);
		})
		.await;
	let err = client
		.execute(
			request(&server, Method::DELETE, "/environments/gone")
				.accept([StatusCode::NO_CONTENT]),
		)
		.await
		.expect_err("A 404 response must fail.");

	match &err {
		Error::StatusEmpty { status } => assert_eq!(*status, StatusCode::NOT_FOUND),
		other => panic!("Expected a status-only error, got: {other:?}."),
	}

	assert_eq!(err.to_string(), "Request failed with status 404 Not Found.");
}

#[tokio::test]
async fn unexpected_2xx_status_is_a_distinct_failure() {
	let server = MockServer::start_async().await;
	let client = test_mode_client();
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/environments");
			then.status(201).body("{}");
		})
		.await;
	let err = client
		.execute(request(&server, Method::POST, "/environments").accept([StatusCode::OK]))
		.await
		.expect_err("A 201 response must fail when only 200 is acceptable.");

	match err {
		Error::UnexpectedStatus { expected, received } => {
			assert_eq!(expected, vec![StatusCode::OK]);
			assert_eq!(received, StatusCode::CREATED);
		},
		other => panic!("Expected an unexpected-status error, got: {other:?}."),
	}
}

#[tokio::test]
async fn empty_accept_list_takes_any_2xx() {
	let server = MockServer::start_async().await;
	let client = test_mode_client();
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/environments");
			then.status(202);
		})
		.await;
	let envelope = client
		.execute(request(&server, Method::POST, "/environments"))
		.await
		.expect("Any 2xx should pass when no accept list is declared.");

	assert_eq!(envelope.status, StatusCode::ACCEPTED);
	assert!(envelope.body.is_empty());
}

#[tokio::test]
async fn caller_headers_are_not_overridden() {
	let server = MockServer::start_async().await;
	let client = test_mode_client();
	let mock = server
		.mock_async(|when, then| {
			when.method(PUT)
				.path("/environments/dev")
				.header("authorization", "Bearer caller-token")
				.header("content-type", "text/plain");
			then.status(200).body("ok");
		})
		.await;
	let request = request(&server, Method::PUT, "/environments/dev")
		.header(
			reqwest::header::AUTHORIZATION,
			reqwest::header::HeaderValue::from_static("Bearer caller-token"),
		)
		.header(
			reqwest::header::CONTENT_TYPE,
			reqwest::header::HeaderValue::from_static("text/plain"),
		)
		.accept([StatusCode::OK]);

	client
		.execute(request)
		.await
		.expect("Request with caller-supplied headers should succeed.");

	mock.assert_async().await;
}

#[tokio::test]
async fn empty_token_fails_before_any_send() {
	let server = MockServer::start_async().await;
	let client = test_mode_client();
	let mock = server
		.mock_async(|when, then| {
			when.method(GET);
			then.status(200);
		})
		.await;
	let token = Token::new("", OffsetDateTime::now_utc() + Duration::hours(1));
	let err = client
		.execute_with_token(request(&server, Method::GET, "/environments"), &token)
		.await
		.expect_err("An empty token must fail before dispatch.");

	assert!(matches!(err, Error::EmptyToken));
	assert_eq!(err.to_string(), "Token is empty.");

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn unauthenticated_calls_skip_token_resolution() {
	let server = MockServer::start_async().await;
	// No credentials at all; resolution would fail, so success proves it is skipped.
	let client = ApiClient::new(CredentialSet::default())
		.expect("Credential-free API client should build successfully.");
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/public/version");
			then.status(200).body(r#"{"version":"1.2.3"}"#);
		})
		.await;
	let envelope = client
		.execute_unauthenticated(
			request(&server, Method::GET, "/public/version").accept([StatusCode::OK]),
		)
		.await
		.expect("Unauthenticated request should succeed without credentials.");

	assert_eq!(envelope.text(), r#"{"version":"1.2.3"}"#);

	mock.assert_async().await;
}

#[tokio::test]
async fn underivable_url_without_explicit_scope_fails() {
	let server = MockServer::start_async().await;
	let client = test_mode_client();
	let mock = server
		.mock_async(|when, then| {
			when.method(GET);
			then.status(200);
		})
		.await;
	let url = Url::parse(&server.url("/environments"))
		.expect("Mock server URL should parse successfully.");
	let err = client
		.execute(ApiRequest::new(Method::GET, url).accept([StatusCode::OK]))
		.await
		.expect_err("A localhost URL must not derive a scope.");

	assert!(matches!(err, Error::Scope(_)));

	mock.assert_calls_async(0).await;
}

#![cfg(feature = "reqwest")]

mod common;

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use time::Duration;
// self
use bearer_broker::{
	clock::ManualClock,
	error::{Error, TransportError},
	ext::BearerSigner,
	flows::ReqwestTokenBroker,
	obs::FlowKind,
	reqwest::Client as ReqwestClient,
};
use common::*;

fn reqwest_broker(
	base: &str,
	clock: &ManualClock,
	sleeper: &Arc<RecordingSleeper>,
) -> ReqwestTokenBroker {
	ReqwestTokenBroker::new(credentials(base))
		.with_clock(Arc::new(clock.clone()))
		.with_sleeper(sleeper.clone())
}

async fn mock_endpoint<'a>(
	server: &'a MockServer,
	path: &str,
	status: u16,
	body: String,
) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST).path(path).header("content-type", "application/json");
			then.status(status).header("content-type", "application/json").body(body);
		})
		.await
}

#[tokio::test]
async fn cached_token_is_served_without_network_calls() {
	let server = MockServer::start_async().await;
	let clock = ManualClock::default();
	let sleeper = Arc::new(RecordingSleeper::default());
	let broker = reqwest_broker(&server.base_url(), &clock, &sleeper);
	let token_mock = mock_endpoint(&server, TOKEN_PATH, 200, token_body("t-1", 300, 3_600)).await;
	let first = broker.get_token().await.expect("Authentication should succeed.");

	clock.advance(Duration::seconds(299));

	let second = broker.get_token().await.expect("Cached token should be served.");

	assert_eq!(first, second);
	assert_eq!(first.expose(), "t-1");
	assert_eq!(broker.metrics.cache_hits(), 1);

	token_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn expired_token_calls_only_the_refresh_endpoint() {
	let server = MockServer::start_async().await;
	let clock = ManualClock::default();
	let sleeper = Arc::new(RecordingSleeper::default());
	let broker = reqwest_broker(&server.base_url(), &clock, &sleeper);
	let token_mock = mock_endpoint(&server, TOKEN_PATH, 200, token_body("t-1", 60, 3_600)).await;
	let refresh_mock =
		mock_endpoint(&server, REFRESH_PATH, 200, token_body("t-2", 60, 7_200)).await;

	broker.get_token().await.expect("Authentication should succeed.");
	clock.advance(Duration::seconds(61));

	let token = broker.get_token().await.expect("Refresh should succeed.");

	assert_eq!(token.expose(), "t-2");

	// The refreshed record carries the new refresh lifetime.
	clock.advance(Duration::seconds(3_600));

	let token = broker.get_token().await.expect("Second refresh should succeed.");

	assert_eq!(token.expose(), "t-2");

	token_mock.assert_calls_async(1).await;
	refresh_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn expired_refresh_token_authenticates_again() {
	let server = MockServer::start_async().await;
	let clock = ManualClock::default();
	let sleeper = Arc::new(RecordingSleeper::default());
	let broker = reqwest_broker(&server.base_url(), &clock, &sleeper);
	let token_mock = mock_endpoint(&server, TOKEN_PATH, 200, token_body("t-1", 60, 600)).await;
	let refresh_mock =
		mock_endpoint(&server, REFRESH_PATH, 200, token_body("unused", 60, 600)).await;

	broker.get_token().await.expect("Authentication should succeed.");
	clock.advance(Duration::seconds(600));
	broker.get_token().await.expect("Re-authentication should succeed.");

	token_mock.assert_calls_async(2).await;
	refresh_mock.assert_calls_async(0).await;
	assert_eq!(broker.metrics.authentications(), 2);
}

#[tokio::test]
async fn forbidden_response_is_not_retried() {
	let server = MockServer::start_async().await;
	let clock = ManualClock::default();
	let sleeper = Arc::new(RecordingSleeper::default());
	let broker = reqwest_broker(&server.base_url(), &clock, &sleeper);
	let token_mock = mock_endpoint(
		&server,
		TOKEN_PATH,
		403,
		"{\"message\":\"Account disabled\"}".into(),
	)
	.await;
	let err = broker.get_token().await.expect_err("A 403 should be surfaced.");

	assert!(matches!(err, Error::RequestRejected { flow: FlowKind::Authenticate, status: 403, .. }));
	assert!(sleeper.delays().is_empty());

	token_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn refused_connections_exhaust_retries() {
	let listener =
		std::net::TcpListener::bind("127.0.0.1:0").expect("Ephemeral port should bind.");
	let addr = listener.local_addr().expect("Bound listener should expose its address.");

	drop(listener);

	let clock = ManualClock::default();
	let sleeper = Arc::new(RecordingSleeper::default());
	let broker = reqwest_broker(&format!("http://{addr}"), &clock, &sleeper);
	let err = broker.get_token().await.expect_err("Closed ports should refuse every attempt.");

	assert!(matches!(
		err,
		Error::RetriesExhausted { attempts: 3, ref last }
			if matches!(**last, Error::Transport(TransportError::Network { .. }))
	));
	assert_eq!(sleeper.delays(), vec![Duration::seconds(1), Duration::seconds(2)]);
}

#[tokio::test]
async fn authorize_signs_requests_with_the_current_token() {
	let server = MockServer::start_async().await;
	let clock = ManualClock::default();
	let sleeper = Arc::new(RecordingSleeper::default());
	let broker = reqwest_broker(&server.base_url(), &clock, &sleeper);
	let token_mock = mock_endpoint(&server, TOKEN_PATH, 200, token_body("t-1", 300, 3_600)).await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/orders").header("authorization", "Bearer t-1");
			then.status(200).body("[]");
		})
		.await;
	let client = ReqwestClient::new();
	let response = broker
		.authorize(&BearerSigner, client.get(server.url("/api/v1/orders")))
		.await
		.expect("Signing should succeed.")
		.send()
		.await
		.expect("Signed request should be sent.");

	assert_eq!(response.status().as_u16(), 200);

	token_mock.assert_calls_async(1).await;
	api_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn failed_acquisition_blocks_the_outbound_call() {
	let server = MockServer::start_async().await;
	let clock = ManualClock::default();
	let sleeper = Arc::new(RecordingSleeper::default());
	let broker = reqwest_broker(&server.base_url(), &clock, &sleeper);
	let token_mock = mock_endpoint(&server, TOKEN_PATH, 500, "boom".into()).await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/orders");
			then.status(200).body("[]");
		})
		.await;
	let client = ReqwestClient::new();
	let err = broker
		.authorize(&BearerSigner, client.get(server.url("/api/v1/orders")))
		.await
		.expect_err("Acquisition failure should be returned.");

	assert!(matches!(err, Error::ServerError { status: 500, .. }));

	token_mock.assert_calls_async(1).await;
	api_mock.assert_calls_async(0).await;
}

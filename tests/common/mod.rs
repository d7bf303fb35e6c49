//! Shared fixtures for the acquisition integration tests.

#![allow(dead_code)]

// std
use std::{collections::VecDeque, io, sync::Arc, time::Duration as StdDuration};
// crates.io
use parking_lot::Mutex;
use time::Duration;
// self
use bearer_broker::{
	backoff::BackoffPolicy,
	classify::FlowPolicies,
	clock::{ManualClock, SleepFuture, Sleeper},
	config::AuthCredentials,
	error::{Error, TransportError},
	flows::TokenBroker,
	http::{AuthHttpClient, HttpFuture, HttpReply, JsonRequest, TransportErrorMapper},
	obs::FlowKind,
	url::Url,
};

pub const TOKEN_PATH: &str = "/api/v1/auth/token";
pub const REFRESH_PATH: &str = "/api/v1/auth/refresh-token";
pub const USERNAME: &str = "orders-service";
pub const PASSWORD: &str = "hunter2";

pub type ScriptedBroker = TokenBroker<ScriptedHttpClient, ScriptedTransportErrorMapper>;

/// One scripted reaction of the authentication server.
#[derive(Clone, Debug)]
pub enum Step {
	/// Respond with the status and body.
	Reply(u16, String),
	/// Fail without a response, as if the connection were reset.
	Drop,
}

/// In-process [`AuthHttpClient`] replaying a fixed script and recording every request.
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
	steps: Mutex<VecDeque<Step>>,
	requests: Mutex<Vec<JsonRequest>>,
	latency: StdDuration,
}
impl ScriptedHttpClient {
	pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
		Self { steps: Mutex::new(steps.into_iter().collect()), ..Default::default() }
	}

	pub fn with_latency(mut self, latency: StdDuration) -> Self {
		self.latency = latency;

		self
	}

	pub fn push(&self, step: Step) {
		self.steps.lock().push_back(step);
	}

	pub fn requests(&self) -> Vec<JsonRequest> {
		self.requests.lock().clone()
	}

	pub fn paths(&self) -> Vec<String> {
		self.requests.lock().iter().map(|request| request.endpoint.path().to_owned()).collect()
	}

	pub fn calls_to(&self, path: &str) -> usize {
		self.paths().iter().filter(|called| called.as_str() == path).count()
	}
}
impl AuthHttpClient for ScriptedHttpClient {
	type TransportError = io::Error;

	fn post_json(&self, request: JsonRequest) -> HttpFuture<'_, Self::TransportError> {
		self.requests.lock().push(request);

		let step = self.steps.lock().pop_front();
		let latency = self.latency;

		Box::pin(async move {
			if !latency.is_zero() {
				tokio::time::sleep(latency).await;
			}

			match step {
				Some(Step::Reply(status, body)) => Ok(HttpReply { status, body: body.into_bytes() }),
				Some(Step::Drop) | None =>
					Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection dropped")),
			}
		})
	}
}

/// Maps scripted I/O failures into transport errors.
#[derive(Debug, Default)]
pub struct ScriptedTransportErrorMapper;
impl TransportErrorMapper<io::Error> for ScriptedTransportErrorMapper {
	fn map_transport_error(&self, _: FlowKind, error: io::Error) -> Error {
		TransportError::Io(error).into()
	}
}

/// [`Sleeper`] that records each delay and waits a fixed real-time pause (none by default).
#[derive(Debug, Default)]
pub struct RecordingSleeper {
	delays: Mutex<Vec<Duration>>,
	pause: StdDuration,
}
impl RecordingSleeper {
	pub fn with_pause(mut self, pause: StdDuration) -> Self {
		self.pause = pause;

		self
	}

	pub fn delays(&self) -> Vec<Duration> {
		self.delays.lock().clone()
	}
}
impl Sleeper for RecordingSleeper {
	fn sleep(&self, delay: Duration) -> SleepFuture<'_> {
		self.delays.lock().push(delay);

		let pause = self.pause;

		Box::pin(async move {
			if !pause.is_zero() {
				tokio::time::sleep(pause).await;
			}
		})
	}
}

pub fn credentials(base: &str) -> AuthCredentials {
	let url = |path: &str| Url::parse(&format!("{base}{path}")).expect("Endpoint URL should parse.");

	AuthCredentials::builder()
		.username(USERNAME)
		.password(PASSWORD)
		.token_endpoint(url(TOKEN_PATH))
		.refresh_endpoint(url(REFRESH_PATH))
		.build()
		.expect("Test credentials should be valid.")
}

/// Success body as returned by both endpoints.
pub fn token_body(token: &str, expires_in: u64, refresh_expires_in: u64) -> String {
	serde_json::json!({
		"token": token,
		"refreshToken": format!("{token}-refresh"),
		"expiresIn": expires_in,
		"refreshTokenExpiresIn": refresh_expires_in,
		"scopes": ["orders:read", "orders:write"],
		"userId": "6650f1c2",
		"username": USERNAME,
	})
	.to_string()
}

pub fn ok(token: &str, expires_in: u64, refresh_expires_in: u64) -> Step {
	Step::Reply(200, token_body(token, expires_in, refresh_expires_in))
}

pub struct Harness {
	pub broker: ScriptedBroker,
	pub client: Arc<ScriptedHttpClient>,
	pub clock: ManualClock,
	pub sleeper: Arc<RecordingSleeper>,
}

impl Harness {
	pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
		self.broker = self.broker.with_backoff(backoff);

		self
	}

	pub fn with_flow_policies(mut self, policies: FlowPolicies) -> Self {
		self.broker = self.broker.with_flow_policies(policies);

		self
	}
}

pub fn harness(client: ScriptedHttpClient) -> Harness {
	let client = Arc::new(client);
	let clock = ManualClock::default();
	let sleeper = Arc::new(RecordingSleeper::default());
	let broker = ScriptedBroker::with_http_client(
		credentials("https://auth.example.com"),
		client.clone(),
		Arc::new(ScriptedTransportErrorMapper),
		sleeper.clone(),
	)
	.with_clock(Arc::new(clock.clone()));

	Harness { broker, client, clock, sleeper }
}

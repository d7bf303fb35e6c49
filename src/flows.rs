//! Token acquisition orchestrated by [`TokenBroker`].
//!
//! The broker owns a single cached token record and hands out bearer tokens through
//! [`TokenBroker::get_token`]. Every call is admitted through a single-flight gate, inspects
//! the cache against the injected [`Clock`], and either serves the cached token or performs
//! exactly one remote exchange (authentication or refresh). Retryable failures release the
//! gate, sleep through the [`Sleeper`], and re-enter the whole decision so a concurrent
//! success can satisfy the retrier from cache.

mod acquire;
mod authenticate;
mod common;
mod gate;
mod metrics;
mod refresh;

pub use metrics::AcquisitionMetrics;

// self
use crate::{
	_prelude::*,
	backoff::BackoffPolicy,
	classify::{DefaultErrorClassifier, ErrorClassifier, FlowPolicies},
	clock::{Clock, Sleeper, SystemClock},
	config::AuthCredentials,
	flows::gate::FlightGate,
	http::{AuthHttpClient, TransportErrorMapper},
	token::TokenCache,
};
#[cfg(feature = "reqwest")]
use crate::{
	clock::TokioSleeper,
	http::{ReqwestHttpClient, ReqwestTransportErrorMapper},
};

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport stack.
pub type ReqwestTokenBroker = TokenBroker<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Acquires, caches, and renews the bearer token of one service account.
///
/// Clones share the cache, the gate, and the counters, so a broker can be handed to every
/// task that makes outbound calls.
pub struct TokenBroker<C, M>
where
	C: ?Sized + AuthHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client used for every exchange with the authentication server.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before classification.
	pub transport_mapper: Arc<M>,
	/// Account credentials and endpoints.
	pub credentials: Arc<AuthCredentials>,
	/// Time source used for every expiry decision.
	pub clock: Arc<dyn Clock>,
	/// Sleeper used between retry attempts.
	pub sleeper: Arc<dyn Sleeper>,
	/// Classifier turning failed exchanges into [`FailureKind`](crate::classify::FailureKind)s.
	pub classifier: Arc<dyn ErrorClassifier>,
	/// Per-flow retry policies.
	pub policies: FlowPolicies,
	/// Backoff applied between attempts of one `get_token` call.
	pub backoff: BackoffPolicy,
	/// In-process acquisition counters.
	pub metrics: Arc<AcquisitionMetrics>,
	gate: Arc<FlightGate<TokenCache>>,
}
impl<C, M> TokenBroker<C, M>
where
	C: ?Sized + AuthHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a broker around a caller-provided transport, mapper, and sleeper.
	pub fn with_http_client(
		credentials: AuthCredentials,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
		sleeper: Arc<dyn Sleeper>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			credentials: Arc::new(credentials),
			clock: Arc::new(SystemClock),
			sleeper,
			classifier: Arc::new(DefaultErrorClassifier),
			policies: FlowPolicies::default(),
			backoff: BackoffPolicy::default(),
			metrics: Default::default(),
			gate: Default::default(),
		}
	}

	/// Replaces the time source.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Replaces the sleeper used between attempts.
	pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
		self.sleeper = sleeper;

		self
	}

	/// Replaces the backoff policy.
	pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
		self.backoff = backoff;

		self
	}

	/// Replaces the failure classifier.
	pub fn with_classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
		self.classifier = classifier;

		self
	}

	/// Replaces the per-flow retry policies.
	pub fn with_flow_policies(mut self, policies: FlowPolicies) -> Self {
		self.policies = policies;

		self
	}
}
#[cfg(feature = "reqwest")]
impl TokenBroker<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a broker backed by reqwest and the tokio timer.
	pub fn new(credentials: AuthCredentials) -> Self {
		Self::with_http_client(
			credentials,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
			Arc::new(TokioSleeper),
		)
	}
}
impl<C, M> Clone for TokenBroker<C, M>
where
	C: ?Sized + AuthHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			credentials: self.credentials.clone(),
			clock: self.clock.clone(),
			sleeper: self.sleeper.clone(),
			classifier: self.classifier.clone(),
			policies: self.policies,
			backoff: self.backoff.clone(),
			metrics: self.metrics.clone(),
			gate: self.gate.clone(),
		}
	}
}
impl<C, M> Debug for TokenBroker<C, M>
where
	C: ?Sized + AuthHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenBroker")
			.field("credentials", &self.credentials)
			.field("policies", &self.policies)
			.field("backoff", &self.backoff)
			.field("metrics", &self.metrics)
			.finish()
	}
}

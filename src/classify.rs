//! Failure classification for authentication exchanges.
//!
//! Classification happens in two steps. An [`ErrorClassifier`] turns the raw observation
//! (status code, transport failure, undecodable body) into a [`FailureKind`]; the
//! [`FlowPolicy`] of the flow that failed then decides whether that kind is retried. Keeping
//! the second step per flow is what lets a 401 be retried while authenticating with static
//! credentials yet surface immediately when a refresh token is rejected.

// self
use crate::{_prelude::*, obs::FlowKind};

/// Classifies a failed exchange.
///
/// Implementors must be `Send + Sync`; the hook works on crate-owned data so it stays
/// independent from any HTTP client.
pub trait ErrorClassifier
where
	Self: Send + Sync,
{
	/// Maps the observed failure into a [`FailureKind`].
	fn classify(&self, ctx: &FailureContext) -> FailureKind;
}

/// Canonical failure categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
	/// HTTP 401.
	Unauthorized,
	/// Any other non-2xx status below 500.
	ClientError,
	/// HTTP 5xx.
	ServerError,
	/// No response was received (refused, reset, timed out, I/O).
	Transport,
	/// A 2xx response whose body could not be decoded.
	MalformedResponse,
}
impl FailureKind {
	/// Returns a stable label suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FailureKind::Unauthorized => "unauthorized",
			FailureKind::ClientError => "client_error",
			FailureKind::ServerError => "server_error",
			FailureKind::Transport => "transport",
			FailureKind::MalformedResponse => "malformed_response",
		}
	}
}
impl Display for FailureKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Whether a classified failure is attempted again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
	/// Retry after the next backoff delay, if the attempt budget allows.
	Retryable,
	/// Surface to the caller immediately.
	Fatal,
}

/// Per-flow retry policy applied on top of a [`FailureKind`].
///
/// Client and server errors are always fatal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowPolicy {
	/// Retry HTTP 401 responses.
	pub retry_unauthorized: bool,
	/// Retry transport failures.
	pub retry_transport: bool,
	/// Retry 2xx responses whose body could not be decoded.
	pub retry_malformed: bool,
}
impl FlowPolicy {
	/// Default policy for the username/password flow.
	///
	/// Credentials are static, so a 401 is assumed to be transient lag in the identity store.
	pub const AUTHENTICATE: Self =
		Self { retry_unauthorized: true, retry_transport: true, retry_malformed: true };
	/// Default policy for the refresh-token flow; a rejected refresh token is final.
	pub const REFRESH: Self =
		Self { retry_unauthorized: false, retry_transport: true, retry_malformed: true };

	/// Decides whether `kind` is retried under this policy.
	pub fn disposition(&self, kind: FailureKind) -> Disposition {
		let retry = match kind {
			FailureKind::Unauthorized => self.retry_unauthorized,
			FailureKind::Transport => self.retry_transport,
			FailureKind::MalformedResponse => self.retry_malformed,
			FailureKind::ClientError | FailureKind::ServerError => false,
		};

		if retry { Disposition::Retryable } else { Disposition::Fatal }
	}
}

/// Policies for both flows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowPolicies {
	/// Policy applied to the username/password flow.
	pub authenticate: FlowPolicy,
	/// Policy applied to the refresh-token flow.
	pub refresh: FlowPolicy,
}
impl FlowPolicies {
	/// Returns the policy for `flow`.
	pub fn for_flow(&self, flow: FlowKind) -> FlowPolicy {
		match flow {
			FlowKind::Authenticate => self.authenticate,
			FlowKind::Refresh => self.refresh,
		}
	}
}
impl Default for FlowPolicies {
	fn default() -> Self {
		Self { authenticate: FlowPolicy::AUTHENTICATE, refresh: FlowPolicy::REFRESH }
	}
}

/// Context passed to an [`ErrorClassifier`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureContext {
	/// Flow associated with the failing request.
	pub flow: FlowKind,
	/// HTTP status code, when a response was received.
	pub http_status: Option<u16>,
	/// Preview of the response body.
	pub body_preview: Option<String>,
	/// The failure originated from the network/transport layer.
	pub network_error: bool,
	/// The response was received but its body could not be decoded.
	pub malformed_body: bool,
}
impl FailureContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates a new context scoped to the provided flow.
	pub fn new(flow: FlowKind) -> Self {
		Self {
			flow,
			http_status: None,
			body_preview: None,
			network_error: false,
			malformed_body: false,
		}
	}

	/// Convenience constructor for transport-level failures.
	pub fn network_failure(flow: FlowKind) -> Self {
		let mut ctx = Self::new(flow);

		ctx.network_error = true;

		ctx
	}

	/// Convenience constructor for undecodable success bodies.
	pub fn malformed_body(flow: FlowKind, status: u16) -> Self {
		let mut ctx = Self::new(flow).with_http_status(status);

		ctx.malformed_body = true;

		ctx
	}

	/// Adds an HTTP status code.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds a body preview, truncated to a log-friendly length.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}
}

/// Status-code based classifier.
#[derive(Debug, Default)]
pub struct DefaultErrorClassifier;
impl Display for DefaultErrorClassifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-error-classifier")
	}
}
impl ErrorClassifier for DefaultErrorClassifier {
	fn classify(&self, ctx: &FailureContext) -> FailureKind {
		if ctx.network_error {
			return FailureKind::Transport;
		}
		if ctx.malformed_body {
			return FailureKind::MalformedResponse;
		}

		match ctx.http_status {
			Some(401) => FailureKind::Unauthorized,
			Some(code) if code >= 500 => FailureKind::ServerError,
			Some(_) => FailureKind::ClientError,
			None => FailureKind::Transport,
		}
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= FailureContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = body.chars().take(FailureContext::BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

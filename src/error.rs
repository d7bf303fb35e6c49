//! Broker-level error types shared across flows, transports, and configuration.

// self
use crate::{_prelude::*, config::CredentialsError, obs::FlowKind};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure; retried with backoff.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The endpoint rejected the request for a reason that will not change on retry.
	#[error("The {flow} endpoint rejected the request with HTTP {status}: {reason}.")]
	RequestRejected {
		/// Flow that issued the request.
		flow: FlowKind,
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Response body preview or a broker-supplied reason.
		reason: String,
	},
	/// The endpoint failed while handling the request.
	#[error("The {flow} endpoint failed with HTTP {status}: {reason}.")]
	ServerError {
		/// Flow that issued the request.
		flow: FlowKind,
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Response body preview or a broker-supplied reason.
		reason: String,
	},
	/// Every allowed attempt failed with a retryable error.
	#[error("Token acquisition gave up after {attempts} attempts: {last}")]
	RetriesExhausted {
		/// Number of attempts performed, including the first one.
		attempts: u32,
		/// Last classified error observed before giving up.
		#[source]
		last: Box<Error>,
	},
}
impl Error {
	/// Returns `true` for the variants the default policies consider retryable.
	pub fn is_transient(&self) -> bool {
		matches!(self, Self::Transient(_) | Self::Transport(_))
	}

	/// HTTP status code attached to the error, when one was observed.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::RequestRejected { status, .. } | Self::ServerError { status, .. } => Some(*status),
			Self::Transient(TransientError::AuthRejected { status, .. }) => Some(*status),
			Self::Transient(
				TransientError::Unavailable { status, .. }
				| TransientError::TokenResponseParse { status, .. },
			) => *status,
			Self::RetriesExhausted { last, .. } => last.status(),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request could not be assembled by the transport.
	#[error("HTTP request could not be assembled.")]
	HttpRequest {
		/// Underlying transport failure.
		#[source]
		source: BoxError,
	},
	/// Request body could not be encoded as JSON.
	#[error("Request body could not be encoded.")]
	RequestEncode(#[from] serde_json::Error),
	/// Credentials failed validation.
	#[error(transparent)]
	Credentials(#[from] CredentialsError),
	/// Endpoint returned an expiry that cannot be represented as an instant.
	#[error("The {field} value exceeds the supported range.")]
	ExpiresInOutOfRange {
		/// Response field carrying the offending value.
		field: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Wraps a transport's request construction failure inside [`ConfigError`].
	pub fn http_request(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpRequest { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Endpoint rejected the credentials, possibly because the identity store lags behind.
	#[error("The {flow} endpoint rejected the credentials with HTTP {status}.")]
	AuthRejected {
		/// Flow that issued the request.
		flow: FlowKind,
		/// HTTP status code returned by the endpoint.
		status: u16,
	},
	/// Endpoint reported a condition a custom classifier marked as temporary.
	#[error("The {flow} endpoint is temporarily unavailable: {message}.")]
	Unavailable {
		/// Flow that issued the request.
		flow: FlowKind,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Response body preview or a broker-supplied message.
		message: String,
	},
	/// Endpoint responded with JSON that does not match the expected token response.
	#[error("The {flow} endpoint returned a malformed token response.")]
	TokenResponseParse {
		/// Flow that issued the request.
		flow: FlowKind,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the authentication server.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request did not complete within the transport's timeout.
	#[error("Request to the authentication server timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the authentication server.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

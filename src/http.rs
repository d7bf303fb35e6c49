//! Transport primitives for authentication exchanges.
//!
//! [`AuthHttpClient`] is the broker's only dependency on an HTTP stack: it posts a JSON body
//! and hands back the raw status and body. [`TransportErrorMapper`] converts the transport's
//! own error type into the broker taxonomy so failures can be classified consistently
//! regardless of which client performed the request.

// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	obs::FlowKind,
};

/// Boxed future returned by [`AuthHttpClient::post_json`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<HttpReply, E>> + 'a + Send>>;

/// JSON POST request sent to an authentication endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonRequest {
	/// Absolute endpoint URL.
	pub endpoint: Url,
	/// Serialized JSON body.
	pub body: Vec<u8>,
}

/// Raw response produced by an [`AuthHttpClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl HttpReply {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Abstraction over HTTP transports capable of posting authentication requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by every
/// clone of a broker. Non-2xx responses are *not* errors at this layer: return them as
/// [`HttpReply`] values and reserve `Err` for failures where no response was received.
pub trait AuthHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Posts `request` and resolves to the endpoint's reply.
	fn post_json(&self, request: JsonRequest) -> HttpFuture<'_, Self::TransportError>;
}

/// Maps transport failures into broker [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an error emitted by the transport into a broker error.
	///
	/// Return [`Error::Transport`] for failures that may succeed on another attempt and
	/// [`Error::Config`] for local problems that will not.
	fn map_transport_error(&self, flow: FlowKind, error: E) -> Error;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Authentication endpoints should answer directly rather than redirect; configure any
/// custom [`ReqwestClient`] accordingly.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that never follows redirects and gives up after `timeout`.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self> {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.timeout(timeout)
			.build()
			.map_err(ConfigError::from)?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl std::ops::Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl AuthHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn post_json(&self, request: JsonRequest) -> HttpFuture<'_, Self::TransportError> {
		// crates.io
		use reqwest::header::{ACCEPT, CONTENT_TYPE};

		let client = self.0.clone();

		Box::pin(async move {
			let response = client
				.post(request.endpoint)
				.header(CONTENT_TYPE, "application/json")
				.header(ACCEPT, "application/json")
				.body(request.body)
				.send()
				.await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok::<_, ReqwestError>(HttpReply { status, body })
		})
	}
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, flow: FlowKind, err: ReqwestError) -> Error {
		// Every reqwest failure is flow-agnostic.
		let _ = flow;

		if err.is_builder() {
			return ConfigError::http_request(err).into();
		}

		TransportError::from(err).into()
	}
}

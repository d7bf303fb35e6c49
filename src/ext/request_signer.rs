//! Request signing for outbound calls.

// self
use crate::{
	_prelude::*,
	flows::TokenBroker,
	http::{AuthHttpClient, TransportErrorMapper},
	token::Secret,
};

/// Attaches a bearer token to an outbound request without constraining the HTTP client type.
pub trait RequestSignerExt<Request, Error>
where
	Self: Send + Sync,
{
	/// Consumes the request and returns it with authorization state derived from `token`.
	fn attach_token(&self, request: Request, token: &Secret) -> Result<Request, Error>;
}

/// Signs [`reqwest::RequestBuilder`]s with an `Authorization: Bearer` header.
#[cfg(feature = "reqwest")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BearerSigner;
#[cfg(feature = "reqwest")]
impl RequestSignerExt<reqwest::RequestBuilder, Error> for BearerSigner {
	fn attach_token(
		&self,
		request: reqwest::RequestBuilder,
		token: &Secret,
	) -> Result<reqwest::RequestBuilder> {
		Ok(request.bearer_auth(token.expose()))
	}
}

impl<C, M> TokenBroker<C, M>
where
	C: ?Sized + AuthHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Acquires a token and hands `request` to `signer`.
	///
	/// When acquisition fails the error is returned and `request` is dropped unsigned.
	pub async fn authorize<S, R, E>(&self, signer: &S, request: R) -> Result<R, E>
	where
		S: ?Sized + RequestSignerExt<R, E>,
		E: From<Error>,
	{
		let token = self.get_token().await?;

		signer.attach_token(request, &token)
	}
}

//! Exchange plumbing shared by the authentication and refresh flows.

// self
use crate::{
	_prelude::*,
	classify::{Disposition, FailureContext, FailureKind},
	error::{ConfigError, TransientError},
	flows::TokenBroker,
	http::{AuthHttpClient, HttpReply, JsonRequest, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome},
	token::{Secret, TokenCache, TokenGrant},
	wire::AuthResponse,
};

/// A failed attempt together with the retry decision taken for it.
#[derive(Debug)]
pub(super) struct Failure {
	pub(super) error: Error,
	pub(super) disposition: Disposition,
}
impl Failure {
	pub(super) fn fatal(error: impl Into<Error>) -> Self {
		Self { error: error.into(), disposition: Disposition::Fatal }
	}
}

impl<C, M> TokenBroker<C, M>
where
	C: ?Sized + AuthHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Posts `body` to `endpoint` and decodes the token response.
	pub(super) async fn exchange<B>(
		&self,
		flow: FlowKind,
		endpoint: &Url,
		body: &B,
	) -> Result<TokenGrant, Failure>
	where
		B: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(body).map_err(|e| Failure::fatal(ConfigError::from(e)))?;
		let request = JsonRequest { endpoint: endpoint.clone(), body };
		let reply = match self.http_client.post_json(request).await {
			Ok(reply) => reply,
			Err(err) => return Err(self.transport_failure(flow, err)),
		};

		if !reply.is_success() {
			return Err(self.status_failure(flow, reply));
		}

		match AuthResponse::parse(&reply.body) {
			Ok(response) => Ok(response.into()),
			Err(source) => {
				let ctx = FailureContext::malformed_body(flow, reply.status);
				let disposition = self.disposition(&ctx);
				let error =
					TransientError::TokenResponseParse { flow, source, status: Some(reply.status) };

				Err(Failure { error: error.into(), disposition })
			},
		}
	}

	/// Stores `grant` using the instant the response arrived and returns the new token.
	pub(super) fn store_grant(
		&self,
		flow: FlowKind,
		cache: &mut TokenCache,
		grant: TokenGrant,
	) -> Result<Secret, Failure> {
		let expires_in = grant.expires_in;
		let record = cache.store(grant, self.clock.now()).map_err(Failure::fatal)?;

		obs::log_acquired(flow, record, expires_in);
		obs::record_flow_outcome(Some(flow), FlowOutcome::Success);

		Ok(record.token.clone())
	}

	fn transport_failure(&self, flow: FlowKind, err: C::TransportError) -> Failure {
		let error = self.transport_mapper.map_transport_error(flow, err);

		if matches!(error, Error::Config(_)) {
			return Failure::fatal(error);
		}

		let disposition = self.disposition(&FailureContext::network_failure(flow));

		Failure { error, disposition }
	}

	fn status_failure(&self, flow: FlowKind, reply: HttpReply) -> Failure {
		let status = reply.status;
		let ctx = FailureContext::new(flow)
			.with_http_status(status)
			.with_body_preview(String::from_utf8_lossy(&reply.body).trim());
		let kind = self.classifier.classify(&ctx);
		let disposition = self.policies.for_flow(flow).disposition(kind);
		let reason = match ctx.body_preview {
			Some(preview) if !preview.is_empty() => preview,
			_ => "no response body".into(),
		};
		let error = match (kind, disposition) {
			(FailureKind::Unauthorized, Disposition::Retryable) =>
				TransientError::AuthRejected { flow, status }.into(),
			(FailureKind::Unauthorized | FailureKind::ClientError, _) =>
				Error::RequestRejected { flow, status, reason },
			(FailureKind::ServerError, _) => Error::ServerError { flow, status, reason },
			(FailureKind::Transport | FailureKind::MalformedResponse, _) =>
				TransientError::Unavailable { flow, status: Some(status), message: reason }.into(),
		};

		Failure { error, disposition }
	}

	fn disposition(&self, ctx: &FailureContext) -> Disposition {
		let kind = self.classifier.classify(ctx);

		self.policies.for_flow(ctx.flow).disposition(kind)
	}
}

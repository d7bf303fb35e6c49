// self
use crate::{
	flows::{TokenBroker, common::Failure},
	http::{AuthHttpClient, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	token::{Secret, TokenCache},
	wire::RefreshTokenRequest,
};

impl<C, M> TokenBroker<C, M>
where
	C: ?Sized + AuthHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges `refresh_token` for a new token pair.
	///
	/// The cache is already empty here, so a failed refresh leaves the next attempt with a
	/// full authentication.
	pub(super) async fn refresh(
		&self,
		cache: &mut TokenCache,
		refresh_token: Secret,
	) -> Result<Secret, Failure> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh");
		let body = RefreshTokenRequest { refresh_token: refresh_token.expose() };

		obs::record_flow_outcome(Some(KIND), FlowOutcome::Attempt);

		let grant = span
			.instrument(self.exchange(KIND, &self.credentials.endpoints.refresh, &body))
			.await?;
		let token = self.store_grant(KIND, cache, grant)?;

		self.metrics.record_refresh();

		Ok(token)
	}
}

// self
use crate::{
	flows::{TokenBroker, common::Failure},
	http::{AuthHttpClient, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	token::{Secret, TokenCache},
	wire::AuthRequest,
};

impl<C, M> TokenBroker<C, M>
where
	C: ?Sized + AuthHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges the configured credentials for a new token pair.
	pub(super) async fn authenticate(&self, cache: &mut TokenCache) -> Result<Secret, Failure> {
		const KIND: FlowKind = FlowKind::Authenticate;

		let span = FlowSpan::new(KIND, "authenticate");
		let credentials = &self.credentials;
		let body =
			AuthRequest { username: &credentials.username, password: credentials.password.expose() };

		obs::record_flow_outcome(Some(KIND), FlowOutcome::Attempt);

		let grant = span.instrument(self.exchange(KIND, &credentials.endpoints.token, &body)).await?;
		let token = self.store_grant(KIND, cache, grant)?;

		self.metrics.record_authentication();

		Ok(token)
	}
}

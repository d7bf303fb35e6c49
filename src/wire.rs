//! JSON bodies exchanged with the authentication server.

// self
use crate::{
	_prelude::*,
	token::{Secret, Subject, TokenGrant},
};

/// Body posted to the token endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct AuthRequest<'a> {
	pub(crate) username: &'a str,
	pub(crate) password: &'a str,
}

/// Body posted to the refresh endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshTokenRequest<'a> {
	pub(crate) refresh_token: &'a str,
}

/// Success body returned by both endpoints.
///
/// Lifetimes are whole seconds relative to the moment the response is received.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthResponse {
	token: String,
	refresh_token: String,
	expires_in: u64,
	refresh_token_expires_in: u64,
	#[serde(default)]
	scopes: Option<Vec<String>>,
	#[serde(default)]
	user_id: Option<String>,
	#[serde(default)]
	username: Option<String>,
}
impl AuthResponse {
	pub(crate) fn parse(body: &[u8]) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
		let mut de = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut de)
	}
}
impl From<AuthResponse> for TokenGrant {
	fn from(response: AuthResponse) -> Self {
		Self {
			token: Secret::new(response.token),
			refresh_token: Secret::new(response.refresh_token),
			expires_in: response.expires_in,
			refresh_expires_in: response.refresh_token_expires_in,
			subject: Subject {
				user_id: response.user_id,
				username: response.username,
				scopes: response.scopes.unwrap_or_default(),
			},
		}
	}
}

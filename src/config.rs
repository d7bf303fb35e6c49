//! Credentials and endpoints used to acquire tokens.
//!
//! [`AuthCredentials`] is immutable once built. Construct it with [`AuthCredentials::builder`]
//! or deserialize it; both paths run the same validation, so a broker never starts with an
//! incomplete configuration. Endpoints must use HTTPS (plain HTTP is accepted for loopback
//! hosts) unless the builder opts into insecure endpoints.

// self
use crate::{_prelude::*, token::Secret};

/// Errors raised while constructing or validating credentials.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CredentialsError {
	/// Username is required.
	#[error("Missing username.")]
	MissingUsername,
	/// Password is required.
	#[error("Missing password.")]
	MissingPassword,
	/// Token endpoint is required.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Refresh endpoint is required.
	#[error("Missing refresh endpoint.")]
	MissingRefreshEndpoint,
	/// Endpoints must use HTTPS unless they point at a loopback host or insecure endpoints
	/// were allowed.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Endpoints exposed by the authentication server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEndpoints {
	/// Endpoint accepting `{username, password}`.
	pub token: Url,
	/// Endpoint accepting `{refreshToken}`.
	pub refresh: Url,
}

/// Immutable credentials shared by every acquisition.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "AuthCredentialsBuilder")]
pub struct AuthCredentials {
	/// Account the broker authenticates as.
	pub username: String,
	/// Account password; never logged.
	pub password: Secret,
	/// Authentication server endpoints.
	pub endpoints: AuthEndpoints,
}
impl AuthCredentials {
	/// Creates a new builder.
	pub fn builder() -> AuthCredentialsBuilder {
		AuthCredentialsBuilder::default()
	}

	fn validate(&self, allow_insecure: bool) -> Result<(), CredentialsError> {
		if self.username.trim().is_empty() {
			return Err(CredentialsError::MissingUsername);
		}
		if self.password.is_empty() {
			return Err(CredentialsError::MissingPassword);
		}

		if !allow_insecure {
			validate_endpoint("token", &self.endpoints.token)?;
			validate_endpoint("refresh", &self.endpoints.refresh)?;
		}

		Ok(())
	}
}
impl Debug for AuthCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthCredentials")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.field("endpoints", &self.endpoints)
			.finish()
	}
}

/// Builder for [`AuthCredentials`] values.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCredentialsBuilder {
	/// Account the broker authenticates as.
	pub username: Option<String>,
	/// Account password.
	pub password: Option<Secret>,
	/// Endpoint accepting `{username, password}`.
	#[serde(alias = "tokenUrl")]
	pub token_endpoint: Option<Url>,
	/// Endpoint accepting `{refreshToken}`.
	#[serde(alias = "refreshTokenUrl")]
	pub refresh_endpoint: Option<Url>,
	/// Accept plain-HTTP endpoints on any host.
	#[serde(default)]
	pub allow_insecure_endpoints: bool,
}
impl AuthCredentialsBuilder {
	/// Sets the username.
	pub fn username(mut self, username: impl Into<String>) -> Self {
		self.username = Some(username.into());

		self
	}

	/// Sets the password.
	pub fn password(mut self, password: impl Into<String>) -> Self {
		self.password = Some(Secret::new(password));

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the refresh endpoint.
	pub fn refresh_endpoint(mut self, url: Url) -> Self {
		self.refresh_endpoint = Some(url);

		self
	}

	/// Accepts plain-HTTP endpoints on non-loopback hosts, e.g. inside a private network.
	pub fn allow_insecure_endpoints(mut self, allow: bool) -> Self {
		self.allow_insecure_endpoints = allow;

		self
	}

	/// Consumes the builder and validates the resulting credentials.
	pub fn build(self) -> Result<AuthCredentials, CredentialsError> {
		let username = self.username.ok_or(CredentialsError::MissingUsername)?;
		let password = self.password.ok_or(CredentialsError::MissingPassword)?;
		let token = self.token_endpoint.ok_or(CredentialsError::MissingTokenEndpoint)?;
		let refresh = self.refresh_endpoint.ok_or(CredentialsError::MissingRefreshEndpoint)?;
		let credentials =
			AuthCredentials { username, password, endpoints: AuthEndpoints { token, refresh } };

		credentials.validate(self.allow_insecure_endpoints)?;

		Ok(credentials)
	}
}
impl TryFrom<AuthCredentialsBuilder> for AuthCredentials {
	type Error = CredentialsError;

	fn try_from(builder: AuthCredentialsBuilder) -> Result<Self, Self::Error> {
		builder.build()
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), CredentialsError> {
	let loopback = match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(addr)) => addr.is_loopback(),
		Some(url::Host::Ipv6(addr)) => addr.is_loopback(),
		None => false,
	};

	match url.scheme() {
		"https" => Ok(()),
		"http" if loopback => Ok(()),
		_ => Err(CredentialsError::InsecureEndpoint { endpoint: name, url: url.to_string() }),
	}
}

//! Cached token record and the grant it is built from.

// self
use crate::{_prelude::*, error::ConfigError, token::Secret};

/// Identity metadata the authentication server returns next to the token.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Subject {
	pub(crate) user_id: Option<String>,
	pub(crate) username: Option<String>,
	pub(crate) scopes: Vec<String>,
}

/// Successful token response, with lifetimes still relative to the moment it arrived.
#[derive(Clone, Debug)]
pub(crate) struct TokenGrant {
	pub(crate) token: Secret,
	pub(crate) refresh_token: Secret,
	pub(crate) expires_in: u64,
	pub(crate) refresh_expires_in: u64,
	pub(crate) subject: Subject,
}

/// Token pair with absolute expiry instants.
///
/// Both instants always come from the same [`TokenGrant`].
#[derive(Clone, Debug)]
pub(crate) struct TokenRecord {
	pub(crate) token: Secret,
	pub(crate) refresh_token: Secret,
	pub(crate) issued_at: OffsetDateTime,
	pub(crate) token_expires_at: OffsetDateTime,
	pub(crate) refresh_expires_at: OffsetDateTime,
	pub(crate) subject: Subject,
}
impl TokenRecord {
	/// Resolves the grant's relative lifetimes against `now`.
	pub(crate) fn from_grant(grant: TokenGrant, now: OffsetDateTime) -> Result<Self, ConfigError> {
		let token_expires_at = expiry(now, grant.expires_in, "expiresIn")?;
		let refresh_expires_at = expiry(now, grant.refresh_expires_in, "refreshTokenExpiresIn")?;

		Ok(Self {
			token: grant.token,
			refresh_token: grant.refresh_token,
			issued_at: now,
			token_expires_at,
			refresh_expires_at,
			subject: grant.subject,
		})
	}

	pub(crate) fn is_token_valid_at(&self, now: OffsetDateTime) -> bool {
		now < self.token_expires_at
	}

	pub(crate) fn is_refresh_valid_at(&self, now: OffsetDateTime) -> bool {
		now < self.refresh_expires_at
	}
}

fn expiry(
	now: OffsetDateTime,
	seconds: u64,
	field: &'static str,
) -> Result<OffsetDateTime, ConfigError> {
	let seconds = i64::try_from(seconds).map_err(|_| ConfigError::ExpiresInOutOfRange { field })?;

	now.checked_add(Duration::seconds(seconds)).ok_or(ConfigError::ExpiresInOutOfRange { field })
}

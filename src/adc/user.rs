//! End-user credentials refreshed through an OAuth refresh token.

// self
use crate::{
	_prelude::*,
	adc::{AuthorizedUserSecret, GOOGLE_TOKEN_URI, token_endpoint},
	auth::{AccessToken, IdentityCredential, IdentityFuture, TokenCache},
	error::IdentityError,
};

/// Credential backed by an `authorized_user` file.
///
/// User credentials carry the scopes granted at login, so they never require scoping.
pub struct AuthorizedUserCredential {
	http: ReqwestClient,
	secret: AuthorizedUserSecret,
	cache: TokenCache,
}
impl AuthorizedUserCredential {
	/// Wraps the parsed secret.
	pub fn new(http: ReqwestClient, secret: AuthorizedUserSecret) -> Self {
		Self { http, secret, cache: TokenCache::default() }
	}

	/// Returns the parsed secret.
	pub fn secret(&self) -> &AuthorizedUserSecret {
		&self.secret
	}

	async fn refresh(&self) -> Result<AccessToken, IdentityError> {
		let token_uri = self.secret.token_uri.as_deref().unwrap_or(GOOGLE_TOKEN_URI);
		let form = [
			("grant_type", "refresh_token"),
			("client_id", self.secret.client_id.as_str()),
			("client_secret", self.secret.client_secret.as_str()),
			("refresh_token", self.secret.refresh_token.as_str()),
		];

		token_endpoint::exchange(&self.http, token_uri, &form, "authorized_user").await
	}
}
impl Debug for AuthorizedUserCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizedUserCredential").field("secret", &self.secret).finish()
	}
}
impl IdentityCredential for AuthorizedUserCredential {
	fn access_token(&self) -> IdentityFuture<'_, AccessToken> {
		Box::pin(self.cache.get_or_refresh(|| self.refresh()))
	}
}

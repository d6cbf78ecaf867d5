//! Identity provider contracts.
//!
//! An [`IdentityProvider`] hands out the ambient application credential. Credentials mint
//! [`AccessToken`]s and may expose the [`Scoping`] capability when they must be narrowed to a
//! scope set before use.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ScopeSet},
	error::IdentityError,
};

/// Boxed future returned by identity contracts.
pub type IdentityFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, IdentityError>> + 'a + Send>>;

/// Source of the application default credential.
pub trait IdentityProvider: Send + Sync {
	/// Discovers the ambient credential.
	fn application_default(&self) -> IdentityFuture<'_, Arc<dyn IdentityCredential>>;
}

/// Credential capable of minting bearer tokens.
pub trait IdentityCredential: Send + Sync {
	/// Returns a valid access token, refreshing it when necessary.
	fn access_token(&self) -> IdentityFuture<'_, AccessToken>;

	/// Exposes the scoping capability for credentials that support narrowing.
	///
	/// The default implementation returns `None`, meaning scopes are never applied.
	fn scoping(&self) -> Option<&dyn Scoping> {
		None
	}
}

/// Capability implemented by credentials that can be narrowed to a scope set.
pub trait Scoping: Send + Sync {
	/// Returns `true` if the credential cannot mint tokens until scopes are applied.
	fn scoping_required(&self) -> bool;

	/// Returns a new credential bound to `scopes`.
	fn with_scopes(&self, scopes: &ScopeSet) -> Arc<dyn IdentityCredential>;
}

/// Credential that always returns the same token.
///
/// Useful against emulators or when a token is minted out of band.
#[derive(Clone, Debug)]
pub struct StaticCredential {
	token: AccessToken,
}
impl StaticCredential {
	/// Wraps a pre-minted token.
	pub fn new(token: AccessToken) -> Self {
		Self { token }
	}
}
impl IdentityCredential for StaticCredential {
	fn access_token(&self) -> IdentityFuture<'_, AccessToken> {
		Box::pin(async move { Ok(self.token.clone()) })
	}
}

/// Provider that always yields the same credential.
#[derive(Clone)]
pub struct StaticIdentityProvider {
	credential: Arc<dyn IdentityCredential>,
}
impl StaticIdentityProvider {
	/// Wraps a credential that will be handed out on every discovery.
	pub fn new(credential: Arc<dyn IdentityCredential>) -> Self {
		Self { credential }
	}
}
impl Debug for StaticIdentityProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("StaticIdentityProvider(..)")
	}
}
impl IdentityProvider for StaticIdentityProvider {
	fn application_default(&self) -> IdentityFuture<'_, Arc<dyn IdentityCredential>> {
		let credential = self.credential.clone();

		Box::pin(async move { Ok(credential) })
	}
}

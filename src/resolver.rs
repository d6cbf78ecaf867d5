//! Credential resolution strategies.
//!
//! [`DefaultCredentialResolver`] discovers the ambient identity credential, narrows it to the
//! requested scopes when the credential demands it, and composes it with TLS settings into
//! [`ChannelCredentials`]. Callers can replace the whole step by putting their own
//! [`CredentialResolver`] into [`StubOptions`].

// self
use crate::{
	_prelude::*,
	auth::IdentityProvider,
	credentials::{CallCredentials, ChannelCredentials},
	obs::{self, OpSpan, Operation, Outcome},
	stub::StubOptions,
};

/// Boxed future returned by [`CredentialResolver::resolve`].
pub type CredentialsFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ChannelCredentials>> + 'a + Send>>;

/// Strategy that turns stub options into channel credentials.
pub trait CredentialResolver: Send + Sync {
	/// Produces channel credentials for a stub built with `options`.
	fn resolve<'a>(&'a self, options: &'a StubOptions) -> CredentialsFuture<'a>;
}

/// Resolver backed by an [`IdentityProvider`].
#[derive(Clone)]
pub struct DefaultCredentialResolver {
	provider: Arc<dyn IdentityProvider>,
}
impl DefaultCredentialResolver {
	/// Resolves credentials through `provider`.
	pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
		Self { provider }
	}

	/// Picks the provider named in `options`, falling back to the shared ADC provider.
	pub fn for_options(options: &StubOptions) -> Result<Self> {
		if let Some(provider) = &options.identity_provider {
			return Ok(Self::new(provider.clone()));
		}

		#[cfg(feature = "reqwest")]
		{
			Ok(Self::default())
		}
		#[cfg(not(feature = "reqwest"))]
		{
			Err(crate::error::IdentityError::NotFound.into())
		}
	}

	async fn resolve_with_provider(&self, options: &StubOptions) -> Result<ChannelCredentials> {
		let mut identity = self.provider.application_default().await?;

		if let Some(scopes) = &options.scopes {
			let scoped = identity
				.scoping()
				.filter(|scoping| scoping.scoping_required())
				.map(|scoping| scoping.with_scopes(scopes));

			if let Some(scoped) = scoped {
				obs::trace_debug!(scopes = %scopes, "applied scopes to the default credential");

				identity = scoped;
			}
		}

		let tls = options.tls_credentials.clone().unwrap_or_default();

		Ok(ChannelCredentials::combine(tls, CallCredentials::from_identity(identity)))
	}
}
#[cfg(feature = "reqwest")]
impl Default for DefaultCredentialResolver {
	fn default() -> Self {
		Self::new(crate::adc::ApplicationDefaultProvider::shared())
	}
}
impl Debug for DefaultCredentialResolver {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("DefaultCredentialResolver(..)")
	}
}
impl CredentialResolver for DefaultCredentialResolver {
	fn resolve<'a>(&'a self, options: &'a StubOptions) -> CredentialsFuture<'a> {
		const OP: Operation = Operation::ResolveCredentials;

		Box::pin(async move {
			let span = OpSpan::new(OP, "default_resolver");

			obs::record_outcome(OP, Outcome::Attempt);

			let result = span.instrument(self.resolve_with_provider(options)).await;

			obs::record_outcome(OP, Outcome::of(&result));

			result
		})
	}
}

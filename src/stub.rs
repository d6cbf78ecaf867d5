//! Stub construction.
//!
//! [`create_stub`] resolves channel credentials and hands them, together with the
//! `host:port` address, to a caller-supplied constructor. Generated tonic clients usually
//! plug in through [`ChannelCredentials::connect_lazy`]:
//!
//! ```rust,ignore
//! let options = StubOptions::default().with_scopes(ScopeSet::new([CLOUD_PLATFORM])?);
//! let client = create_stub(
//! 	"pubsub.googleapis.com",
//! 	443,
//! 	|address: String, credentials: ChannelCredentials| {
//! 		Ok(PublisherClient::new(credentials.connect_lazy(&address)?))
//! 	},
//! 	&options,
//! )
//! .await?;
//! ```

// self
use crate::{
	_prelude::*,
	auth::{IdentityProvider, ScopeSet},
	credentials::{ChannelCredentials, TlsCredentials},
	obs::{self, OpSpan, Operation, Outcome},
	resolver::{CredentialResolver, DefaultCredentialResolver},
};

/// Builds a stub from its target address and composed credentials.
pub trait StubConstructor<S> {
	/// Consumes the constructor and instantiates the stub.
	fn construct(self, address: String, credentials: ChannelCredentials) -> Result<S>;
}
impl<S, F> StubConstructor<S> for F
where
	F: FnOnce(String, ChannelCredentials) -> Result<S>,
{
	fn construct(self, address: String, credentials: ChannelCredentials) -> Result<S> {
		self(address, credentials)
	}
}

/// Settings consumed by [`create_stub`] and credential resolvers.
#[derive(Clone, Default)]
pub struct StubOptions {
	/// Scopes applied to credentials that require scoping.
	pub scopes: Option<ScopeSet>,
	/// TLS settings used instead of the defaults.
	pub tls_credentials: Option<TlsCredentials>,
	/// Resolver used instead of [`DefaultCredentialResolver`].
	pub credential_resolver: Option<Arc<dyn CredentialResolver>>,
	/// Identity provider used by the default resolver instead of the shared ADC provider.
	pub identity_provider: Option<Arc<dyn IdentityProvider>>,
}
impl StubOptions {
	/// Requests the provided scopes.
	pub fn with_scopes(mut self, scopes: ScopeSet) -> Self {
		self.scopes = Some(scopes);

		self
	}

	/// Uses pre-built TLS settings.
	pub fn with_tls_credentials(mut self, tls: TlsCredentials) -> Self {
		self.tls_credentials = Some(tls);

		self
	}

	/// Replaces the whole credential resolution step.
	pub fn with_credential_resolver(mut self, resolver: Arc<dyn CredentialResolver>) -> Self {
		self.credential_resolver = Some(resolver);

		self
	}

	/// Discovers identity credentials through `provider`.
	pub fn with_identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
		self.identity_provider = Some(provider);

		self
	}
}
impl Debug for StubOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StubOptions")
			.field("scopes", &self.scopes)
			.field("tls_credentials", &self.tls_credentials)
			.field("custom_resolver", &self.credential_resolver.is_some())
			.field("custom_identity_provider", &self.identity_provider.is_some())
			.finish()
	}
}

/// Resolves credentials and instantiates a stub bound to `service_path:port`.
///
/// The constructor runs at most once and never runs when credential resolution fails; that
/// failure is returned unchanged.
pub async fn create_stub<S, C>(
	service_path: &str,
	port: u16,
	constructor: C,
	options: &StubOptions,
) -> Result<S>
where
	C: StubConstructor<S>,
{
	const OP: Operation = Operation::CreateStub;

	let span = OpSpan::new(OP, "create_stub");

	obs::record_outcome(OP, Outcome::Attempt);

	let result = span
		.instrument(async move {
			let credentials = match &options.credential_resolver {
				Some(resolver) => resolver.resolve(options).await?,
				None => DefaultCredentialResolver::for_options(options)?.resolve(options).await?,
			};
			let address = format!("{service_path}:{port}");

			obs::trace_debug!(%address, "constructing stub");

			constructor.construct(address, credentials)
		})
		.await;

	obs::record_outcome(OP, Outcome::of(&result));

	result
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::{AccessToken, StaticCredential},
		credentials::CallCredentials,
	};

	#[test]
	fn options_debug_hides_strategies() {
		let options = StubOptions::default()
			.with_scopes(ScopeSet::new(["scope-a"]).expect("Scope set should be valid."));
		let rendered = format!("{options:?}");

		assert!(rendered.contains("scope-a"));
		assert!(rendered.contains("custom_resolver: false"));
	}

	#[test]
	fn closures_are_constructors() {
		let stub = StubConstructor::<String>::construct(
			|address: String, _credentials: ChannelCredentials| Ok::<_, Error>(address),
			"localhost:1".into(),
			ChannelCredentials::combine(
				TlsCredentials::default(),
				CallCredentials::from_identity(Arc::new(StaticCredential::new(AccessToken::new(
					"t", None,
				)))),
			),
		)
		.expect("Closure constructors should run.");

		assert_eq!(stub, "localhost:1");
	}
}

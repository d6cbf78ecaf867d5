//! Transport credentials: TLS settings composed with per-call identity credentials.
//!
//! [`ChannelCredentials`] is the value handed to stub constructors. It carries the TLS
//! configuration for the channel and the [`CallCredentials`] that stamp every request with a
//! bearer token via [`AuthService`].

mod call;
mod tls;

pub use call::*;
pub use tls::*;

// crates.io
use tonic::transport::{Channel, Endpoint};
// self
use crate::{_prelude::*, error::ConfigError};

/// TLS credentials combined with identity-backed call credentials.
#[derive(Clone, Debug)]
pub struct ChannelCredentials {
	/// Channel-level TLS settings.
	pub tls: TlsCredentials,
	/// Per-request identity credentials.
	pub call: CallCredentials,
}
impl ChannelCredentials {
	/// Composes channel TLS settings with call credentials.
	pub fn combine(tls: TlsCredentials, call: CallCredentials) -> Self {
		Self { tls, call }
	}

	/// Builds a TLS-enabled tonic [`Endpoint`] for `address`.
	///
	/// Bare `host:port` addresses are dialed over `https`.
	pub fn endpoint(&self, address: &str) -> Result<Endpoint> {
		let uri = if address.contains("://") {
			address.to_owned()
		} else {
			format!("https://{address}")
		};
		let endpoint = Endpoint::from_shared(uri).map_err(|e| ConfigError::InvalidAddress {
			address: address.to_owned(),
			source: Box::new(e),
		})?;

		Ok(endpoint.tls_config(self.tls.client_config()).map_err(ConfigError::Tls)?)
	}

	/// Creates a lazily-connecting authenticated channel for `address`.
	///
	/// Must be called from within a Tokio runtime.
	pub fn connect_lazy(&self, address: &str) -> Result<AuthService<Channel>> {
		Ok(self.authenticate(self.endpoint(address)?.connect_lazy()))
	}

	/// Wraps any service so outgoing requests carry the call credentials.
	pub fn authenticate<S>(&self, inner: S) -> AuthService<S> {
		AuthService::new(inner, self.call.clone())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::{AccessToken, StaticCredential};

	fn credentials() -> ChannelCredentials {
		let identity = Arc::new(StaticCredential::new(AccessToken::new("token", None)));

		ChannelCredentials::combine(
			TlsCredentials::default(),
			CallCredentials::from_identity(identity),
		)
	}

	#[test]
	fn endpoint_defaults_to_https() {
		let endpoint = credentials()
			.endpoint("pubsub.googleapis.com:443")
			.expect("Endpoint should build for a host:port address.");

		assert_eq!(endpoint.uri().scheme_str(), Some("https"));
		assert_eq!(endpoint.uri().host(), Some("pubsub.googleapis.com"));
		assert_eq!(endpoint.uri().port_u16(), Some(443));
	}

	#[test]
	fn endpoint_rejects_malformed_addresses() {
		let err = credentials()
			.endpoint("bad host:443")
			.expect_err("Addresses with whitespace must be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidAddress { .. })));
	}

	#[test]
	fn endpoint_accepts_client_identities() {
		let tls = TlsCredentials::default().with_client_identity(
			include_str!("../tests/fixtures/client_cert.pem"),
			include_str!("../tests/fixtures/service_account_key.pem"),
		);
		let identity = Arc::new(StaticCredential::new(AccessToken::new("token", None)));
		let endpoint = ChannelCredentials::combine(tls, CallCredentials::from_identity(identity))
			.endpoint("pubsub.googleapis.com:443")
			.expect("A matching certificate and key should configure mutual TLS.");

		assert_eq!(endpoint.uri().scheme_str(), Some("https"));
	}

	#[tokio::test]
	async fn connect_lazy_does_not_dial() {
		credentials()
			.connect_lazy("localhost:50051")
			.expect("Lazy channels should build without a reachable server.");
	}
}

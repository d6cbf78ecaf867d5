//! Channel TLS settings.

// crates.io
use tonic::transport::{Certificate, ClientTlsConfig, Identity};
// self
use crate::_prelude::*;

/// TLS settings for a gRPC channel.
///
/// The default trusts the bundled webpki roots, which is what public Google APIs need.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TlsCredentials {
	/// Additional PEM-encoded CA certificate to trust.
	pub ca_certificate: Option<Vec<u8>>,
	/// Overrides the domain name verified against the server certificate.
	pub domain_name: Option<String>,
	/// Client certificate presented for mutual TLS.
	pub client_identity: Option<ClientIdentity>,
}
impl TlsCredentials {
	/// Trusts an extra PEM-encoded CA certificate.
	pub fn with_ca_certificate(mut self, pem: impl Into<Vec<u8>>) -> Self {
		self.ca_certificate = Some(pem.into());

		self
	}

	/// Verifies the server certificate against `domain` instead of the dialed host.
	pub fn with_domain_name(mut self, domain: impl Into<String>) -> Self {
		self.domain_name = Some(domain.into());

		self
	}

	/// Presents a client certificate chain and private key (both PEM) for mutual TLS.
	pub fn with_client_identity(
		mut self,
		certificate_chain: impl Into<Vec<u8>>,
		private_key: impl Into<Vec<u8>>,
	) -> Self {
		self.client_identity = Some(ClientIdentity {
			certificate_chain: certificate_chain.into(),
			private_key: private_key.into(),
		});

		self
	}

	/// Renders the settings into a tonic [`ClientTlsConfig`].
	pub fn client_config(&self) -> ClientTlsConfig {
		let mut config = ClientTlsConfig::new().with_webpki_roots();

		if let Some(pem) = &self.ca_certificate {
			config = config.ca_certificate(Certificate::from_pem(pem));
		}
		if let Some(domain) = &self.domain_name {
			config = config.domain_name(domain.clone());
		}
		if let Some(identity) = &self.client_identity {
			config = config
				.identity(Identity::from_pem(&identity.certificate_chain, &identity.private_key));
		}

		config
	}
}

/// PEM-encoded client certificate chain and private key.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientIdentity {
	/// Certificate chain, leaf first.
	pub certificate_chain: Vec<u8>,
	/// Private key matching the leaf certificate.
	pub private_key: Vec<u8>,
}
impl Debug for ClientIdentity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientIdentity")
			.field("certificate_chain", &String::from_utf8_lossy(&self.certificate_chain))
			.field("private_key", &"<redacted>")
			.finish()
	}
}

//! Credential file formats understood by ADC discovery.

// std
use std::{fs, path::Path};
// self
use crate::{_prelude::*, error::IdentityError};

/// Parsed credential file.
#[derive(Clone, Debug)]
pub enum CredentialFile {
	/// `service_account` key file.
	ServiceAccount(ServiceAccountKey),
	/// `authorized_user` file written by `gcloud auth application-default login`.
	AuthorizedUser(AuthorizedUserSecret),
}
impl CredentialFile {
	/// Reads and parses a credential file.
	pub fn load(path: &Path) -> Result<Self, IdentityError> {
		let bytes = fs::read(path)
			.map_err(|source| IdentityError::CredentialFile { path: path.to_owned(), source })?;

		Self::parse(&bytes).map_err(|e| match e {
			ParseFailure::Json(source) =>
				IdentityError::CredentialParse { path: path.to_owned(), source },
			ParseFailure::UnsupportedType(kind) => IdentityError::UnsupportedCredentialType { kind },
		})
	}

	fn parse(bytes: &[u8]) -> Result<Self, ParseFailure> {
		#[derive(Deserialize)]
		struct Kind {
			#[serde(rename = "type")]
			kind: String,
		}

		let Kind { kind } = deserialize(bytes)?;

		match kind.as_str() {
			"service_account" => Ok(Self::ServiceAccount(deserialize(bytes)?)),
			"authorized_user" => Ok(Self::AuthorizedUser(deserialize(bytes)?)),
			_ => Err(ParseFailure::UnsupportedType(kind)),
		}
	}
}

/// Service-account key material.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
	/// Service-account email, used as the assertion issuer.
	pub client_email: String,
	/// PEM-encoded RSA private key.
	pub private_key: String,
	/// Key identifier placed in the assertion header.
	#[serde(default)]
	pub private_key_id: Option<String>,
	/// Token endpoint; defaults to Google's.
	#[serde(default)]
	pub token_uri: Option<String>,
	/// Owning project, if recorded.
	#[serde(default)]
	pub project_id: Option<String>,
}
impl Debug for ServiceAccountKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ServiceAccountKey")
			.field("client_email", &self.client_email)
			.field("private_key", &"<redacted>")
			.field("private_key_id", &self.private_key_id)
			.field("token_uri", &self.token_uri)
			.field("project_id", &self.project_id)
			.finish()
	}
}

/// OAuth client plus refresh token for an end-user credential.
#[derive(Clone, Deserialize)]
pub struct AuthorizedUserSecret {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: String,
	/// Long-lived refresh token.
	pub refresh_token: String,
	/// Token endpoint; defaults to Google's.
	#[serde(default)]
	pub token_uri: Option<String>,
	/// Project billed for quota, if recorded.
	#[serde(default)]
	pub quota_project_id: Option<String>,
}
impl Debug for AuthorizedUserSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizedUserSecret")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("refresh_token", &"<redacted>")
			.field("token_uri", &self.token_uri)
			.field("quota_project_id", &self.quota_project_id)
			.finish()
	}
}

enum ParseFailure {
	Json(serde_path_to_error::Error<serde_json::Error>),
	UnsupportedType(String),
}
impl From<serde_path_to_error::Error<serde_json::Error>> for ParseFailure {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		Self::Json(e)
	}
}

fn deserialize<'de, T>(bytes: &'de [u8]) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
where
	T: Deserialize<'de>,
{
	serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(bytes))
}

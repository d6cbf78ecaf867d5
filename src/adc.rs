//! Application Default Credentials.
//!
//! [`ApplicationDefaultProvider`] discovers the ambient Google credential in the usual order:
//!
//! 1. the file named by `GOOGLE_APPLICATION_CREDENTIALS`,
//! 2. the gcloud well-known file (`application_default_credentials.json`),
//! 3. the GCE metadata server.
//!
//! The first source that exists wins; a file that exists but cannot be used is an error rather
//! than a reason to fall through. Discovery runs once per provider and the credential is reused
//! afterwards.

mod file;
mod metadata;
mod service_account;
mod token_endpoint;
mod user;

pub use file::*;
pub use metadata::*;
pub use service_account::*;
pub use user::*;

// std
use std::{
	env,
	path::{Path, PathBuf},
	sync::OnceLock,
};
// crates.io
use url::Url;
// self
use crate::{
	_prelude::*,
	auth::{IdentityCredential, IdentityFuture, IdentityProvider},
	error::IdentityError,
	obs,
};

/// Environment variable naming an explicit credential file.
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";
/// Environment variable overriding the gcloud configuration directory.
pub const CLOUDSDK_CONFIG_ENV: &str = "CLOUDSDK_CONFIG";
/// Environment variable overriding the metadata server host.
pub const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";
/// Default metadata server host.
pub const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";
/// File name gcloud uses for application default credentials.
pub const WELL_KNOWN_FILE: &str = "application_default_credentials.json";
/// Default OAuth token endpoint.
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Discovery inputs, normally read from the process environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdcEnvironment {
	/// Explicit credential file (`GOOGLE_APPLICATION_CREDENTIALS`).
	pub credentials_path: Option<PathBuf>,
	/// gcloud well-known credential file.
	pub well_known_path: Option<PathBuf>,
	/// Metadata server base URL; `None` skips the metadata probe.
	pub metadata_base: Option<Url>,
}
impl AdcEnvironment {
	/// Reads discovery inputs from the process environment.
	pub fn from_env() -> Self {
		let credentials_path =
			env::var_os(CREDENTIALS_ENV).filter(|value| !value.is_empty()).map(PathBuf::from);
		let host = env::var(METADATA_HOST_ENV)
			.ok()
			.filter(|value| !value.is_empty())
			.unwrap_or_else(|| DEFAULT_METADATA_HOST.to_owned());

		Self {
			credentials_path,
			well_known_path: well_known_file(),
			metadata_base: Url::parse(&format!("http://{host}/")).ok(),
		}
	}

	/// Uses an explicit credential file.
	pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.credentials_path = Some(path.into());

		self
	}

	/// Overrides the gcloud well-known file location.
	pub fn with_well_known_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.well_known_path = Some(path.into());

		self
	}

	/// Probes the metadata server at `base`.
	pub fn with_metadata_base(mut self, base: Url) -> Self {
		self.metadata_base = Some(base);

		self
	}
}

/// Identity provider implementing Application Default Credentials discovery.
pub struct ApplicationDefaultProvider {
	http: ReqwestClient,
	environment: AdcEnvironment,
	discovered: AsyncMutex<Option<Arc<dyn IdentityCredential>>>,
}
impl ApplicationDefaultProvider {
	/// Creates a provider over an explicit environment and HTTP client.
	pub fn new(environment: AdcEnvironment, http: ReqwestClient) -> Self {
		Self { http, environment, discovered: AsyncMutex::new(None) }
	}

	/// Creates a provider reading the process environment.
	pub fn from_env() -> Self {
		Self::new(AdcEnvironment::from_env(), ReqwestClient::default())
	}

	/// Process-wide provider shared by every default resolver.
	pub fn shared() -> Arc<Self> {
		static SHARED: OnceLock<Arc<ApplicationDefaultProvider>> = OnceLock::new();

		SHARED.get_or_init(|| Arc::new(Self::from_env())).clone()
	}

	/// Returns the discovery inputs.
	pub fn environment(&self) -> &AdcEnvironment {
		&self.environment
	}

	async fn discover(&self) -> Result<Arc<dyn IdentityCredential>, IdentityError> {
		if let Some(path) = &self.environment.credentials_path {
			obs::trace_debug!(path = %path.display(), "loading the explicit credential file");

			return self.load_file(path);
		}
		if let Some(path) = self.environment.well_known_path.as_deref().filter(|p| p.exists()) {
			obs::trace_debug!(path = %path.display(), "loading the gcloud credential file");

			return self.load_file(path);
		}
		if let Some(base) = &self.environment.metadata_base
			&& metadata::is_available(&self.http, base).await
		{
			obs::trace_debug!(%base, "using the metadata server");

			return Ok(Arc::new(MetadataCredential::new(self.http.clone(), base.clone())));
		}

		Err(IdentityError::NotFound)
	}

	fn load_file(&self, path: &Path) -> Result<Arc<dyn IdentityCredential>, IdentityError> {
		let credential: Arc<dyn IdentityCredential> = match CredentialFile::load(path)? {
			CredentialFile::ServiceAccount(key) =>
				Arc::new(ServiceAccountCredential::new(self.http.clone(), key)),
			CredentialFile::AuthorizedUser(secret) =>
				Arc::new(AuthorizedUserCredential::new(self.http.clone(), secret)),
		};

		Ok(credential)
	}
}
impl Debug for ApplicationDefaultProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApplicationDefaultProvider")
			.field("environment", &self.environment)
			.finish()
	}
}
impl IdentityProvider for ApplicationDefaultProvider {
	fn application_default(&self) -> IdentityFuture<'_, Arc<dyn IdentityCredential>> {
		Box::pin(async move {
			let mut discovered = self.discovered.lock().await;

			if let Some(credential) = discovered.as_ref() {
				return Ok(credential.clone());
			}

			let credential = self.discover().await?;

			*discovered = Some(credential.clone());

			Ok(credential)
		})
	}
}

fn well_known_file() -> Option<PathBuf> {
	if let Some(dir) = env::var_os(CLOUDSDK_CONFIG_ENV).filter(|value| !value.is_empty()) {
		return Some(PathBuf::from(dir).join(WELL_KNOWN_FILE));
	}

	#[cfg(windows)]
	{
		env::var_os("APPDATA").map(|dir| PathBuf::from(dir).join("gcloud").join(WELL_KNOWN_FILE))
	}
	#[cfg(not(windows))]
	{
		env::var_os("HOME")
			.map(|dir| PathBuf::from(dir).join(".config").join("gcloud").join(WELL_KNOWN_FILE))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn empty_environment_finds_nothing() {
		let provider =
			ApplicationDefaultProvider::new(AdcEnvironment::default(), ReqwestClient::default());
		let err = provider
			.application_default()
			.await
			.err()
			.expect("Discovery without any source must fail.");

		assert!(matches!(err, IdentityError::NotFound));
	}

	#[tokio::test]
	async fn missing_well_known_file_is_skipped() {
		let environment = AdcEnvironment::default()
			.with_well_known_path(env::temp_dir().join("grpc-stub-auth-missing-adc.json"));
		let provider = ApplicationDefaultProvider::new(environment, ReqwestClient::default());
		let err = provider
			.application_default()
			.await
			.err()
			.expect("Absent well-known file must not count as a source.");

		assert!(matches!(err, IdentityError::NotFound));
	}

	#[tokio::test]
	async fn explicit_missing_file_is_an_error() {
		let environment = AdcEnvironment::default()
			.with_credentials_path(env::temp_dir().join("grpc-stub-auth-explicit-missing.json"));
		let provider = ApplicationDefaultProvider::new(environment, ReqwestClient::default());
		let err = provider
			.application_default()
			.await
			.err()
			.expect("Explicit file that does not exist must fail.");

		assert!(matches!(err, IdentityError::CredentialFile { .. }));
	}
}

//! GCE metadata server credentials.

// std
use std::time::Duration as StdDuration;
// crates.io
use url::Url;
// self
use crate::{
	_prelude::*,
	adc::token_endpoint,
	auth::{AccessToken, IdentityCredential, IdentityFuture, TokenCache},
	error::IdentityError,
};

const FLAVOR_HEADER: &str = "Metadata-Flavor";
const FLAVOR_VALUE: &str = "Google";
const TOKEN_PATH: &str = "computeMetadata/v1/instance/service-accounts/default/token";
const PROBE_TIMEOUT: StdDuration = StdDuration::from_secs(3);

/// Credential served by the metadata server of the current VM or pod.
///
/// The attached service account already carries its scopes, so no scoping is required.
pub struct MetadataCredential {
	http: ReqwestClient,
	base: Url,
	cache: TokenCache,
}
impl MetadataCredential {
	/// Creates a credential that fetches tokens from the server at `base`.
	pub fn new(http: ReqwestClient, base: Url) -> Self {
		Self { http, base, cache: TokenCache::default() }
	}

	async fn fetch(&self) -> Result<AccessToken, IdentityError> {
		token_endpoint::observe("metadata", async move {
			let url = self.base.join(TOKEN_PATH).map_err(|e| IdentityError::custom(e.to_string()))?;
			let issued_at = OffsetDateTime::now_utc();
			let response = self.http.get(url).header(FLAVOR_HEADER, FLAVOR_VALUE).send().await?;

			token_endpoint::read_token(response, issued_at).await
		})
		.await
	}
}
impl Debug for MetadataCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MetadataCredential").field("base", &self.base.as_str()).finish()
	}
}
impl IdentityCredential for MetadataCredential {
	fn access_token(&self) -> IdentityFuture<'_, AccessToken> {
		Box::pin(self.cache.get_or_refresh(|| self.fetch()))
	}
}

/// Returns `true` if a metadata server answers at `base`.
pub(crate) async fn is_available(http: &ReqwestClient, base: &Url) -> bool {
	let probe = http.get(base.clone()).header(FLAVOR_HEADER, FLAVOR_VALUE).timeout(PROBE_TIMEOUT);

	match probe.send().await {
		Ok(response) => response
			.headers()
			.get(FLAVOR_HEADER)
			.and_then(|value| value.to_str().ok())
			.is_some_and(|value| value == FLAVOR_VALUE),
		Err(_) => false,
	}
}

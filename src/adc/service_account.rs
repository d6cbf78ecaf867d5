//! Service-account credentials minted through signed JWT assertions.

// crates.io
use jsonwebtoken::{Algorithm, EncodingKey, Header};
// self
use crate::{
	_prelude::*,
	adc::{GOOGLE_TOKEN_URI, ServiceAccountKey, token_endpoint},
	auth::{AccessToken, IdentityCredential, IdentityFuture, ScopeSet, Scoping, TokenCache},
	error::IdentityError,
};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME: Duration = Duration::hours(1);

#[derive(Serialize)]
struct AssertionClaims<'a> {
	iss: &'a str,
	scope: String,
	aud: &'a str,
	iat: i64,
	exp: i64,
}

/// Credential backed by a service-account key.
///
/// The key grants no access until scopes are applied, so [`Scoping::scoping_required`] stays
/// `true` until [`Scoping::with_scopes`] has been called with a non-empty set.
pub struct ServiceAccountCredential {
	http: ReqwestClient,
	key: Arc<ServiceAccountKey>,
	scopes: Option<ScopeSet>,
	cache: TokenCache,
}
impl ServiceAccountCredential {
	/// Wraps the parsed key without scopes.
	pub fn new(http: ReqwestClient, key: ServiceAccountKey) -> Self {
		Self { http, key: Arc::new(key), scopes: None, cache: TokenCache::default() }
	}

	/// Returns the scopes bound to this credential.
	pub fn scopes(&self) -> Option<&ScopeSet> {
		self.scopes.as_ref()
	}

	/// Returns the service-account email.
	pub fn client_email(&self) -> &str {
		&self.key.client_email
	}

	fn token_uri(&self) -> &str {
		self.key.token_uri.as_deref().unwrap_or(GOOGLE_TOKEN_URI)
	}

	/// Signs the RS256 assertion exchanged for an access token.
	fn assertion(&self, now: OffsetDateTime) -> Result<String, IdentityError> {
		let iat = now.unix_timestamp();
		let claims = AssertionClaims {
			iss: &self.key.client_email,
			scope: self.scopes.as_ref().map(ScopeSet::normalized).unwrap_or_default(),
			aud: self.token_uri(),
			iat,
			exp: iat + ASSERTION_LIFETIME.whole_seconds(),
		};
		let mut header = Header::new(Algorithm::RS256);

		header.kid = self.key.private_key_id.clone();

		let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;

		Ok(jsonwebtoken::encode(&header, &claims, &key)?)
	}

	async fn fetch(&self) -> Result<AccessToken, IdentityError> {
		let assertion = self.assertion(OffsetDateTime::now_utc())?;
		let form = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

		token_endpoint::exchange(&self.http, self.token_uri(), &form, "service_account").await
	}
}
impl Debug for ServiceAccountCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ServiceAccountCredential")
			.field("key", &self.key)
			.field("scopes", &self.scopes)
			.finish()
	}
}
impl IdentityCredential for ServiceAccountCredential {
	fn access_token(&self) -> IdentityFuture<'_, AccessToken> {
		Box::pin(self.cache.get_or_refresh(|| self.fetch()))
	}

	fn scoping(&self) -> Option<&dyn Scoping> {
		Some(self)
	}
}
impl Scoping for ServiceAccountCredential {
	fn scoping_required(&self) -> bool {
		self.scopes.as_ref().is_none_or(ScopeSet::is_empty)
	}

	fn with_scopes(&self, scopes: &ScopeSet) -> Arc<dyn IdentityCredential> {
		Arc::new(Self {
			http: self.http.clone(),
			key: self.key.clone(),
			scopes: Some(scopes.clone()),
			cache: TokenCache::default(),
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use jsonwebtoken::{DecodingKey, Validation};
	// self
	use super::*;

	const PRIVATE_KEY: &str = include_str!("../../tests/fixtures/service_account_key.pem");
	const PUBLIC_KEY: &str = include_str!("../../tests/fixtures/service_account_pub.pem");

	#[derive(Deserialize)]
	struct DecodedClaims {
		iss: String,
		scope: String,
		iat: i64,
		exp: i64,
	}

	fn credential() -> ServiceAccountCredential {
		ServiceAccountCredential::new(
			ReqwestClient::default(),
			ServiceAccountKey {
				client_email: "robot@project.iam.gserviceaccount.com".into(),
				private_key: PRIVATE_KEY.into(),
				private_key_id: Some("key-1".into()),
				token_uri: None,
				project_id: Some("project".into()),
			},
		)
	}

	#[test]
	fn scoping_required_until_scopes_apply() {
		let credential = credential();
		let scoping = credential.scoping().expect("Service accounts expose scoping.");

		assert!(scoping.scoping_required());

		let empty = scoping.with_scopes(&ScopeSet::default());

		assert!(empty.scoping().is_some_and(|scoping| scoping.scoping_required()));

		let scoped = scoping.with_scopes(
			&ScopeSet::new(["https://www.googleapis.com/auth/cloud-platform"])
				.expect("Scope set should be valid."),
		);

		assert!(!scoped.scoping().is_some_and(|scoping| scoping.scoping_required()));
	}

	#[test]
	fn assertion_is_signed_for_the_token_endpoint() {
		let scopes = ScopeSet::new(["scope-b", "scope-a"]).expect("Scope set should be valid.");
		let credential = ServiceAccountCredential { scopes: Some(scopes), ..credential() };
		let now = OffsetDateTime::now_utc();
		let assertion = credential.assertion(now).expect("Assertion should sign.");
		let header = jsonwebtoken::decode_header(&assertion).expect("Header should decode.");

		assert_eq!(header.alg, Algorithm::RS256);
		assert_eq!(header.kid.as_deref(), Some("key-1"));

		let mut validation = Validation::new(Algorithm::RS256);

		validation.set_audience(&[GOOGLE_TOKEN_URI]);
		validation.set_issuer(&["robot@project.iam.gserviceaccount.com"]);

		let decoded = jsonwebtoken::decode::<DecodedClaims>(
			&assertion,
			&DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).expect("Public key should load."),
			&validation,
		)
		.expect("Assertion should verify.");

		assert_eq!(decoded.claims.iss, "robot@project.iam.gserviceaccount.com");
		assert_eq!(decoded.claims.scope, "scope-a scope-b");
		assert_eq!(decoded.claims.iat, now.unix_timestamp());
		assert_eq!(decoded.claims.exp - decoded.claims.iat, 3600);
	}

	#[test]
	fn malformed_keys_are_rejected() {
		let mut key = credential().key.as_ref().clone();

		key.private_key = "not a pem".into();

		let err = ServiceAccountCredential::new(ReqwestClient::default(), key)
			.assertion(OffsetDateTime::now_utc())
			.expect_err("Malformed keys must not sign.");

		assert!(matches!(err, IdentityError::InvalidKey(_)));
	}
}

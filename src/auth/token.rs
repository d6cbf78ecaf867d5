//! Redacted access tokens and the refresh-aware cache shared by identity credentials.

// self
use crate::{_prelude::*, error::IdentityError};

/// Bearer token minted by an identity credential.
///
/// `Debug` and `Display` redact the secret so tokens can travel through spans safely.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
	secret: String,
	/// Expiry instant; `None` means the token never expires locally.
	pub expires_at: Option<OffsetDateTime>,
}
impl AccessToken {
	/// Wraps a token value with an optional expiry instant.
	pub fn new(value: impl Into<String>, expires_at: Option<OffsetDateTime>) -> Self {
		Self { secret: value.into(), expires_at }
	}

	/// Builds a token that expires `expires_in` after `issued_at`.
	///
	/// Lifetimes must be positive and the expiry must stay representable.
	pub fn expiring_in(
		value: impl Into<String>,
		issued_at: OffsetDateTime,
		expires_in: Duration,
	) -> Result<Self, IdentityError> {
		if !expires_in.is_positive() {
			return Err(IdentityError::NonPositiveExpiresIn);
		}

		let expires_at =
			issued_at.checked_add(expires_in).ok_or(IdentityError::ExpiresInOutOfRange)?;

		Ok(Self::new(value, Some(expires_at)))
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.secret
	}

	/// Returns `true` if the token stays valid for at least `margin` after `now`.
	pub fn is_fresh_at(&self, now: OffsetDateTime, margin: Duration) -> bool {
		match self.expires_at {
			Some(expires_at) => now + margin < expires_at,
			None => true,
		}
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("secret", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Single-token cache that refreshes ahead of expiry and collapses concurrent refreshes.
#[derive(Debug, Default)]
pub struct TokenCache {
	current: RwLock<Option<AccessToken>>,
	refresh: AsyncMutex<()>,
}
impl TokenCache {
	/// Tokens closer than this to their expiry are refreshed.
	pub const REFRESH_MARGIN: Duration = Duration::seconds(60);

	/// Returns the cached token when fresh, otherwise runs `fetch` once and caches its result.
	///
	/// Callers that race on an expired token wait for the in-flight fetch instead of issuing
	/// their own.
	pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<AccessToken, IdentityError>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<AccessToken, IdentityError>>,
	{
		if let Some(token) = self.fresh(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let _singleflight = self.refresh.lock().await;

		if let Some(token) = self.fresh(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let token = fetch().await?;

		*self.current.write() = Some(token.clone());

		Ok(token)
	}

	/// Drops the cached token so the next call refreshes.
	pub fn invalidate(&self) {
		*self.current.write() = None;
	}

	fn fresh(&self, now: OffsetDateTime) -> Option<AccessToken> {
		self.current
			.read()
			.as_ref()
			.filter(|token| token.is_fresh_at(now, Self::REFRESH_MARGIN))
			.cloned()
	}
}

//! Shared token endpoint plumbing for the ADC credentials.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	error::IdentityError,
	obs::{self, OpSpan, Operation, Outcome},
};

const BODY_PREVIEW_LIMIT: usize = 256;

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	#[serde(default)]
	expires_in: Option<i64>,
}

/// Posts a form to an OAuth token endpoint and parses the minted token.
pub(crate) async fn exchange(
	http: &ReqwestClient,
	token_uri: &str,
	form: &[(&str, &str)],
	stage: &'static str,
) -> Result<AccessToken, IdentityError> {
	observe(stage, async move {
		let issued_at = OffsetDateTime::now_utc();
		let response = http.post(token_uri).form(form).send().await?;

		read_token(response, issued_at).await
	})
	.await
}

/// Records span + outcome for a token fetch.
pub(crate) async fn observe<F>(stage: &'static str, fut: F) -> Result<AccessToken, IdentityError>
where
	F: Future<Output = Result<AccessToken, IdentityError>>,
{
	const OP: Operation = Operation::FetchToken;

	let span = OpSpan::new(OP, stage);

	obs::record_outcome(OP, Outcome::Attempt);

	let result = span.instrument(fut).await;

	obs::record_outcome(OP, Outcome::of(&result));

	result
}

/// Converts a token endpoint response into an [`AccessToken`].
pub(crate) async fn read_token(
	response: reqwest::Response,
	issued_at: OffsetDateTime,
) -> Result<AccessToken, IdentityError> {
	let status = response.status();
	let body = response.bytes().await?;

	if !status.is_success() {
		return Err(IdentityError::TokenEndpoint {
			status: status.as_u16(),
			message: preview(&body),
		});
	}

	let parsed: TokenResponse =
		serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(&body))?;

	match parsed.expires_in {
		Some(secs) =>
			AccessToken::expiring_in(parsed.access_token, issued_at, Duration::seconds(secs)),
		None => Ok(AccessToken::new(parsed.access_token, None)),
	}
}

fn preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	let mut buf = text.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn preview_truncates_long_bodies() {
		let long = "x".repeat(BODY_PREVIEW_LIMIT + 10);
		let short = preview(long.as_bytes());

		assert_eq!(short.chars().count(), BODY_PREVIEW_LIMIT + 1);
		assert!(short.ends_with('…'));
		assert_eq!(preview(b"invalid_grant"), "invalid_grant");
	}
}

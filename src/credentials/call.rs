//! Per-call identity credentials and the tower middleware that applies them.

// std
use std::task::{Context, Poll};
// crates.io
use http::{HeaderValue, Request, header::AUTHORIZATION};
use tower::Service;
// self
use crate::{
	_prelude::*,
	auth::IdentityCredential,
	error::{BoxError, ConfigError},
};

/// Identity credential wrapped for use on individual RPCs.
#[derive(Clone)]
pub struct CallCredentials {
	identity: Arc<dyn IdentityCredential>,
}
impl CallCredentials {
	/// Derives call credentials from an identity credential.
	pub fn from_identity(identity: Arc<dyn IdentityCredential>) -> Self {
		Self { identity }
	}

	/// Returns the wrapped identity credential.
	pub fn identity(&self) -> &Arc<dyn IdentityCredential> {
		&self.identity
	}

	/// Mints (or reuses) a token and renders it as a sensitive `authorization` value.
	pub async fn authorization_header(&self) -> Result<HeaderValue> {
		let token = self.identity.access_token().await?;
		let mut value = HeaderValue::try_from(format!("Bearer {}", token.expose()))
			.map_err(ConfigError::from)?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl Debug for CallCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("CallCredentials(..)")
	}
}

/// Service wrapper that attaches call credentials to every request.
#[derive(Clone, Debug)]
pub struct AuthService<S> {
	inner: S,
	credentials: CallCredentials,
}
impl<S> AuthService<S> {
	/// Wraps `inner` so requests carry `credentials`.
	pub fn new(inner: S, credentials: CallCredentials) -> Self {
		Self { inner, credentials }
	}

	/// Returns the wrapped service.
	pub fn get_ref(&self) -> &S {
		&self.inner
	}
}
impl<S, B> Service<Request<B>> for AuthService<S>
where
	S: 'static + Clone + Send + Service<Request<B>>,
	S::Future: 'static + Send,
	S::Error: Into<BoxError>,
	B: 'static + Send,
{
	type Error = BoxError;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;
	type Response = S::Response;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx).map_err(Into::into)
	}

	fn call(&mut self, mut request: Request<B>) -> Self::Future {
		// The clone may not be ready; keep the driven instance and leave the clone behind.
		let clone = self.inner.clone();
		let mut inner = std::mem::replace(&mut self.inner, clone);
		let credentials = self.credentials.clone();

		Box::pin(async move {
			let value = credentials.authorization_header().await?;

			request.headers_mut().insert(AUTHORIZATION, value);

			inner.call(request).await.map_err(Into::into)
		})
	}
}

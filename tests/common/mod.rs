#![allow(dead_code)]

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use parking_lot::Mutex;
// self
use grpc_stub_auth::{
	auth::{
		AccessToken, IdentityCredential, IdentityFuture, IdentityProvider, ScopeSet, Scoping,
	},
	error::IdentityError,
};

/// Credential that records every scope set applied to it.
#[derive(Clone)]
pub struct RecordingCredential {
	pub token: String,
	pub requires_scoping: bool,
	pub scoped_with: Option<ScopeSet>,
	pub applied: Arc<Mutex<Vec<ScopeSet>>>,
}
impl RecordingCredential {
	pub fn new(token: &str, requires_scoping: bool) -> Self {
		Self {
			token: token.into(),
			requires_scoping,
			scoped_with: None,
			applied: Default::default(),
		}
	}

	pub fn applied(&self) -> Vec<ScopeSet> {
		self.applied.lock().clone()
	}
}
impl IdentityCredential for RecordingCredential {
	fn access_token(&self) -> IdentityFuture<'_, AccessToken> {
		let token = match &self.scoped_with {
			Some(scopes) => format!("{}+{}", self.token, scopes.normalized()),
			None => self.token.clone(),
		};

		Box::pin(async move { Ok(AccessToken::new(token, None)) })
	}

	fn scoping(&self) -> Option<&dyn Scoping> {
		Some(self)
	}
}
impl Scoping for RecordingCredential {
	fn scoping_required(&self) -> bool {
		self.requires_scoping && self.scoped_with.is_none()
	}

	fn with_scopes(&self, scopes: &ScopeSet) -> Arc<dyn IdentityCredential> {
		self.applied.lock().push(scopes.clone());

		Arc::new(Self { scoped_with: Some(scopes.clone()), ..self.clone() })
	}
}

/// Provider returning a fixed credential or a fixed failure.
pub struct FakeProvider {
	credential: Option<Arc<dyn IdentityCredential>>,
	failure: Option<String>,
	calls: AtomicUsize,
}
impl FakeProvider {
	pub fn returning(credential: Arc<dyn IdentityCredential>) -> Arc<Self> {
		Arc::new(Self { credential: Some(credential), failure: None, calls: AtomicUsize::new(0) })
	}

	pub fn failing(message: &str) -> Arc<Self> {
		Arc::new(Self {
			credential: None,
			failure: Some(message.into()),
			calls: AtomicUsize::new(0),
		})
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl IdentityProvider for FakeProvider {
	fn application_default(&self) -> IdentityFuture<'_, Arc<dyn IdentityCredential>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			match (&self.credential, &self.failure) {
				(Some(credential), _) => Ok(credential.clone()),
				(None, Some(message)) => Err(IdentityError::custom(message.clone())),
				(None, None) => Err(IdentityError::NotFound),
			}
		})
	}
}

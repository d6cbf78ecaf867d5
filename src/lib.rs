//! Authenticated gRPC stub construction on top of Application Default Credentials.
//!
//! The crate resolves ambient identity credentials, optionally scopes them, composes them with
//! TLS into [`credentials::ChannelCredentials`], and hands the result to any stub constructor
//! bound to a `host:port` address. [`codec`] adds a byte-length helper for batching layers.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

#[cfg(feature = "reqwest")] pub mod adc;
pub mod auth;
pub mod codec;
pub mod credentials;
pub mod error;
pub mod obs;
pub mod resolver;
pub mod stub;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{Error, Result};
}

pub use prost;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use tonic;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

pub use stub::create_stub;

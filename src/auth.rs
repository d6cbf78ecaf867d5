//! Identity-domain types: scope sets, access tokens, and the identity provider contracts.

pub mod identity;
pub mod scope;
pub mod token;

pub use identity::*;
pub use scope::*;
pub use token::*;

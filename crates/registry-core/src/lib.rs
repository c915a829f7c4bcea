//! # Registry Core
//!
//! Core types and policies for the application registry:
//!
//! - **Application record**: an application's identity, shared secret, trust
//!   level, and ownership metadata
//! - **Trust levels**: `Root` > `Master` > `External`, ordered by decreasing
//!   registry privilege
//! - **Secret redaction**: the literal secret leaves the registry in clear
//!   form only on exact self-lookup; every other viewer sees it cleared or
//!   one-way obfuscated
//! - **Challenge verification**: HMAC-SHA256 proof of secret possession over
//!   a caller-supplied nonce
//! - **Identity tokens**: JWT carrying the acting user principal in `sub`

pub mod challenge;
pub mod error;
pub mod redact;
pub mod token;
pub mod types;

pub use challenge::{compute_challenge, verify_challenge};
pub use error::{RegistryError, Result};
pub use redact::{obfuscate_secret, redact};
pub use token::{IdentityToken, TokenVerifier};
pub use types::{AppInfo, Application, Credentials, TrustLevel};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

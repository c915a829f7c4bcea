//! Secret redaction applied at every response boundary
//!
//! The literal secret is returned in clear form only when the viewer is
//! exactly the application that owns it. Every other authorized viewer sees
//! a deterministic one-way transformation so equality-style comparison stays
//! possible without exfiltrating the material.
//!
//! Known weakness: the obfuscation is an unsalted SHA-256 digest of the
//! secret, so an offline dictionary attack against a captured digest is
//! feasible. This mirrors the historical unsalted-digest behavior and is
//! kept deliberately; do not treat the digest as secret-grade material.

use sha2::{Digest, Sha256};

use crate::types::Application;

/// One-way, deterministic obfuscation of a secret
pub fn obfuscate_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Redact a record for a viewer
///
/// Self-view clears the secret entirely; any other view replaces it with
/// [`obfuscate_secret`]. Applied uniformly by every operation that returns
/// an [`Application`], never inline per call site.
pub fn redact(mut app: Application, viewer_id: &str) -> Application {
    if app.id == viewer_id {
        app.secret.clear();
    } else {
        app.secret = obfuscate_secret(&app.secret);
    }
    app
}

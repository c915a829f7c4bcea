//! Common types used across the application registry

use serde::{Deserialize, Serialize};

/// Trust tier of a registered application
///
/// Ordered by decreasing registry privilege: `Root` sees everything,
/// `Master` manages applications on behalf of its users, `External` is an
/// ordinary application with self-visibility only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrustLevel {
    /// Full administrative visibility
    Root,
    /// May register/deregister applications on behalf of users
    Master,
    /// Ordinary application, self-visibility only
    #[default]
    External,
}

/// Descriptive metadata attached to an application record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppInfo {
    /// User principal that owns this application, set once at registration
    pub created_by: String,

    /// Registration time, unix seconds
    pub created_at: i64,

    /// Display label
    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub logo_url: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub website: String,
}

/// An application record, the registry's unit of data
///
/// `id` is the stable primary key and is immutable once assigned. `secret`
/// is opaque shared-secret material; it is never logged and never leaves the
/// registry in clear form except to the exact owning application (see
/// [`crate::redact`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Globally unique, stable identifier
    pub id: String,

    /// Shared secret used for HMAC challenge verification
    #[serde(default)]
    pub secret: String,

    /// Trust tier
    #[serde(default)]
    pub level: TrustLevel,

    /// Lifecycle flag
    #[serde(default)]
    pub activated: bool,

    /// Informational OAuth callback URL
    #[serde(default)]
    pub oauth_callback_url: String,

    /// Ownership and descriptive metadata
    #[serde(default)]
    pub info: AppInfo,
}

impl Application {
    /// Create a minimal record with the given id and secret
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
            level: TrustLevel::External,
            activated: false,
            oauth_callback_url: String::new(),
            info: AppInfo::default(),
        }
    }

    /// Set the trust level
    pub fn with_level(mut self, level: TrustLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the owning user principal
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.info.created_by = owner.into();
        self
    }

    /// Mark the record activated
    pub fn activated(mut self) -> Self {
        self.activated = true;
        self
    }
}

/// Application credentials presented per call
///
/// `key` is the application id; `secret` authenticates the calling
/// application, not the end user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_defaults_to_external() {
        let app = Application::new("x", "s");
        assert_eq!(app.level, TrustLevel::External);
    }

    #[test]
    fn record_round_trips_through_json() {
        let app = Application::new("mail", "hunter2")
            .with_level(TrustLevel::Master)
            .with_owner("alice")
            .activated();

        let encoded = serde_json::to_string(&app).unwrap();
        let decoded: Application = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, app);
    }

    #[test]
    fn missing_optional_fields_decode_with_defaults() {
        let decoded: Application =
            serde_json::from_str(r#"{"id":"x","info":{"created_by":"alice","created_at":12}}"#)
                .unwrap();
        assert_eq!(decoded.id, "x");
        assert_eq!(decoded.secret, "");
        assert_eq!(decoded.level, TrustLevel::External);
        assert!(!decoded.activated);
        assert_eq!(decoded.info.created_by, "alice");
    }
}

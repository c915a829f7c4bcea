//! Registry service operations
//!
//! Orchestrates each remote operation: resolve the caller's credentials and
//! identity token, evaluate the authorization policy, run the repository
//! query, and pass every returned record through the redaction function.
//! Transport concerns (routing, status codes, wire shapes) stay in the API
//! layer; nothing here retries — that belongs to the transport.

use chrono::Utc;
use tracing::{debug, info};

use registry_core::{
    challenge, redact, Application, Credentials, IdentityToken, RegistryError, Result,
    TokenVerifier,
};

use crate::policy::{self, GetAccess, ListScope};
use crate::repo::{drain, Applications};

/// The application-registry service core
#[derive(Debug, Clone)]
pub struct RegistryService {
    apps: Applications,
    tokens: TokenVerifier,
}

impl RegistryService {
    pub fn new(apps: Applications, tokens: TokenVerifier) -> Self {
        Self { apps, tokens }
    }

    /// Repository handle, for bootstrap and seeding
    pub fn applications(&self) -> &Applications {
        &self.apps
    }

    /// Resolve caller credentials to the calling application
    ///
    /// An unknown key and a wrong secret are the same failure: the caller
    /// has not proven who it is.
    async fn authenticate(&self, creds: &Credentials) -> Result<Application> {
        let app = match self.apps.get(&creds.key).await {
            Ok(app) => app,
            Err(RegistryError::NotFound) => return Err(RegistryError::Forbidden),
            Err(other) => return Err(other),
        };
        if !policy::secrets_match(&creds.secret, &app.secret) {
            return Err(RegistryError::Forbidden);
        }
        Ok(app)
    }

    /// Verify an identity token if one was presented
    fn identity(&self, token: Option<&str>) -> Result<Option<IdentityToken>> {
        token.map(|t| self.tokens.verify(t)).transpose()
    }

    /// Verify an identity token, requiring its presence
    fn require_identity(&self, token: Option<&str>) -> Result<IdentityToken> {
        self.identity(token)?.ok_or(RegistryError::Forbidden)
    }

    /// Register (or overwrite) an application record
    ///
    /// Caller must be `Master` and present an identity token; the token
    /// subject becomes the owner. See [`policy::stamp_registration`] for the
    /// invariants stamped onto the record.
    pub async fn register(
        &self,
        creds: &Credentials,
        token: Option<&str>,
        mut app: Application,
    ) -> Result<()> {
        let caller = self.authenticate(creds).await?;
        let token = self.require_identity(token)?;
        policy::ensure_may_register(&caller, &token, &app.id)?;

        policy::stamp_registration(&mut app, &token, Utc::now().timestamp());
        self.apps.save(&app).await?;
        info!(id = %app.id, owner = %app.info.created_by, "registered application");
        Ok(())
    }

    /// Remove an application record on behalf of its owner
    pub async fn deregister(
        &self,
        creds: &Credentials,
        token: Option<&str>,
        id: &str,
    ) -> Result<()> {
        let caller = self.authenticate(creds).await?;
        let token = self.require_identity(token)?;

        let target = self.apps.get(id).await?;
        policy::ensure_may_deregister(&caller, &token, &target)?;

        self.apps.delete(id).await?;
        info!(id = %id, "deregistered application");
        Ok(())
    }

    /// Existence check: a lookup miss means "does not exist", not an error
    pub async fn check_exists(&self, creds: &Credentials, id: &str) -> Result<bool> {
        self.authenticate(creds).await?;
        match self.apps.get(id).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// List applications visible to the caller, redacted
    ///
    /// `Root` sees everything, `Master` sees the token subject's records,
    /// everyone else gets only their own record back.
    pub async fn list(
        &self,
        creds: &Credentials,
        token: Option<&str>,
    ) -> Result<Vec<Application>> {
        let caller = self.authenticate(creds).await?;
        let token = self.identity(token)?;

        let cursor = match policy::list_scope(&caller, token.as_ref())? {
            ListScope::SelfOnly => {
                debug!(caller = %caller.id, "self-only listing");
                let own = caller.clone();
                return Ok(vec![redact(own, &caller.id)]);
            }
            ListScope::All => self.apps.list_all(Vec::new()).await?,
            ListScope::Owner(user) => {
                debug!(caller = %caller.id, owner = %user, "owner-scoped listing");
                self.apps.list_for_user(&user, Vec::new()).await?
            }
        };

        let records = drain(cursor)?;
        Ok(records
            .into_iter()
            .map(|app| redact(app, &caller.id))
            .collect())
    }

    /// Fetch one application record, redacted for the caller
    pub async fn get(
        &self,
        creds: &Credentials,
        token: Option<&str>,
        id: &str,
    ) -> Result<Application> {
        let caller = self.authenticate(creds).await?;
        let token = self.identity(token)?;
        let access = policy::get_access(&caller, id, token.as_ref())?;

        let record = self.apps.get(id).await?;
        policy::ensure_owner_match(&access, &record)?;

        Ok(redact(record, &caller.id))
    }

    /// Verify an authentication challenge against a target's stored secret
    ///
    /// Deliberately unauthenticated: proving possession of the secret *is*
    /// the authentication.
    pub async fn verify_challenge(
        &self,
        id: &str,
        nonce_hex: &str,
        challenge_hex: &str,
    ) -> Result<bool> {
        let app = self.apps.get(id).await?;
        let verified = challenge::verify_challenge(&app.secret, nonce_hex, challenge_hex)?;
        debug!(id = %id, verified, "challenge verification");
        Ok(verified)
    }
}

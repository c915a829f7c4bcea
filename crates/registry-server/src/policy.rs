//! Authorization policy
//!
//! Per-operation decision rules keyed on caller trust level, resource
//! ownership, and identity-token presence. The functions here are pure
//! decisions over already-resolved inputs; credential resolution and record
//! fetching live in the service layer, redaction in `registry_core::redact`.
//!
//! Two failure kinds are distinguished and never downgraded: `Forbidden`
//! (the caller failed to prove who it is) and `Unauthorized` (the caller is
//! known but lacks the trust level or ownership the operation requires).

use subtle::ConstantTimeEq;

use registry_core::{Application, IdentityToken, RegistryError, Result, TrustLevel};

/// Distinguished bootstrap identity; the only id allowed to hold `Master`
/// at registration time
pub const BOOTSTRAP_APP_ID: &str = "ome";

/// Constant-time comparison of presented and stored secrets
pub fn secrets_match(presented: &str, stored: &str) -> bool {
    let presented = presented.as_bytes();
    let stored = stored.as_bytes();
    if presented.len() != stored.len() {
        return false;
    }
    presented.ct_eq(stored).into()
}

/// Require `Master` level of the caller
pub fn ensure_master(caller: &Application) -> Result<()> {
    if caller.level != TrustLevel::Master {
        return Err(RegistryError::Unauthorized);
    }
    Ok(())
}

/// Decide whether a registration may proceed
///
/// The caller must be `Master`. Only the bootstrap identity itself may
/// register a record under the bootstrap id.
pub fn ensure_may_register(
    caller: &Application,
    token: &IdentityToken,
    target_id: &str,
) -> Result<()> {
    ensure_master(caller)?;
    if target_id == BOOTSTRAP_APP_ID && token.subject != BOOTSTRAP_APP_ID {
        return Err(RegistryError::Unauthorized);
    }
    Ok(())
}

/// Stamp registration-time invariants onto a record
///
/// Ownership is set once, here, to the token subject; the creation time is
/// now; the level is forced to `External` for everything except the
/// bootstrap identity.
pub fn stamp_registration(app: &mut Application, token: &IdentityToken, now: i64) {
    app.info.created_by = token.subject.clone();
    app.info.created_at = now;
    if app.id != BOOTSTRAP_APP_ID {
        app.level = TrustLevel::External;
    }
}

/// Scope of a listing, decided per caller level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    /// Full unfiltered listing (`Root`)
    All,
    /// Listing scoped to applications owned by this user (`Master`)
    Owner(String),
    /// No listing; the caller receives only its own redacted record
    SelfOnly,
}

/// Decide the listing scope for a caller
///
/// `Master` callers must present an identity token; its absence is an
/// authentication failure.
pub fn list_scope(caller: &Application, token: Option<&IdentityToken>) -> Result<ListScope> {
    match caller.level {
        TrustLevel::Root => Ok(ListScope::All),
        TrustLevel::Master => match token {
            Some(token) => Ok(ListScope::Owner(token.subject.clone())),
            None => Err(RegistryError::Forbidden),
        },
        TrustLevel::External => Ok(ListScope::SelfOnly),
    }
}

/// How a caller may see one target record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetAccess {
    /// The caller fetches its own record
    SelfLookup,
    /// `Root` visibility, any record
    Admin,
    /// `Master` visibility, valid only if the record's owner matches
    OwnerScoped(String),
}

/// Decide access for a point lookup, before the record is fetched
///
/// Non-`Root`, non-self lookups require `Master` level and a token naming
/// the owner the caller acts for; the ownership check itself happens once
/// the record is in hand, via [`ensure_owner_match`].
pub fn get_access(
    caller: &Application,
    target_id: &str,
    token: Option<&IdentityToken>,
) -> Result<GetAccess> {
    if caller.id == target_id {
        return Ok(GetAccess::SelfLookup);
    }
    match caller.level {
        TrustLevel::Root => Ok(GetAccess::Admin),
        TrustLevel::Master => match token {
            Some(token) => Ok(GetAccess::OwnerScoped(token.subject.clone())),
            None => Err(RegistryError::Unauthorized),
        },
        TrustLevel::External => Err(RegistryError::Unauthorized),
    }
}

/// Enforce the ownership half of an owner-scoped access
pub fn ensure_owner_match(access: &GetAccess, record: &Application) -> Result<()> {
    if let GetAccess::OwnerScoped(user) = access {
        if &record.info.created_by != user {
            return Err(RegistryError::Unauthorized);
        }
    }
    Ok(())
}

/// Decide whether a deregistration may proceed
///
/// The caller must be `Master` and the target's owner must equal the token
/// subject, regardless of caller level beyond that.
pub fn ensure_may_deregister(
    caller: &Application,
    token: &IdentityToken,
    target: &Application,
) -> Result<()> {
    ensure_master(caller)?;
    if target.info.created_by != token.subject {
        return Err(RegistryError::Unauthorized);
    }
    Ok(())
}

//! First-start initialization
//!
//! The registry refuses to be useful without the distinguished bootstrap
//! record: it is the `Master` identity through which every other application
//! is registered. Synthesis is idempotent, guarded by the persisted
//! existence check itself — never by in-memory state — so concurrent or
//! repeated startups converge on one record.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use rand::RngCore;
use tracing::info;

use registry_core::{Application, Result, TrustLevel};

use crate::policy::BOOTSTRAP_APP_ID;
use crate::repo::Applications;

const BOOTSTRAP_SECRET_BYTES: usize = 16;

/// Ensure the bootstrap record exists
///
/// Returns the freshly generated secret when the record was synthesized on
/// this call, so the binary can surface it to an operator exactly once.
/// Returns `None` when the record already existed.
pub async fn ensure_bootstrap(apps: &Applications) -> Result<Option<String>> {
    match apps.get(BOOTSTRAP_APP_ID).await {
        Ok(_) => return Ok(None),
        Err(err) if err.is_not_found() => {}
        Err(err) => return Err(err),
    }

    let mut secret_bytes = [0u8; BOOTSTRAP_SECRET_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut secret_bytes);
    let secret = STANDARD_NO_PAD.encode(secret_bytes);

    let mut app = Application::new(BOOTSTRAP_APP_ID, secret.clone())
        .with_level(TrustLevel::Master)
        .with_owner(BOOTSTRAP_APP_ID)
        .activated();
    app.info.created_at = chrono::Utc::now().timestamp();
    app.info.label = "Registry bootstrap application".to_string();
    app.info.description = "Master identity used to register applications".to_string();

    apps.save(&app).await?;
    info!(id = %BOOTSTRAP_APP_ID, "synthesized bootstrap application record");
    Ok(Some(secret))
}

/// Upsert application records from a JSON seed file
///
/// The file holds a JSON array of application records. Used at startup to
/// preload a registry, mirroring an operator bulk-import.
pub async fn load_seed(apps: &Applications, path: &std::path::Path) -> Result<usize> {
    let bytes = std::fs::read(path)
        .map_err(|e| registry_core::RegistryError::Invalid(format!("seed file: {e}")))?;
    let list: Vec<Application> = serde_json::from_slice(&bytes)
        .map_err(|e| registry_core::RegistryError::Invalid(format!("seed file: {e}")))?;

    for app in &list {
        apps.save(app).await?;
    }
    info!(count = list.len(), path = %path.display(), "loaded seed applications");
    Ok(list.len())
}

//! Application repository
//!
//! CRUD-plus-query façade over the record store. Owns encode/decode of the
//! application record and the choice of storage path per query shape: the
//! rare, privileged "list everything" walks the whole collection decoding
//! each document, while "list one user's applications" rides the secondary
//! index over the owner field. Both paths come back as the same
//! [`AppCursor`], so callers never see which path produced their records.

pub mod cursor;

pub use cursor::{drain, AppCursor, AppFilter};

use std::sync::Arc;

use registry_core::{Application, RegistryError, Result};

use crate::storage::{IndexField, RecordStore};

/// Repository over application records
#[derive(Debug, Clone)]
pub struct Applications {
    store: Arc<dyn RecordStore>,
}

impl Applications {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Encode and upsert a record by id; a full overwrite, no merge
    pub async fn save(&self, app: &Application) -> Result<()> {
        let encoded = serde_json::to_string(app)
            .map_err(|e| RegistryError::Decode(format!("encoding {}: {e}", app.id)))?;
        self.store.save(&app.id, &encoded).await?;
        Ok(())
    }

    /// Point lookup by id
    pub async fn get(&self, id: &str) -> Result<Application> {
        let value = self.store.get(id).await?;
        serde_json::from_str(&value)
            .map_err(|e| RegistryError::Decode(format!("corrupt record {id}: {e}")))
    }

    /// Remove a record; absence is not an error
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id).await?;
        Ok(())
    }

    /// Full-scan listing of every record, decoded from its document form
    pub async fn list_all(&self, filters: Vec<AppFilter>) -> Result<AppCursor> {
        let raw = self.store.list_all().await?;
        Ok(AppCursor::new(raw, filters))
    }

    /// Indexed listing of one user's applications
    pub async fn list_for_user(&self, user: &str, filters: Vec<AppFilter>) -> Result<AppCursor> {
        let raw = self.store.search(IndexField::CreatedBy, user).await?;
        Ok(AppCursor::new(raw, filters))
    }
}

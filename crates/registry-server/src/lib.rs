//! # Registry Server
//!
//! The application-registry service: stores records describing client
//! applications (identity, secret, ownership, trust level) and exposes
//! operations to register, list, fetch, and verify them.
//!
//! ## Layers
//!
//! - [`storage`] — record-store contract and the in-memory backend
//! - [`repo`] — application repository and the filtering cursor that hides
//!   the scan-vs-index storage split from callers
//! - [`policy`] — per-operation authorization decisions over the trust
//!   hierarchy (`Root` > `Master` > `External`)
//! - [`service`] — operation orchestration: authenticate, authorize, query,
//!   redact
//! - [`bootstrap`] — idempotent synthesis of the bootstrap `Master` record
//! - [`api`] — axum HTTP boundary
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `POST /v1/apps` - Register an application
//! - `GET /v1/apps` - List applications visible to the caller
//! - `GET /v1/apps/{id}` - Fetch one application, redacted
//! - `DELETE /v1/apps/{id}` - Deregister an application
//! - `GET /v1/apps/{id}/exists` - Existence check
//! - `POST /v1/apps/{id}/challenge` - Verify an authentication challenge

pub mod api;
pub mod bootstrap;
pub mod policy;
pub mod repo;
pub mod service;
pub mod storage;

pub use api::create_router;
pub use api::handlers::AppState;
pub use bootstrap::ensure_bootstrap;
pub use policy::BOOTSTRAP_APP_ID;
pub use repo::{AppCursor, AppFilter, Applications};
pub use service::RegistryService;
pub use storage::{MemoryRecordStore, RecordStore};

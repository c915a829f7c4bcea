//! Application Registry Server Binary

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use registry_core::TokenVerifier;
use registry_server::{
    bootstrap, create_router, AppState, Applications, MemoryRecordStore, RegistryService,
};

#[tokio::main]
async fn main() {
    // Initialize logging
    let log_level = env::var("REGISTRY_LOG_LEVEL")
        .unwrap_or_else(|_| "info".into())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // Configuration
    let port: u16 = env::var("REGISTRY_PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()
        .expect("REGISTRY_PORT must be a valid port number");

    let token_key = env::var("REGISTRY_TOKEN_KEY").unwrap_or_else(|_| {
        warn!("REGISTRY_TOKEN_KEY not set, identity tokens use an insecure development key");
        "registry-dev-key".into()
    });

    let data_dir = PathBuf::from(env::var("REGISTRY_DATA_DIR").unwrap_or_else(|_| ".".into()));

    // Initialize storage
    // TODO: load a persistent backend when REGISTRY_DATABASE_URL is set
    let store = Arc::new(MemoryRecordStore::new());
    let apps = Applications::new(store);

    // Bootstrap record: synthesized on first start, surfaced once
    match bootstrap::ensure_bootstrap(&apps).await {
        Ok(Some(secret)) => {
            let path = data_dir.join("bootstrap-app.secret");
            match std::fs::write(&path, &secret) {
                Ok(()) => info!(path = %path.display(), "bootstrap secret written"),
                Err(err) => {
                    warn!(error = %err, "could not persist bootstrap secret");
                    info!(secret = %secret, "bootstrap application secret");
                }
            }
        }
        Ok(None) => {}
        Err(err) => {
            panic!("bootstrap initialization failed: {err}");
        }
    }

    // Optional seed file of application records
    if let Ok(seed) = env::var("REGISTRY_SEED_FILE") {
        bootstrap::load_seed(&apps, &PathBuf::from(&seed))
            .await
            .expect("failed to load seed file");
    }

    let service = RegistryService::new(apps, TokenVerifier::new(token_key.as_bytes()));
    let state = Arc::new(AppState { service });

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!(addr = %addr, "application registry listening");

    axum::serve(listener, app).await.expect("Server error");
}

//! Fuelmap API Server implementation
//!
//! HTTP API using Axum: upload template + export, download the filled template.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::config::Profile;

/// API Server configuration
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Deployment profile file; the built-in profile when `None`
    pub profile: Option<PathBuf>,
    /// Upper bound for a whole upload request, in megabytes
    pub max_upload_mb: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            profile: None,
            max_upload_mb: 25,
        }
    }
}

impl ApiConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

/// Shared application state. Read-only for the lifetime of the server.
#[derive(Clone)]
pub struct AppState {
    pub version: String,
    pub profile: Arc<Profile>,
}

impl AppState {
    pub fn new(profile: Profile) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            profile: Arc::new(profile),
        }
    }
}

/// Build the router with all endpoints and middleware
pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Core API endpoints
        .route("/api/v1/profile", get(handlers::profile))
        .route("/api/v1/transform", post(handlers::transform))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        // State and middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fuelmap_server=info,fuelmap=info,tower_http=info".into()),
        )
        .init();

    let profile = Profile::load_or_default(config.profile.as_deref())?;
    info!(
        profile = %profile.name,
        excluded = profile.excluded_vehicles.len(),
        columns = profile.columns.len(),
        "profile loaded"
    );

    let state = Arc::new(AppState::new(profile));
    let app = build_router(state, config.max_upload_bytes());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("⛽ Fuelmap API Server starting on http://{}", addr);
    info!("   Endpoints: /api/v1/transform, /api/v1/profile");
    info!("   Health: /health, Version: /version");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Fuelmap API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.profile.is_none());
        assert_eq!(config.max_upload_bytes(), 25 * 1024 * 1024);
    }

    #[test]
    fn test_config_address_format() {
        let config = ApiConfig {
            host: "192.168.1.100".to_string(),
            port: 9090,
            ..ApiConfig::default()
        };
        let addr_str = format!("{}:{}", config.host, config.port);
        let addr: SocketAddr = addr_str.parse().unwrap();
        assert_eq!(addr.port(), 9090);
    }

    #[test]
    fn test_app_state_shares_profile() {
        let state = AppState::new(Profile::default());
        let state_clone = state.clone();
        assert!(Arc::ptr_eq(&state.profile, &state_clone.profile));
        assert_eq!(state.version, env!("CARGO_PKG_VERSION"));
    }
}

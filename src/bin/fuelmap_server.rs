//! Fuelmap API Server binary
//!
//! Upload-process-download HTTP surface for the transformer.

use clap::Parser;
use fuelmap::api::{run_api_server, server::ApiConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fuelmap-server")]
#[command(version)]
#[command(author = "RoyalBit Inc. <admin@royalbit.ca>")]
#[command(about = "Fuelmap API Server - fill the import template over HTTP")]
#[command(long_about = r#"
Fuelmap API Server

Endpoints:
  - POST /api/v1/transform - multipart upload of 'template' and 'data',
                             responds with the filled template (.xlsx)
  - GET  /api/v1/profile   - Active deployment profile

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Example usage:
  fuelmap-server                           # Start on localhost:8080
  fuelmap-server --host 0.0.0.0 --port 3000 --profile perfil.yaml

  curl -X POST http://localhost:8080/api/v1/transform \
    -F template=@ImportadorGenerico.xlsx \
    -F data=@transacciones-cepsa.xlsx \
    -OJ
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "FUELMAP_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "FUELMAP_PORT")]
    port: u16,

    /// Deployment profile (YAML); the built-in profile is used when omitted
    #[arg(long, env = "FUELMAP_PROFILE")]
    profile: Option<PathBuf>,

    /// Maximum upload size per request, in megabytes
    #[arg(long, default_value = "25", env = "FUELMAP_MAX_UPLOAD_MB")]
    max_upload_mb: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        profile: args.profile,
        max_upload_mb: args.max_upload_mb,
    };

    run_api_server(config).await
}

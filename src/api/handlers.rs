//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Profile;
use crate::core::Transformer;
use crate::types::TransformOutput;

use super::server::AppState;

/// Multipart part holding the destination template
pub const TEMPLATE_PART: &str = "template";
/// Multipart part holding the vendor export
pub const DATA_PART: &str = "data";

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::<()>::err(message))).into_response()
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

impl EndpointInfo {
    fn new(method: &str, path: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Fuelmap API Server".to_string(),
        version: state.version.clone(),
        description: "Fuel-card export to import template converter".to_string(),
        endpoints: vec![
            EndpointInfo::new("GET", "/health", "Health check endpoint"),
            EndpointInfo::new("GET", "/version", "Get server version"),
            EndpointInfo::new("GET", "/api/v1/profile", "Active deployment profile"),
            EndpointInfo::new(
                "POST",
                "/api/v1/transform",
                "Upload 'template' and 'data' (multipart), download the filled template",
            ),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub profile: String,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        profile: state.profile.name.clone(),
    }))
}

/// GET /api/v1/profile - Active deployment profile
pub async fn profile(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::<Profile>::ok(state.profile.as_ref().clone()))
}

/// POST /api/v1/transform - Fill the template with the export's rows
///
/// Expects `multipart/form-data` with the parts `template` and `data`.
pub async fn transform(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let mut template: Option<Vec<u8>> = None;
    let mut data: Option<Vec<u8>> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid multipart body: {}", e),
                )
            }
        };
        let name = field.name().unwrap_or_default().to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read upload '{}': {}", name, e),
                )
            }
        };
        match name.as_str() {
            TEMPLATE_PART => template = Some(bytes.to_vec()),
            DATA_PART => data = Some(bytes.to_vec()),
            other => warn!(part = other, "ignoring unexpected multipart part"),
        }
    }

    let (Some(template), Some(data)) = (template, data) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!(
                "Both '{}' and '{}' files are required",
                TEMPLATE_PART, DATA_PART
            ),
        );
    };

    let profile = Arc::clone(&state.profile);
    let result =
        tokio::task::spawn_blocking(move || Transformer::new(&profile).run(&template, &data))
            .await;

    match result {
        Ok(Ok(output)) => {
            info!(
                file = %output.file_name,
                written = output.report.rows_written,
                "transform served"
            );
            file_response(output)
        }
        Ok(Err(e)) if e.is_input_error() => {
            warn!(error = %e, "transform rejected");
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        Ok(Err(e)) => {
            error!(error = %e, "transform failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            error!(error = %e, "transform task panicked");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Transform task failed".to_string(),
            )
        }
    }
}

/// Serve the artifact as a spreadsheet download
fn file_response(output: TransformOutput) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", output.file_name);
    let headers = [
        (header::CONTENT_TYPE, TransformOutput::MIME_TYPE.to_string()),
        (header::CONTENT_DISPOSITION, disposition),
        (
            HeaderName::from_static("x-rows-written"),
            output.report.rows_written.to_string(),
        ),
        (
            HeaderName::from_static("x-rows-excluded"),
            output.report.rows_excluded.to_string(),
        ),
        (
            HeaderName::from_static("x-row-warnings"),
            output.report.warnings.len().to_string(),
        ),
    ];
    (StatusCode::OK, headers, output.bytes).into_response()
}

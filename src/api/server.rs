//! HTTP server for the devload API.
//!
//! Provides REST endpoints for workbook upload and conversion. Pushing the
//! converted records to the device-management service is a separate step
//! (CLI `push` or the client module).
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | POST   | `/api/upload`     | Upload XLSX workbook for conversion  |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |

use axum::{
    extract::Multipart,
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::LOG_BUS;
use super::types::{error_response, UploadResponse};
use crate::convert::pipeline::{convert_bytes, ConvertOptions};
use crate::error::{ServerError, ServerResult};

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Convert(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(error_response(&self.to_string()))).into_response()
    }
}

/// Start the HTTP server
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    // permissive CORS, the upload UI runs on another origin in development
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let app = router().layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 devload server running on http://localhost:{}", port);
    println!("   POST /api/upload - Upload XLSX workbook");
    println!("   GET  /api/logs   - SSE log stream");
    println!("   GET  /health     - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router() -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/upload", post(upload_workbook))
        .route("/api/logs", get(sse_logs))
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "devload",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": "POST /api/upload",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BUS.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload endpoint: multipart field `file` holding the XLSX bytes.
async fn upload_workbook(mut multipart: Multipart) -> ServerResult<Json<UploadResponse>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            file_name = field.file_name().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?
                    .to_vec(),
            );
        }
    }

    let bytes =
        file_data.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;

    println!("\n{}", "=".repeat(70));
    println!(
        "📄 NEW UPLOAD: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    );
    println!("{}\n", "=".repeat(70));

    let report = convert_bytes(&bytes, &ConvertOptions::default())?;

    println!("\n{}", "=".repeat(70));
    println!("📊 SUMMARY");
    println!("{}", "=".repeat(70));
    println!("   Devices:        {}", report.devices.len());
    println!(
        "   Linked events:  {}",
        report
            .devices
            .iter()
            .map(|d| d.auto_events.len())
            .sum::<usize>()
    );
    println!("   Invalid rows:   {}", report.validation_errors.len());
    if !report.info.completed_columns.is_empty() {
        println!(
            "   Added columns:  {}",
            report.info.completed_columns.join(", ")
        );
    }
    println!("{}\n", "=".repeat(70));

    Ok(Json(UploadResponse::from(report)))
}

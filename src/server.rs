use crate::pipeline::Pipeline;
use crate::types::{DocumentSource, MatchOracle, RegistrySource};
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Extension, Json as AxumJson, Router,
};
use hyper::Server;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared handles for the pipeline collaborators.
pub struct AppContext {
    pub document_source: Arc<dyn DocumentSource>,
    pub registry_source: Option<Arc<dyn RegistrySource>>,
    pub oracle: Option<Arc<dyn MatchOracle>>,
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "design-scout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Debug, Deserialize)]
pub struct DiffRunParams {
    pub file_key: String,
    pub node_id: Option<String>,
    pub skip_registry: Option<bool>,
    pub skip_oracle: Option<bool>,
}

async fn diff_run(
    Extension(ctx): Extension<Arc<AppContext>>,
    AxumJson(params): AxumJson<DiffRunParams>,
) -> impl IntoResponse {
    let registry_source = if params.skip_registry.unwrap_or(false) {
        None
    } else {
        ctx.registry_source.as_deref()
    };
    let oracle = if params.skip_oracle.unwrap_or(false) {
        None
    } else {
        ctx.oracle.as_deref()
    };

    match Pipeline::run(
        ctx.document_source.as_ref(),
        registry_source,
        oracle,
        &params.file_key,
        params.node_id.as_deref(),
    )
    .await
    {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            error!("Diff run failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Create the HTTP server with all routes
pub fn create_server(ctx: Arc<AppContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/admin/diff-run", post(diff_run))
        .layer(Extension(ctx))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(
    ctx: Arc<AppContext>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("🚀 HTTP server running on http://localhost:{port}");
    println!("💚 Health check: http://localhost:{port}/health");
    println!("🧩 Diff runs:    POST http://localhost:{port}/admin/diff-run");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}

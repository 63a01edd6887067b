// SPDX-License-Identifier: MIT

//! HTTP surface over the validator and resolver
//!
//! Stateless: every request carries the documents it operates on.

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::{OptionTreeError, Result};
use crate::options::selections::LineItemOptionSelections;
use crate::options::tree::{
    resolve, validate_document, validate_option_tree_v2, OptionTree, Resolution, ValidationReport,
};

const DEFAULT_PORT: u16 = 3000;

/// Listener settings, read from `OPTION_TREE_HOST` / `OPTION_TREE_PORT`
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(
            std::env::var("OPTION_TREE_HOST").ok(),
            std::env::var("OPTION_TREE_PORT").ok(),
        )
    }

    fn from_vars(host: Option<String>, port: Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(host) = host {
            config.host = host
                .parse()
                .map_err(|_| OptionTreeError::config(format!("invalid OPTION_TREE_HOST: {}", host)))?;
        }
        if let Some(port) = port {
            config.port = port
                .parse()
                .map_err(|_| OptionTreeError::config(format!("invalid OPTION_TREE_PORT: {}", port)))?;
        }
        Ok(config)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/validate", post(validate_tree))
        .route("/api/resolve", post(resolve_options))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(config: ServerConfig) -> Result<()> {
    let addr = config.addr();
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router()).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn validate_tree(Json(doc): Json<Value>) -> (StatusCode, Json<ValidationReport>) {
    let report = validate_document(&doc);
    if !report.is_ok() {
        log::info!("Rejected tree with {} errors", report.errors().len());
    }
    (status_for(&report), Json(report))
}

#[derive(Deserialize)]
struct ResolveRequest {
    tree: OptionTree,
    #[serde(default)]
    selections: LineItemOptionSelections,
    /// Refuse to resolve a tree that fails validation
    #[serde(default)]
    strict: bool,
}

async fn resolve_options(
    Json(payload): Json<ResolveRequest>,
) -> std::result::Result<Json<Resolution>, (StatusCode, Json<ValidationReport>)> {
    if payload.strict {
        let report = validate_option_tree_v2(&payload.tree);
        if !report.is_ok() {
            return Err((status_for(&report), Json(report)));
        }
    }
    Ok(Json(resolve(&payload.tree, &payload.selections)))
}

fn status_for(report: &ValidationReport) -> StatusCode {
    if report.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

// ABOUTME: HTTP server assembly binding all route groups into a single router
// ABOUTME: Applies CORS and request tracing layers and serves over TCP
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server setup and lifecycle

use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::routes::{
    auth::AuthRoutes, health::HealthRoutes, sets::SetRoutes, users::UserRoutes,
    weights::WeightRoutes, workouts::WorkoutRoutes,
};
use axum::Router;
use http::{header::HeaderName, HeaderValue, Method};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// HTTP server for the workout tracking API
pub struct HttpServer {
    resources: Arc<ServerResources>,
}

impl HttpServer {
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Build the complete application router
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .merge(HealthRoutes::routes())
            .merge(AuthRoutes::routes(self.resources.clone()))
            .merge(UserRoutes::routes(self.resources.clone()))
            .merge(WeightRoutes::routes(self.resources.clone()))
            .merge(WorkoutRoutes::routes(self.resources.clone()))
            .merge(SetRoutes::routes(self.resources.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(setup_cors())
    }

    /// Bind and serve until the process is stopped
    pub async fn serve(self) -> Result<(), AppError> {
        let port = self.resources.config.http_port;
        let listener = TcpListener::bind(format!("0.0.0.0:{port}"))
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind port {port}: {e}")))?;

        tracing::info!("HTTP server listening on port {port}");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| AppError::internal(format!("HTTP server error: {e}")))
    }
}

/// Configure CORS from the `CORS_ALLOWED_ORIGINS` environment variable.
///
/// A missing or `*` value allows any origin; otherwise the value is a
/// comma-separated origin list.
pub fn setup_cors() -> CorsLayer {
    let configured = std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();

    let allow_origin = if configured.is_empty() || configured == "*" {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = configured
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    HeaderValue::from_str(trimmed).ok()
                }
            })
            .collect();

        if origins.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(origins)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
}

// Route definitions for the catalog gateway

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

mod admin;
mod auth;
mod catalog;
mod listings;

// API routes under /api. Static assets are mounted by the binary.
pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        // Browsing
        .route("/catalog", get(catalog::get_catalog))
        .route("/cities", get(catalog::get_cities))
        .route("/makes", get(catalog::get_makes))
        .route("/models/:make", get(catalog::get_models))
        // Session
        .route("/login", post(auth::handle_login))
        .route("/me", get(auth::get_me))
        // Owner actions
        .route("/cars/:id/status", patch(listings::set_status))
        .route("/cars/:id", axum::routing::delete(listings::delete_listing))
        // Admin review queue
        .route("/admin/verifications", get(admin::list_verifications))
        .route("/admin/verifications/:id", patch(admin::review_verification))
        .with_state(app_state);

    Router::new()
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use reqwest::Client;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::{config::Settings, AppState};

    pub fn gateway(backend_url: &str) -> Router {
        let settings = Settings {
            api_base_url: backend_url.to_string(),
            ..Settings::default()
        };
        super::create_router(AppState::new(settings, Client::new()))
    }

    pub async fn call(
        app: Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

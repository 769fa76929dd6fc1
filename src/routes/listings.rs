// Owner actions on a single listing

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;

use crate::{
    auth::RequiredToken,
    error::{AppError, ApiError},
    models::ListingStatus,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    status: String,
}

// PATCH /api/cars/:id/status with { "status": "ACTIVE" | "PAUSED" | "SOLD" }
pub async fn set_status(
    State(app_state): State<AppState>,
    RequiredToken(token): RequiredToken,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = ListingStatus::from(request.status.trim());
    if let ListingStatus::Other(raw) = &status {
        return Err(ApiError::Validation(format!("Unknown listing status: {}", raw)).into());
    }
    tracing::info!("[HANDLER] /api/cars/:id/status - {} -> {}", id, status);

    let updated = app_state
        .marketplace(Some(&token))
        .update_listing_status(&id, &status)
        .await?;
    Ok(Json(updated))
}

// DELETE /api/cars/:id
pub async fn delete_listing(
    State(app_state): State<AppState>,
    RequiredToken(token): RequiredToken,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("[HANDLER] /api/cars/:id - Deleting {}", id);
    app_state.marketplace(Some(&token)).delete_listing(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::routes::test_helpers::{call, gateway};
    use crate::test_support::{spawn_backend, Recorded};
    use axum::{
        extract::Path,
        http::{Method, StatusCode, Uri},
        routing::{delete, patch},
        Json, Router,
    };
    use serde_json::{json, Value};

    #[tokio::test]
    async fn status_change_is_forwarded() {
        let recorded = Recorded::default();
        let seen = recorded.clone();
        let backend = Router::new().route(
            "/cars/:id/status",
            patch(move |Path(id): Path<String>, Json(body): Json<Value>| {
                let seen = seen.clone();
                async move {
                    seen.push(format!("{}={}", id, body["status"].as_str().unwrap_or_default()));
                    Json(json!({ "id": id, "status": "SOLD" }))
                }
            }),
        );
        let base = spawn_backend(backend).await;

        let (status, body) = call(
            gateway(&base),
            Method::PATCH,
            "/api/cars/c7/status",
            Some("tok"),
            Some(json!({ "status": "SOLD" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "SOLD");
        assert_eq!(recorded.take(), vec!["c7=SOLD"]);

        let (status, _) = call(
            gateway(&base),
            Method::PATCH,
            "/api/cars/c7/status",
            Some("tok"),
            Some(json!({ "status": "ARCHIVED" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(recorded.take().is_empty());
    }

    #[tokio::test]
    async fn delete_needs_token() {
        let backend = Router::new().route("/cars/:id", delete(|| async { StatusCode::NO_CONTENT }));
        let base = spawn_backend(backend).await;

        let (status, _) = call(gateway(&base), Method::DELETE, "/api/cars/c7", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(gateway(&base), Method::DELETE, "/api/cars/c7", Some("tok"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn encoded_ids_stay_inside_the_listing_path() {
        let recorded = Recorded::default();
        let seen = recorded.clone();
        let backend = Router::new().fallback(move |method: Method, uri: Uri| {
            let seen = seen.clone();
            async move {
                seen.push(format!("{} {}", method, uri));
                StatusCode::NO_CONTENT
            }
        });
        let base = spawn_backend(backend).await;

        let (status, _) =
            call(gateway(&base), Method::DELETE, "/api/cars/..%2Fusers%2Fme", Some("tok"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(gateway(&base), Method::DELETE, "/api/cars/a%3Fx", Some("tok"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(recorded.take(), vec!["DELETE /cars/..%2Fusers%2Fme", "DELETE /cars/a%3Fx"]);

        let (status, _) = call(
            gateway(&base),
            Method::PATCH,
            "/api/cars/../status",
            Some("tok"),
            Some(json!({ "status": "SOLD" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(recorded.take().is_empty());
    }

    #[tokio::test]
    async fn unreachable_backend_is_bad_gateway() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (status, body) = call(
            gateway(&format!("http://{}", addr)),
            Method::DELETE,
            "/api/cars/c7",
            Some("tok"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].is_string());
    }
}

// Admin identity-verification review queue

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;

use crate::{auth::RequiredToken, error::AppError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct QueueQuery {
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    status: String,
    #[serde(default)]
    note: String,
}

pub async fn list_verifications(
    State(app_state): State<AppState>,
    RequiredToken(token): RequiredToken,
    Query(query): Query<QueueQuery>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("[HANDLER] /api/admin/verifications - status filter: {:?}", query.status);
    let queue = app_state
        .marketplace(Some(&token))
        .admin_verifications(query.status.as_deref())
        .await?;
    tracing::info!("[HANDLER] /api/admin/verifications - {} records.", queue.len());
    Ok(Json(queue))
}

pub async fn review_verification(
    State(app_state): State<AppState>,
    RequiredToken(token): RequiredToken,
    Path(id): Path<String>,
    Json(review): Json<ReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("[HANDLER] /api/admin/verifications/:id - {} -> {}", id, review.status);
    app_state
        .marketplace(Some(&token))
        .admin_review(&id, review.status.trim(), &review.note)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::routes::test_helpers::{call, gateway};
    use crate::test_support::{spawn_backend, Recorded};
    use axum::{
        extract::{Path, Query},
        http::{Method, StatusCode},
        routing::{get, patch},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    #[tokio::test]
    async fn queue_and_review_are_forwarded() {
        let recorded = Recorded::default();
        let queue_seen = recorded.clone();
        let review_seen = recorded.clone();
        let backend = Router::new()
            .route(
                "/admin/verification",
                get(move |Query(q): Query<HashMap<String, String>>| {
                    let seen = queue_seen.clone();
                    async move {
                        seen.push(format!("list {}", q.get("status").map(String::as_str).unwrap_or("*")));
                        Json(json!([{ "id": 4, "status": "PENDING", "idType": "NATIONAL_ID" }]))
                    }
                }),
            )
            .route(
                "/admin/verification/:id",
                patch(move |Path(id): Path<String>, Json(body): Json<Value>| {
                    let seen = review_seen.clone();
                    async move {
                        seen.push(format!("review {} {} '{}'", id, body["status"].as_str().unwrap_or(""), body["note"].as_str().unwrap_or("")));
                        Json(json!({ "ok": true }))
                    }
                }),
            );
        let base = spawn_backend(backend).await;

        let (status, body) = call(
            gateway(&base),
            Method::GET,
            "/api/admin/verifications?status=PENDING",
            Some("admin"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], "4");
        assert_eq!(body[0]["status"], "PENDING");

        call(gateway(&base), Method::GET, "/api/admin/verifications", Some("admin"), None).await;

        let (status, _) = call(
            gateway(&base),
            Method::PATCH,
            "/api/admin/verifications/4",
            Some("admin"),
            Some(json!({ "status": "REJECTED", "note": "blurry selfie" })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        assert_eq!(
            recorded.take(),
            vec!["list PENDING", "list *", "review 4 REJECTED 'blurry selfie'"]
        );
    }

    #[tokio::test]
    async fn forbidden_is_passed_through() {
        let backend = Router::new().route(
            "/admin/verification",
            get(|| async { (StatusCode::FORBIDDEN, Json(json!({ "message": "Admins only" }))) }),
        );
        let base = spawn_backend(backend).await;

        let (status, body) =
            call(gateway(&base), Method::GET, "/api/admin/verifications", Some("user"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Admins only");
    }
}

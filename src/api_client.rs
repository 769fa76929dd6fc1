// Typed client for the marketplace REST API (listings, auth, profile,
// catalog lookups, identity verification, admin review queue)

use anyhow::Context;
use reqwest::{
    header::{HeaderValue, CONTENT_TYPE},
    Client, RequestBuilder, Response, StatusCode, Url,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{collections::HashSet, sync::Arc, time::Duration};

use crate::{
    catalog::Scope,
    config::Settings,
    error::{ApiError, ApiResult},
    forms::{CreateListingForm, Photo, ProfilePayload, Registration, VerificationUpload},
    models::{
        Credentials, CurrentUser, Listing, ListingStatus, SellerProfile, StatusUpdate, TokenResponse,
        VerificationRecord, VerificationReview,
    },
    storage::{KeyValueStore, TOKEN_KEY},
};

// Builds the shared reqwest client (timeout and optional proxy from settings)
pub fn build_http_client(settings: &Settings) -> anyhow::Result<Client> {
    let mut builder = Client::builder()
        .user_agent(concat!("cotecar_rust/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(settings.request_timeout_secs));

    if let Some(proxy_url) = settings.proxy_url.as_deref().filter(|p| !p.is_empty()) {
        let proxy = reqwest::Proxy::all(proxy_url).context("Invalid proxy_url in configuration")?;
        builder = builder.proxy(proxy);
        tracing::info!("Routing marketplace requests through configured proxy.");
    }

    builder.build().context("Failed to build reqwest client")
}

// --- Response bodies ---

// What a successful call returned
#[derive(Debug, Clone, PartialEq)]
pub enum ApiBody {
    Empty,
    Json(Value),
    Text(String),
}

impl ApiBody {
    // Decodes a collection. Non-array bodies count as empty and elements
    // that fail to decode are skipped.
    pub fn into_list<T: DeserializeOwned>(self, what: &str) -> Vec<T> {
        let items = match self {
            ApiBody::Json(Value::Array(items)) => items,
            other => {
                tracing::warn!(what, body = ?other, "Expected a JSON array, treating as empty");
                return Vec::new();
            }
        };

        items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value::<T>(item) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(what, index, error = %e, "Skipping malformed element");
                    None
                }
            })
            .collect()
    }

    pub fn into_json<T: DeserializeOwned>(self) -> ApiResult<T> {
        match self {
            ApiBody::Json(value) => {
                serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
            }
            ApiBody::Empty => Err(ApiError::Decode("empty body".to_string())),
            ApiBody::Text(text) => Err(ApiError::Decode(format!("expected JSON, got: {}", text))),
        }
    }

    // Like into_json, but an empty or undecodable body is just None
    pub fn into_optional<T: DeserializeOwned>(self) -> Option<T> {
        match self {
            ApiBody::Json(Value::Null) | ApiBody::Empty => None,
            other => other.into_json().ok(),
        }
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v: &HeaderValue| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"))
}

// Strings, or arrays of strings joined with ", "
fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) if !items.is_empty() => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => None,
    }
}

// Error message for a non-2xx response: JSON `message`, then JSON `error`,
// then a plain-text body, then the reason phrase
pub fn error_message(status: StatusCode, json: bool, body: &str) -> String {
    if json {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            let found = value
                .get("message")
                .and_then(message_text)
                .or_else(|| value.get("error").and_then(message_text));
            if let Some(message) = found {
                return message;
            }
        }
    } else if !body.trim().is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

// Ordered, de-duplicated names from a catalog endpoint. Entries may be plain
// strings or objects with a `name` field.
fn names_from(body: ApiBody, what: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    body.into_list::<Value>(what)
        .into_iter()
        .filter_map(|entry| match entry {
            Value::String(s) => Some(s),
            Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}

// --- Client ---

#[derive(Clone)]
pub struct MarketplaceClient {
    http: Client,
    base_url: String,
    store: Arc<dyn KeyValueStore>,
}

impl MarketplaceClient {
    pub fn new(http: Client, base_url: &str, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // Appends each segment percent-encoded, so ids never add path levels or a query
    fn segment_url(&self, segments: &[&str]) -> ApiResult<Url> {
        if let Some(bad) = segments.iter().find(|s| s.is_empty() || **s == "." || **s == "..") {
            return Err(ApiError::Validation(format!("Invalid identifier: {:?}", bad)));
        }
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Validation(format!("Invalid API base URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Validation(format!("API base URL cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // Attaches the bearer token when one is stored
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> ApiResult<ApiBody> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let json = is_json(&response);
        tracing::debug!(url = %response.url(), status = %status, "Marketplace API response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, json, &body);
            tracing::warn!(status = %status, message = %message, "Marketplace API request failed");
            return Err(ApiError::Status { status, message });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(ApiBody::Empty);
        }

        if json {
            let value = response.json::<Value>().await?;
            return Ok(ApiBody::Json(value));
        }

        let text = response.text().await?;
        Ok(if text.is_empty() { ApiBody::Empty } else { ApiBody::Text(text) })
    }

    fn store_token(&self, token: &str) {
        if let Err(e) = self.store.set(TOKEN_KEY, token) {
            tracing::warn!("Failed to persist auth token: {:?}", e);
        }
    }

    // --- Listings ---

    pub async fn list_listings(&self, scope: Scope) -> ApiResult<Vec<Listing>> {
        let path = match scope {
            Scope::All => "/cars",
            Scope::Mine => "/cars/mine",
        };
        let body = self.execute(self.http.get(self.url(path))).await?;
        let listings = body.into_list::<Listing>(path);
        tracing::info!(path, count = listings.len(), "Fetched listings");
        Ok(listings)
    }

    pub async fn create_listing(&self, form: &CreateListingForm, photos: &[Photo]) -> ApiResult<Option<Listing>> {
        let multipart = form.to_multipart(photos)?;
        tracing::info!(brand = %form.brand, model = %form.model, photos = photos.len(), "Creating listing");
        let body = self
            .execute(self.http.post(self.url("/cars")).multipart(multipart))
            .await?;
        Ok(body.into_optional())
    }

    pub async fn update_listing_status(&self, id: &str, status: &ListingStatus) -> ApiResult<Option<Listing>> {
        let body = self
            .execute(
                self.http
                    .patch(self.segment_url(&["cars", id, "status"])?)
                    .json(&StatusUpdate { status: status.as_str() }),
            )
            .await?;
        tracing::info!(id, status = %status, "Listing status updated");
        Ok(body.into_optional())
    }

    pub async fn delete_listing(&self, id: &str) -> ApiResult<()> {
        self.execute(self.http.delete(self.segment_url(&["cars", id])?))
            .await?;
        tracing::info!(id, "Listing deleted");
        Ok(())
    }

    // --- Auth ---

    // Logs in and persists the returned token
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<String> {
        let credentials = Credentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let body = self
            .execute(self.http.post(self.url("/auth/login")).json(&credentials))
            .await?;
        let token = body
            .into_json::<TokenResponse>()?
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Decode("login response did not include a token".to_string()))?;
        self.store_token(&token);
        tracing::info!("Logged in as {}", credentials.email);
        Ok(token)
    }

    // Registers; a token in the response is persisted like a login
    pub async fn register(&self, registration: &Registration) -> ApiResult<Option<String>> {
        let body = self
            .execute(
                self.http
                    .post(self.url("/auth/register"))
                    .json(&registration.normalized()),
            )
            .await?;
        let token = body
            .into_optional::<TokenResponse>()
            .and_then(|r| r.token)
            .filter(|t| !t.is_empty());
        if let Some(token) = &token {
            self.store_token(token);
        }
        Ok(token)
    }

    pub fn logout(&self) {
        if let Err(e) = self.store.remove(TOKEN_KEY) {
            tracing::warn!("Failed to remove auth token: {:?}", e);
        }
    }

    pub async fn me(&self) -> ApiResult<Option<CurrentUser>> {
        let body = self.execute(self.http.get(self.url("/auth/me"))).await?;
        Ok(body.into_optional())
    }

    // --- Seller profile ---

    pub async fn profile(&self) -> ApiResult<SellerProfile> {
        self.execute(self.http.get(self.url("/users/me")))
            .await?
            .into_json()
    }

    pub async fn update_profile(&self, payload: &ProfilePayload) -> ApiResult<()> {
        self.execute(self.http.patch(self.url("/users/me")).json(payload))
            .await?;
        Ok(())
    }

    // --- Catalog lookups ---

    pub async fn cities(&self) -> ApiResult<Vec<String>> {
        let body = self.execute(self.http.get(self.url("/catalog/cities"))).await?;
        Ok(names_from(body, "/catalog/cities"))
    }

    pub async fn makes(&self) -> ApiResult<Vec<String>> {
        let body = self.execute(self.http.get(self.url("/catalog/makes"))).await?;
        Ok(names_from(body, "/catalog/makes"))
    }

    pub async fn models(&self, make: &str) -> ApiResult<Vec<String>> {
        let body = self
            .execute(self.http.get(self.url("/catalog/models")).query(&[("make", make)]))
            .await?;
        Ok(names_from(body, "/catalog/models"))
    }

    // --- Identity verification ---

    pub async fn submit_verification(&self, upload: &VerificationUpload) -> ApiResult<()> {
        let multipart = upload.to_multipart()?;
        self.execute(
            self.http
                .post(self.url("/verification/seller"))
                .multipart(multipart),
        )
        .await?;
        tracing::info!("Verification documents submitted");
        Ok(())
    }

    pub async fn my_verification(&self) -> ApiResult<Option<VerificationRecord>> {
        let body = self.execute(self.http.get(self.url("/verification/me"))).await?;
        Ok(body.into_optional())
    }

    // --- Admin review queue ---

    // `status` narrows the queue (PENDING, VERIFIED, REJECTED); None lists all
    pub async fn admin_verifications(&self, status: Option<&str>) -> ApiResult<Vec<VerificationRecord>> {
        let mut request = self.http.get(self.url("/admin/verification"));
        if let Some(status) = status.filter(|s| !s.is_empty()) {
            request = request.query(&[("status", status)]);
        }
        let body = self.execute(request).await?;
        Ok(body.into_list("/admin/verification"))
    }

    pub async fn admin_review(&self, id: &str, status: &str, note: &str) -> ApiResult<()> {
        self.execute(
            self.http
                .patch(self.segment_url(&["admin", "verification", id])?)
                .json(&VerificationReview { status, note }),
        )
        .await?;
        tracing::info!(id, status, "Verification reviewed");
        Ok(())
    }
}

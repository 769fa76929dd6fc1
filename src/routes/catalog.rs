// Catalog browsing handlers: the derived listing view and the lookup lists

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use std::collections::BTreeSet;

use crate::{
    auth::ForwardedToken,
    catalog::{derive_page, ConditionFilter, MultiSelect, Scope, Selection, SortKey},
    error::AppError,
    AppState,
};

// Query string of GET /api/catalog. Multi-selects are comma separated.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    scope: Option<String>,
    q: Option<String>,
    condition: Option<String>,
    city: Option<String>,
    brand: Option<String>,
    model: Option<String>,
    brand_search: Option<String>,
    min_price: Option<String>,
    max_price: Option<String>,
    min_km: Option<String>,
    max_km: Option<String>,
    min_year: Option<String>,
    max_year: Option<String>,
    fuel: Option<String>,
    transmission: Option<String>,
    car_type: Option<String>,
    seller_type: Option<String>,
    verified_first: Option<String>,
    sort: Option<String>,
}

fn text(value: &Option<String>) -> String {
    value.as_deref().unwrap_or("").to_string()
}

fn values(value: &Option<String>) -> BTreeSet<String> {
    value
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn flag(value: &Option<String>) -> bool {
    matches!(
        value.as_deref().map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "1" | "yes" | "on")
    )
}

impl CatalogQuery {
    pub fn scope(&self) -> Scope {
        Scope::parse(self.scope.as_deref().unwrap_or(""))
    }

    pub fn to_selection(&self) -> Selection {
        Selection::default()
            .with_query(text(&self.q))
            .with_condition(ConditionFilter::parse(self.condition.as_deref().unwrap_or("")))
            .with_city(text(&self.city))
            .with_brand(text(&self.brand))
            .with_model(text(&self.model))
            .with_brand_search(text(&self.brand_search))
            .with_price(text(&self.min_price), text(&self.max_price))
            .with_mileage(text(&self.min_km), text(&self.max_km))
            .with_year(text(&self.min_year), text(&self.max_year))
            .with_values(MultiSelect::Fuel, values(&self.fuel))
            .with_values(MultiSelect::Transmission, values(&self.transmission))
            .with_values(MultiSelect::CarType, values(&self.car_type))
            .with_values(MultiSelect::SellerType, values(&self.seller_type))
            .with_verified_first(flag(&self.verified_first))
            .with_sort(SortKey::parse(self.sort.as_deref().unwrap_or("")))
    }
}

pub async fn get_catalog(
    State(app_state): State<AppState>,
    token: ForwardedToken,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse, AppError> {
    let selection = query.to_selection();
    // Own listings only exist for a signed-in caller
    let scope = match (query.scope(), token.as_deref()) {
        (Scope::Mine, Some(_)) => Scope::Mine,
        _ => Scope::All,
    };
    tracing::info!("[HANDLER] /api/catalog - Request received (scope: {:?}).", scope);
    tracing::debug!("[HANDLER] /api/catalog - Selection: {:?}", selection);

    let client = app_state.marketplace(token.as_deref());
    let listings = match client.list_listings(scope).await {
        Ok(listings) => listings,
        Err(e) if scope == Scope::Mine && e.is_not_found() => {
            tracing::warn!("[HANDLER] /api/catalog - Backend lacks /cars/mine, serving public listings.");
            client.list_listings(Scope::All).await?
        }
        Err(e) => return Err(e.into()),
    };

    let page = derive_page(&listings, &selection);
    tracing::info!(
        "[HANDLER] /api/catalog - {} of {} listings match.",
        page.total,
        listings.len()
    );
    Ok(Json(page))
}

pub async fn get_cities(
    State(app_state): State<AppState>,
    token: ForwardedToken,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("[HANDLER] /api/cities - Request received.");
    let cities = app_state.marketplace(token.as_deref()).cities().await?;
    Ok(Json(cities))
}

pub async fn get_makes(
    State(app_state): State<AppState>,
    token: ForwardedToken,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("[HANDLER] /api/makes - Request received.");
    let makes = app_state.marketplace(token.as_deref()).makes().await?;
    tracing::info!("[HANDLER] /api/makes - Returning {} makes.", makes.len());
    Ok(Json(makes))
}

pub async fn get_models(
    State(app_state): State<AppState>,
    token: ForwardedToken,
    Path(make): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("[HANDLER] /api/models/:make - Request received for make: {}", make);
    if make.trim().is_empty() {
        return Ok(Json(Vec::<String>::new()));
    }
    let models = app_state.marketplace(token.as_deref()).models(&make).await?;
    Ok(Json(models))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_helpers::{call, gateway};
    use crate::test_support::{spawn_backend, Recorded};
    use axum::{
        http::{header, HeaderMap, Method, StatusCode},
        routing::get,
        Router,
    };
    use serde_json::json;

    fn cars() -> serde_json::Value {
        json!([
            { "id": "1", "brand": "Toyota", "model": "Corolla", "price": 9000, "fuel": "Petrol",
              "owner": { "city": "Abidjan", "verificationStatus": "VERIFIED" } },
            { "id": "2", "brand": "Toyota", "model": "Yaris", "price": 4000, "fuel": "Diesel",
              "owner": { "city": "Bouaké" } },
            { "id": "3", "brand": "Kia", "price": 7000, "fuel": "Petrol", "owner": { "city": "Abidjan" } },
        ])
    }

    #[test]
    fn query_maps_onto_selection() {
        let query = CatalogQuery {
            scope: Some("MINE".into()),
            brand: Some("Toyota".into()),
            fuel: Some("Petrol, Diesel,,".into()),
            verified_first: Some("true".into()),
            sort: Some("price_desc".into()),
            min_price: Some("1000".into()),
            ..Default::default()
        };
        let selection = query.to_selection();
        assert_eq!(query.scope(), Scope::Mine);
        assert_eq!(selection.brand, "Toyota");
        assert_eq!(selection.fuels.len(), 2);
        assert!(selection.verified_first);
        assert_eq!(selection.sort, SortKey::PriceDesc);
        assert_eq!(selection.price_range().min, Some(1000.0));

        assert!(CatalogQuery::default().to_selection().is_cleared());
    }

    #[tokio::test]
    async fn catalog_returns_derived_page() {
        let backend = Router::new().route("/cars", get(|| async { axum::Json(cars()) }));
        let base = spawn_backend(backend).await;

        let (status, body) = call(
            gateway(&base),
            Method::GET,
            "/api/catalog?brand=Toyota&sort=PRICE_ASC&fuel=Petrol,Diesel",
            None,
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["listings"][0]["id"], "2");
        assert_eq!(body["featuredIds"], json!(["1", "2"]));
        assert_eq!(body["facets"]["brands"][0], json!({ "value": "Toyota", "count": 2 }));
        assert_eq!(body["facets"]["models"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn mine_scope_forwards_token_and_falls_back() {
        let recorded = Recorded::default();
        let seen = recorded.clone();
        let backend = Router::new().route(
            "/cars",
            get(move |headers: HeaderMap| {
                let seen = seen.clone();
                async move {
                    seen.push(
                        headers
                            .get(header::AUTHORIZATION)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("<none>")
                            .to_string(),
                    );
                    axum::Json(cars())
                }
            }),
        );
        let base = spawn_backend(backend).await;

        let (status, body) = call(gateway(&base), Method::GET, "/api/catalog?scope=mine", Some("abc"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(recorded.take(), vec!["Bearer abc"]);
    }

    #[tokio::test]
    async fn upstream_errors_keep_status() {
        let backend = Router::new().route(
            "/cars",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, axum::Json(json!({ "message": "Maintenance" }))) }),
        );
        let base = spawn_backend(backend).await;

        let (status, body) = call(gateway(&base), Method::GET, "/api/catalog", None, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Maintenance");
    }

    #[tokio::test]
    async fn lookups_pass_through() {
        let backend = Router::new()
            .route("/catalog/cities", get(|| async { axum::Json(json!(["Abidjan", "Abidjan", "Man"])) }))
            .route("/catalog/makes", get(|| async { axum::Json(json!([{ "name": "Kia" }])) }))
            .route("/catalog/models", get(|| async { axum::Json(json!(["Picanto"])) }));
        let base = spawn_backend(backend).await;

        let (_, cities) = call(gateway(&base), Method::GET, "/api/cities", None, None).await;
        assert_eq!(cities, json!(["Abidjan", "Man"]));
        let (_, makes) = call(gateway(&base), Method::GET, "/api/makes", None, None).await;
        assert_eq!(makes, json!(["Kia"]));
        let (_, models) = call(gateway(&base), Method::GET, "/api/models/Kia", None, None).await;
        assert_eq!(models, json!(["Picanto"]));
    }
}

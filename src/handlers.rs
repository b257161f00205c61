use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::aggregation::{count_by_country, group_by_year_and_category, total_entries, PrizeFilter};
use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::health::HealthChecker;
use crate::middleware::ClientAddr;
use crate::mutation::{Caller, MutationApi};
use crate::render::Renderer;
use crate::response::{
    CountriesResponse, DeleteResponse, LaureatesResponse, MutationResponse, SearchResponse,
};
use crate::store::RecordStore;

/// Shared application state
pub type SharedState = Arc<AppState>;

/// Application state: the record store and the collaborators around it
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub mutations: MutationApi,
    pub renderer: Arc<dyn Renderer>,
    pub health: HealthChecker,
}

/// Raw aggregation parameters; years are parsed by `filter`.
#[derive(Debug, Default, Deserialize)]
pub struct AggregationQuery {
    pub discipline: Option<String>,
    pub year: Option<String>,
    pub yearto: Option<String>,
}

impl AggregationQuery {
    fn filter(&self) -> Result<PrizeFilter> {
        Ok(PrizeFilter::new(
            non_blank(self.discipline.as_deref()).map(str::to_string),
            parse_year("year", self.year.as_deref())?,
            parse_year("yearto", self.yearto.as_deref())?,
        ))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Blank means absent; anything else must be an integer.
fn parse_year(name: &str, raw: Option<&str>) -> Result<Option<i32>> {
    non_blank(raw)
        .map(|value| {
            value.parse().map_err(|_| {
                Error::Validation(format!("'{}' must be an integer year, got '{}'", name, value))
            })
        })
        .transpose()
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
}

/// Laureates grouped by award year and discipline
pub async fn get_laureates(
    State(state): State<SharedState>,
    Query(query): Query<AggregationQuery>,
) -> Result<impl IntoResponse> {
    let filter = query.filter()?;
    let results = {
        let snapshot = state.store.snapshot().await;
        group_by_year_and_category(&snapshot.laureates, &filter)
    };

    Ok(Json(LaureatesResponse {
        total_count: total_entries(&results),
        discipline: query.discipline,
        year: filter.year,
        yearto: filter.year_to,
        results,
    }))
}

/// Laureate counts per country, largest first
pub async fn get_countries(
    State(state): State<SharedState>,
    Query(query): Query<AggregationQuery>,
) -> Result<impl IntoResponse> {
    let filter = query.filter()?;
    let counts = {
        let snapshot = state.store.snapshot().await;
        count_by_country(&snapshot.laureates, &filter)
    };

    Ok(Json(CountriesResponse {
        total_count: counts.total(),
        discipline: query.discipline,
        year: filter.year,
        yearto: filter.year_to,
        results: counts.into_ranked(),
    }))
}

/// Country counts rendered as an image
pub async fn get_country_chart(
    State(state): State<SharedState>,
    Query(query): Query<AggregationQuery>,
) -> Result<impl IntoResponse> {
    let filter = query.filter()?;
    let counts = {
        let snapshot = state.store.snapshot().await;
        count_by_country(&snapshot.laureates, &filter)
    };

    let image = state.renderer.render(&counts.to_map(), &filter.describe())?;
    Ok(([(header::CONTENT_TYPE, state.renderer.content_type())], image))
}

/// Case-insensitive name search
pub async fn search_laureates(
    State(state): State<SharedState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let name = query
        .name
        .ok_or_else(|| Error::Validation("Missing 'name' query parameter".to_string()))?;

    let results = state.store.search(&name).await;
    Ok(Json(SearchResponse::new(name, results)))
}

pub async fn create_laureate(
    State(state): State<SharedState>,
    Extension(ClientAddr(client_addr)): Extension<ClientAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let caller = Caller::new(client_addr, Credentials::from_headers(&headers));
    let applied = state.mutations.create(&caller, &body).await?;

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::created(applied.laureate, &applied.actor)),
    ))
}

pub async fn update_laureate(
    State(state): State<SharedState>,
    Extension(ClientAddr(client_addr)): Extension<ClientAddr>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let caller = Caller::new(client_addr, Credentials::from_headers(&headers));
    let applied = state.mutations.update(&caller, &id, &body).await?;

    Ok(Json(MutationResponse::updated(applied.laureate, &applied.actor)))
}

pub async fn delete_laureate(
    State(state): State<SharedState>,
    Extension(ClientAddr(client_addr)): Extension<ClientAddr>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let caller = Caller::new(client_addr, Credentials::from_headers(&headers));
    let applied = state.mutations.delete(&caller, &id).await?;

    Ok(Json(DeleteResponse::new(applied.laureate, &applied.actor)))
}

/// Health check endpoint
pub async fn health_check(
    State(state): State<SharedState>,
) -> impl IntoResponse {
    Json(state.health.check_health().await)
}

//! City endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::Page;
use crate::database::{cities, StoreError};
use crate::error::ApiError;
use crate::models::{City, CityInput, CityPatch};
use crate::AppState;

pub(crate) fn city_not_found(slug: &str) -> ApiError {
    ApiError::not_found(format!("City '{slug}' was not found"))
}

/// GET /api1/cities/ - page of cities, optionally filtered by a search term
pub async fn list(
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<City>>, ApiError> {
    page.validate()?;
    let cities = cities::list(&state.pool, page.limit, page.skip, page.search.as_deref()).await?;
    Ok(Json(cities))
}

/// POST /api1/cities/ - create a city; the slug is derived from its name
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CityInput>,
) -> Result<(StatusCode, Json<City>), ApiError> {
    input.validate()?;
    let name = input.name.clone();
    match cities::insert(&state.pool, input).await {
        Ok(city) => Ok((StatusCode::CREATED, Json(city))),
        Err(StoreError::Duplicate) => {
            Err(ApiError::conflict(format!("City '{name}' already exists")))
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /api1/cities/:slug
pub async fn get(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<City>, ApiError> {
    cities::get_by_slug(&state.pool, &slug)
        .await?
        .map(Json)
        .ok_or_else(|| city_not_found(&slug))
}

/// PUT /api1/cities/:slug - partial update; renaming recomputes the slug
pub async fn update(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(patch): Json<CityPatch>,
) -> Result<Json<City>, ApiError> {
    patch.validate()?;
    match cities::update(&state.pool, &slug, &patch).await {
        Ok(Some(city)) => Ok(Json(city)),
        Ok(None) => Err(city_not_found(&slug)),
        Err(StoreError::Duplicate) => {
            let name = patch.name.as_deref().unwrap_or(&slug);
            Err(ApiError::conflict(format!("City '{name}' already exists")))
        }
        Err(err) => Err(err.into()),
    }
}

/// DELETE /api1/cities/:slug - removes and returns the deleted document
pub async fn delete(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<City>, ApiError> {
    cities::delete(&state.pool, &slug)
        .await?
        .map(Json)
        .ok_or_else(|| city_not_found(&slug))
}

/// GET /api1/cities/top/ - best-rated cities first
pub async fn top(
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<City>>, ApiError> {
    page.validate()?;
    let cities = cities::top(&state.pool, page.limit, page.skip).await?;
    Ok(Json(cities))
}

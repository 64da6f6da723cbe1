//! Sight endpoints, nested under their parent city.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::cities::city_not_found;
use super::Page;
use crate::database::sights;
use crate::error::ApiError;
use crate::models::{Sight, SightInput, SightPatch};
use crate::AppState;

fn sight_not_found(slug: &str) -> ApiError {
    ApiError::not_found(format!("Sight '{slug}' was not found"))
}

/// GET /api1/cities/:slug/sight/ - slice of the city's sight array
pub async fn list(
    State(state): State<AppState>,
    Path(city): Path<String>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<Sight>>, ApiError> {
    page.validate()?;
    sights::list_by_city(&state.pool, &city, page.limit, page.skip)
        .await?
        .map(Json)
        .ok_or_else(|| city_not_found(&city))
}

/// POST /api1/cities/:slug/sight/ - conditional push into the city's array.
/// A failed guard means the city is missing or the slug is taken; both
/// report as a conflict, per the guard's contract.
pub async fn create(
    State(state): State<AppState>,
    Path(city): Path<String>,
    Json(input): Json<SightInput>,
) -> Result<(StatusCode, Json<Sight>), ApiError> {
    input.validate()?;
    let name = input.name.clone();
    match sights::insert(&state.pool, &city, input).await? {
        Some(sight) => Ok((StatusCode::CREATED, Json(sight))),
        None => Err(ApiError::conflict(format!("Sight '{name}' already exists"))),
    }
}

/// GET /api1/cities/:slug/sight/:sight
pub async fn get(
    State(state): State<AppState>,
    Path((city, sight)): Path<(String, String)>,
) -> Result<Json<Sight>, ApiError> {
    sights::get(&state.pool, &city, &sight)
        .await?
        .map(Json)
        .ok_or_else(|| sight_not_found(&sight))
}

/// PUT /api1/cities/:slug/sight/:sight - partial in-place update
pub async fn update(
    State(state): State<AppState>,
    Path((city, sight)): Path<(String, String)>,
    Json(patch): Json<SightPatch>,
) -> Result<Json<Sight>, ApiError> {
    patch.validate()?;
    // A rename must not collide with a sibling sight; renaming onto the
    // addressed sight's own slug is a plain rename.
    if let Some(new_slug) = patch.new_slug() {
        if new_slug != sight && sights::get(&state.pool, &city, &new_slug).await?.is_some() {
            let name = patch.name.as_deref().unwrap_or(&new_slug);
            return Err(ApiError::conflict(format!("Sight '{name}' already exists")));
        }
    }
    sights::update(&state.pool, &city, &sight, patch.changes())
        .await?
        .map(Json)
        .ok_or_else(|| sight_not_found(&sight))
}

/// DELETE /api1/cities/:slug/sight/:sight - returns the removed element
pub async fn delete(
    State(state): State<AppState>,
    Path((city, sight)): Path<(String, String)>,
) -> Result<Json<Sight>, ApiError> {
    sights::delete(&state.pool, &city, &sight)
        .await?
        .map(Json)
        .ok_or_else(|| sight_not_found(&sight))
}

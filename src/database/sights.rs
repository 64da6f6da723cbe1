//! Operations on the sight array embedded in a city document.
//!
//! Every mutation is one SQL statement, so the existence guard and the write
//! it protects are atomic: concurrent creates of the same slug cannot both
//! pass the guard.

use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::PgPool;

use super::{cities, StoreError};
use crate::models::{Sight, SightInput};

/// Contiguous slice of the parent city's sight array. `None` when the city
/// itself does not exist.
pub async fn list_by_city(
    pool: &PgPool,
    city_slug: &str,
    limit: i64,
    skip: i64,
) -> Result<Option<Vec<Sight>>, StoreError> {
    let Some(city) = cities::get_by_slug(pool, city_slug).await? else {
        return Ok(None);
    };
    let sights = city.sights.0;
    let start = (skip.max(0) as usize).min(sights.len());
    let end = start
        .saturating_add(limit.max(0) as usize)
        .min(sights.len());
    Ok(Some(sights[start..end].to_vec()))
}

/// Project the single matching array element.
pub async fn get(
    pool: &PgPool,
    city_slug: &str,
    sight_slug: &str,
) -> Result<Option<Sight>, StoreError> {
    let row: Option<(Json<Sight>,)> = sqlx::query_as(
        "SELECT e.value FROM cities, jsonb_array_elements(sights) AS e(value) \
         WHERE cities.slug = $1 AND e.value->>'slug' = $2",
    )
    .bind(city_slug)
    .bind(sight_slug)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(Json(sight),)| sight))
}

/// Conditional push: insert the sight only if no element of the array
/// already carries its slug, re-sorting the array by rating (score count
/// breaking ties) in the same statement. Returns `None` when the guard did
/// not match - the city is missing or the slug is taken; the two are not
/// distinguished, matching the uniqueness guard's contract.
pub async fn insert(
    pool: &PgPool,
    city_slug: &str,
    input: SightInput,
) -> Result<Option<Sight>, StoreError> {
    let sight = input.into_sight();
    let result = sqlx::query(
        "UPDATE cities \
         SET sights = ( \
             SELECT COALESCE(jsonb_agg(e.value \
                        ORDER BY (e.value->>'rating')::double precision DESC, \
                                 (e.value->>'number_of_scores')::bigint DESC), '[]'::jsonb) \
             FROM jsonb_array_elements(sights || $2::jsonb) AS e(value) \
         ) \
         WHERE slug = $1 \
           AND NOT EXISTS ( \
               SELECT 1 FROM jsonb_array_elements(sights) AS e(value) \
               WHERE e.value->>'slug' = $3 \
           )",
    )
    .bind(city_slug)
    .bind(Json(&sight))
    .bind(&sight.slug)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    Ok(Some(sight))
}

/// Set the given fields on the element matching the sight slug, in place.
/// `WITH ORDINALITY` keeps the array order untouched: unlike insertion, an
/// in-place update does not re-sort, so a rating change leaves the ordering
/// stale until the next insert. Returns the post-update element, or `None`
/// when no element matched.
pub async fn update(
    pool: &PgPool,
    city_slug: &str,
    sight_slug: &str,
    changes: Map<String, Value>,
) -> Result<Option<Sight>, StoreError> {
    // After a rename the element is addressed by its rewritten slug.
    let target_slug = changes
        .get("slug")
        .and_then(Value::as_str)
        .unwrap_or(sight_slug)
        .to_string();

    let row: Option<(Json<Sight>,)> = sqlx::query_as(
        "WITH updated AS ( \
             UPDATE cities \
             SET sights = ( \
                 SELECT COALESCE(jsonb_agg( \
                            CASE WHEN t.value->>'slug' = $2 \
                                 THEN t.value || $3::jsonb \
                                 ELSE t.value END \
                            ORDER BY t.idx), '[]'::jsonb) \
                 FROM jsonb_array_elements(sights) WITH ORDINALITY AS t(value, idx) \
             ) \
             WHERE slug = $1 \
               AND EXISTS ( \
                   SELECT 1 FROM jsonb_array_elements(sights) AS e(value) \
                   WHERE e.value->>'slug' = $2 \
               ) \
             RETURNING sights \
         ) \
         SELECT e.value FROM updated, jsonb_array_elements(updated.sights) AS e(value) \
         WHERE e.value->>'slug' = $4",
    )
    .bind(city_slug)
    .bind(sight_slug)
    .bind(Value::Object(changes))
    .bind(target_slug)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(Json(sight),)| sight))
}

/// Pull the matching element out of the array. The element is captured
/// before the pull in the same statement so the deleted content can be
/// returned. `None` when no element matched.
pub async fn delete(
    pool: &PgPool,
    city_slug: &str,
    sight_slug: &str,
) -> Result<Option<Sight>, StoreError> {
    let row: Option<(Json<Sight>,)> = sqlx::query_as(
        "WITH victim AS ( \
             SELECT e.value AS sight \
             FROM cities, jsonb_array_elements(sights) AS e(value) \
             WHERE cities.slug = $1 AND e.value->>'slug' = $2 \
         ), removed AS ( \
             UPDATE cities \
             SET sights = ( \
                 SELECT COALESCE(jsonb_agg(t.value ORDER BY t.idx), '[]'::jsonb) \
                 FROM jsonb_array_elements(sights) WITH ORDINALITY AS t(value, idx) \
                 WHERE t.value->>'slug' <> $2 \
             ) \
             WHERE slug = $1 AND EXISTS (SELECT 1 FROM victim) \
         ) \
         SELECT sight FROM victim",
    )
    .bind(city_slug)
    .bind(sight_slug)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(Json(sight),)| sight))
}

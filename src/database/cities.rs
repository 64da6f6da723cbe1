//! City document operations: lookup and paging by slug, text search,
//! partial update, rating-ordered listing.

use sqlx::types::Json;
use sqlx::PgPool;

use super::{classify, StoreError};
use crate::models::{City, CityInput, CityPatch};
use crate::slug::slugify;

/// Wrap a search term for ILIKE, escaping wildcards so it matches literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Page of cities, optionally filtered by a case-insensitive substring match
/// against name or description. Pages are ordered by slug so paging is
/// deterministic.
pub async fn list(
    pool: &PgPool,
    limit: i64,
    skip: i64,
    search: Option<&str>,
) -> Result<Vec<City>, StoreError> {
    let cities = match search {
        Some(term) => {
            sqlx::query_as::<_, City>(
                "SELECT * FROM cities \
                 WHERE name ILIKE $1 OR description ILIKE $1 \
                 ORDER BY slug OFFSET $2 LIMIT $3",
            )
            .bind(like_pattern(term))
            .bind(skip)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, City>("SELECT * FROM cities ORDER BY slug OFFSET $1 LIMIT $2")
                .bind(skip)
                .bind(limit)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(cities)
}

pub async fn get_by_slug(pool: &PgPool, slug: &str) -> Result<Option<City>, StoreError> {
    let city = sqlx::query_as::<_, City>("SELECT * FROM cities WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(city)
}

/// Insert a city; the slug is derived from the name here. A slug collision
/// raises [`StoreError::Duplicate`].
pub async fn insert(pool: &PgPool, input: CityInput) -> Result<City, StoreError> {
    let slug = slugify(&input.name);
    let sights = Json(input.normalized_sights());
    sqlx::query_as::<_, City>(
        "INSERT INTO cities \
         (slug, name, description, foundation_year, time_zone, square, climate, \
          rating, number_of_scores, sights, reviews) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING *",
    )
    .bind(&slug)
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.foundation_year)
    .bind(input.time_zone)
    .bind(input.square)
    .bind(&input.climate)
    .bind(input.rating)
    .bind(input.number_of_scores)
    .bind(sights)
    .bind(Json(&input.reviews))
    .fetch_one(pool)
    .await
    .map_err(classify)
}

/// Apply the present fields of the patch to the matching city and return the
/// post-update document. Renaming recomputes the slug; a rename onto an
/// existing slug raises [`StoreError::Duplicate`] from the unique index.
pub async fn update(
    pool: &PgPool,
    slug: &str,
    patch: &CityPatch,
) -> Result<Option<City>, StoreError> {
    let new_slug = patch.name.as_deref().map(slugify);
    let sights = patch.normalized_sights().map(Json);
    let reviews = patch.reviews.as_ref().map(Json);
    sqlx::query_as::<_, City>(
        "UPDATE cities SET \
           slug = COALESCE($2, slug), \
           name = COALESCE($3, name), \
           description = COALESCE($4, description), \
           foundation_year = COALESCE($5, foundation_year), \
           time_zone = COALESCE($6, time_zone), \
           square = COALESCE($7, square), \
           climate = COALESCE($8, climate), \
           rating = COALESCE($9, rating), \
           number_of_scores = COALESCE($10, number_of_scores), \
           sights = COALESCE($11, sights), \
           reviews = COALESCE($12, reviews) \
         WHERE slug = $1 \
         RETURNING *",
    )
    .bind(slug)
    .bind(new_slug)
    .bind(&patch.name)
    .bind(&patch.description)
    .bind(patch.foundation_year)
    .bind(patch.time_zone)
    .bind(patch.square)
    .bind(&patch.climate)
    .bind(patch.rating)
    .bind(patch.number_of_scores)
    .bind(sights)
    .bind(reviews)
    .fetch_optional(pool)
    .await
    .map_err(classify)
}

/// Remove the city and return the deleted document.
pub async fn delete(pool: &PgPool, slug: &str) -> Result<Option<City>, StoreError> {
    let city = sqlx::query_as::<_, City>("DELETE FROM cities WHERE slug = $1 RETURNING *")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(city)
}

/// Best-rated cities first. Slug breaks ties to keep pages stable.
pub async fn top(pool: &PgPool, limit: i64, skip: i64) -> Result<Vec<City>, StoreError> {
    let cities = sqlx::query_as::<_, City>(
        "SELECT * FROM cities ORDER BY rating DESC, slug OFFSET $1 LIMIT $2",
    )
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(cities)
}

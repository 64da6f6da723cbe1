//! User account operations.

use sqlx::types::Json;
use sqlx::PgPool;

use super::{classify, StoreError};
use crate::models::{User, UserPatch};

pub async fn get_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Insert a new account. `password` must already be hashed. A username
/// collision raises [`StoreError::Duplicate`].
pub async fn insert(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
    email: &str,
) -> Result<User, StoreError> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (username, password, email) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(username)
    .bind(password_hash)
    .bind(email)
    .fetch_one(pool)
    .await
    .map_err(classify)
}

/// Apply the present fields of the patch. The caller hashes any new
/// password; `password_hash` replaces the stored hash when set.
pub async fn update(
    pool: &PgPool,
    username: &str,
    patch: &UserPatch,
    password_hash: Option<&str>,
) -> Result<Option<User>, StoreError> {
    let visited = patch.visited_cities.as_ref().map(Json);
    let wishlist = patch.like_to_visit.as_ref().map(Json);
    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET \
           email = COALESCE($2, email), \
           password = COALESCE($3, password), \
           visited_cities = COALESCE($4, visited_cities), \
           like_to_visit = COALESCE($5, like_to_visit) \
         WHERE username = $1 \
         RETURNING *",
    )
    .bind(username)
    .bind(&patch.email)
    .bind(password_hash)
    .bind(visited)
    .bind(wishlist)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

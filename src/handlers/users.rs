//! Account endpoints: registration, token issuance, profiles.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{self, CurrentUser};
use crate::database::{users, StoreError};
use crate::error::ApiError;
use crate::models::{RegisterUser, UserPatch, UserProfile};
use crate::AppState;

fn user_not_found(username: &str) -> ApiError {
    ApiError::not_found(format!("User '{username}' was not found"))
}

/// OAuth2 password-flow form body.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// POST /api1/users/token - authenticate and issue a bearer token
pub async fn token(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = auth::authenticate_user(&state.pool, &form.username, &form.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Incorrect username or password"))?;
    let access_token = auth::create_access_token(&user.username, &state.config)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

/// POST /api1/users/register
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterUser>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    form.validate()?;
    let password_hash = auth::hash_password(&form.password)?;
    match users::insert(&state.pool, &form.username, &password_hash, &form.email).await {
        Ok(_) => Ok((
            StatusCode::CREATED,
            Json(json!({ "detail": "User successfully created" })),
        )),
        Err(StoreError::Duplicate) => Err(ApiError::conflict(format!(
            "User '{}' already exists",
            form.username
        ))),
        Err(err) => Err(err.into()),
    }
}

/// GET /api1/users/users/:username - public profile view
pub async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    users::get_by_username(&state.pool, &username)
        .await?
        .map(|user| Json(UserProfile::from(user)))
        .ok_or_else(|| user_not_found(&username))
}

/// PUT /api1/users/users/:username - owners may update their own profile
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(username): Path<String>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<UserProfile>, ApiError> {
    patch.validate()?;
    if users::get_by_username(&state.pool, &username).await?.is_none() {
        return Err(user_not_found(&username));
    }
    if current.username != username {
        // TODO: staff accounts are intended to bypass the ownership check,
        // but that rule was never finalized; until it is, staff get the
        // same 403 as everyone else.
        return Err(ApiError::forbidden("Not enough permissions"));
    }
    let password_hash = match &patch.password {
        Some(password) => Some(auth::hash_password(password)?),
        None => None,
    };
    users::update(&state.pool, &username, &patch, password_hash.as_deref())
        .await?
        .map(|user| Json(UserProfile::from(user)))
        .ok_or_else(|| user_not_found(&username))
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::ApiError;

/// A user row. Deliberately not `Serialize`: the stored password hash and
/// role flags must never reach a response body. Use [`UserProfile`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password: String,
    pub email: String,
    pub active: bool,
    pub staff: bool,
    pub visited_cities: Json<Vec<String>>,
    pub like_to_visit: Json<Vec<String>>,
}

/// Public view of an account.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub visited_cities: Vec<String>,
    pub like_to_visit: Vec<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            visited_cities: user.visited_cities.0,
            like_to_visit: user.like_to_visit.0,
        }
    }
}

/// Registration payload: the password is submitted twice and must match.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUser {
    pub username: String,
    pub password: String,
    pub password2: String,
    pub email: String,
}

impl RegisterUser {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut fields = HashMap::new();
        if self.username.is_empty() || !self.username.chars().all(|c| c.is_ascii_alphanumeric()) {
            fields.insert(
                "username".to_string(),
                "must contain only letters and digits".to_string(),
            );
        }
        if self.password.is_empty() {
            fields.insert("password".to_string(), "must not be empty".to_string());
        }
        if self.password != self.password2 {
            fields.insert("password2".to_string(), "passwords do not match".to_string());
        }
        check_email(&mut fields, &self.email);
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ApiError::unprocessable_entity("Invalid registration", fields))
        }
    }
}

/// Profile update: `None` means "leave unchanged". A present password is
/// re-hashed before storage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password: Option<String>,
    pub visited_cities: Option<Vec<String>>,
    pub like_to_visit: Option<Vec<String>>,
}

impl UserPatch {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut fields = HashMap::new();
        if let Some(email) = &self.email {
            check_email(&mut fields, email);
        }
        if let Some(password) = &self.password {
            if password.is_empty() {
                fields.insert("password".to_string(), "must not be empty".to_string());
            }
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ApiError::unprocessable_entity("Invalid profile", fields))
        }
    }
}

fn check_email(fields: &mut HashMap<String, String>, email: &str) {
    // Full RFC validation is out of scope; catch the obviously malformed.
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    };
    if !valid {
        fields.insert("email".to_string(), "not a valid email address".to_string());
    }
}

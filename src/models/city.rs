use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::sight::{check_name, check_rating, sort_by_rating, Sight, SightInput};

/// A city row. `sights` is the embedded, rating-ordered sub-document array;
/// `reviews` holds review references.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct City {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub foundation_year: Option<i32>,
    pub time_zone: i32,
    pub square: Option<f64>,
    pub climate: Option<String>,
    pub rating: f64,
    pub number_of_scores: i64,
    pub sights: Json<Vec<Sight>>,
    pub reviews: Json<Vec<String>>,
}

/// Creation payload. Slug is derived from the name at insert time.
#[derive(Debug, Clone, Deserialize)]
pub struct CityInput {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub foundation_year: Option<i32>,
    #[serde(default)]
    pub time_zone: i32,
    #[serde(default)]
    pub square: Option<f64>,
    #[serde(default)]
    pub climate: Option<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub number_of_scores: i64,
    #[serde(default)]
    pub sights: Vec<SightInput>,
    #[serde(default)]
    pub reviews: Vec<String>,
}

impl CityInput {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut fields = HashMap::new();
        check_name(&mut fields, "name", &self.name);
        check_rating(&mut fields, "rating", self.rating);
        for (idx, sight) in self.sights.iter().enumerate() {
            check_name(&mut fields, &format!("sights[{idx}].name"), &sight.name);
            check_rating(&mut fields, &format!("sights[{idx}].rating"), sight.rating);
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ApiError::unprocessable_entity("Invalid city", fields))
        }
    }

    /// Embedded sights in their stored normal form: slugs derived, array
    /// ordered the way sight insertion keeps it.
    pub fn normalized_sights(&self) -> Vec<Sight> {
        let mut sights: Vec<Sight> = self
            .sights
            .iter()
            .cloned()
            .map(SightInput::into_sight)
            .collect();
        sort_by_rating(&mut sights);
        sights
    }
}

/// Partial update: `None` means "leave unchanged". A present `name`
/// recomputes the slug.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CityPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub foundation_year: Option<i32>,
    pub time_zone: Option<i32>,
    pub square: Option<f64>,
    pub climate: Option<String>,
    pub rating: Option<f64>,
    pub number_of_scores: Option<i64>,
    pub sights: Option<Vec<SightInput>>,
    pub reviews: Option<Vec<String>>,
}

impl CityPatch {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut fields = HashMap::new();
        if let Some(name) = &self.name {
            check_name(&mut fields, "name", name);
        }
        if let Some(rating) = self.rating {
            check_rating(&mut fields, "rating", rating);
        }
        if let Some(sights) = &self.sights {
            for (idx, sight) in sights.iter().enumerate() {
                check_name(&mut fields, &format!("sights[{idx}].name"), &sight.name);
                check_rating(&mut fields, &format!("sights[{idx}].rating"), sight.rating);
            }
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ApiError::unprocessable_entity("Invalid city", fields))
        }
    }

    /// Replacement sight array, if the patch carries one, in stored normal
    /// form.
    pub fn normalized_sights(&self) -> Option<Vec<Sight>> {
        self.sights.as_ref().map(|sights| {
            let mut sights: Vec<Sight> =
                sights.iter().cloned().map(SightInput::into_sight).collect();
            sort_by_rating(&mut sights);
            sights
        })
    }
}

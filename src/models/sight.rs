use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::slug::slugify;

/// A sight as stored inside its parent city's embedded array. The slug is
/// unique within that array, not globally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sight {
    pub slug: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub visited: i64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub number_of_scores: i64,
}

/// Creation payload. The slug is derived from the name, never client-supplied.
#[derive(Debug, Clone, Deserialize)]
pub struct SightInput {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub visited: i64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub number_of_scores: i64,
}

impl SightInput {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut fields = HashMap::new();
        check_name(&mut fields, "name", &self.name);
        check_rating(&mut fields, "rating", self.rating);
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ApiError::unprocessable_entity("Invalid sight", fields))
        }
    }

    pub fn into_sight(self) -> Sight {
        Sight {
            slug: slugify(&self.name),
            name: self.name,
            description: self.description,
            visited: self.visited,
            rating: self.rating,
            number_of_scores: self.number_of_scores,
        }
    }
}

/// Partial update: `None` means "leave unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SightPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub visited: Option<i64>,
    pub rating: Option<f64>,
    pub number_of_scores: Option<i64>,
}

impl SightPatch {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut fields = HashMap::new();
        if let Some(name) = &self.name {
            check_name(&mut fields, "name", name);
        }
        if let Some(rating) = self.rating {
            check_rating(&mut fields, "rating", rating);
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ApiError::unprocessable_entity("Invalid sight", fields))
        }
    }

    /// Slug the patched sight will carry after a rename, if any.
    pub fn new_slug(&self) -> Option<String> {
        self.name.as_deref().map(slugify)
    }

    /// JSON object of the fields to set on the matched array element.
    /// Renaming also rewrites the embedded slug.
    pub fn changes(&self) -> Map<String, Value> {
        let mut set = Map::new();
        if let Some(name) = &self.name {
            set.insert("slug".into(), Value::String(slugify(name)));
            set.insert("name".into(), Value::String(name.clone()));
        }
        if let Some(description) = &self.description {
            set.insert("description".into(), Value::String(description.clone()));
        }
        if let Some(visited) = self.visited {
            set.insert("visited".into(), visited.into());
        }
        if let Some(rating) = self.rating {
            set.insert("rating".into(), rating.into());
        }
        if let Some(number_of_scores) = self.number_of_scores {
            set.insert("number_of_scores".into(), number_of_scores.into());
        }
        set
    }
}

/// Order maintained by the embedded array on insertion: best-rated first,
/// score count breaking ties.
pub fn sort_by_rating(sights: &mut [Sight]) {
    sights.sort_by(|a, b| {
        b.rating
            .partial_cmp(&a.rating)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.number_of_scores.cmp(&a.number_of_scores))
    });
}

pub(crate) fn check_name(fields: &mut HashMap<String, String>, key: &str, name: &str) {
    if name.trim().is_empty() {
        fields.insert(key.to_string(), "must not be empty".to_string());
    }
}

pub(crate) fn check_rating(fields: &mut HashMap<String, String>, key: &str, rating: f64) {
    if !(0.0..=5.0).contains(&rating) {
        fields.insert(key.to_string(), "must be between 0 and 5".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sight(name: &str, rating: f64, scores: i64) -> Sight {
        SightInput {
            name: name.to_string(),
            description: "d".to_string(),
            visited: 0,
            rating,
            number_of_scores: scores,
        }
        .into_sight()
    }

    #[test]
    fn input_derives_slug() {
        let s = sight("Red Square", 3.8, 100);
        assert_eq!(s.slug, "red-square");
        assert_eq!(s.name, "Red Square");
    }

    #[test]
    fn input_defaults_counters() {
        let input: SightInput =
            serde_json::from_str(r#"{"name": "Kremlin", "description": "walls"}"#).unwrap();
        assert_eq!(input.visited, 0);
        assert_eq!(input.rating, 0.0);
        assert_eq!(input.number_of_scores, 0);
    }

    #[test]
    fn rating_out_of_range_is_rejected() {
        let input = SightInput {
            name: "Kremlin".into(),
            description: "walls".into(),
            visited: 0,
            rating: 5.1,
            number_of_scores: 0,
        };
        let err = input.validate().unwrap_err();
        assert!(matches!(err, ApiError::UnprocessableEntity { .. }));
    }

    #[test]
    fn sort_orders_by_rating_then_scores() {
        let mut sights = vec![
            sight("A", 3.8, 100),
            sight("B", 4.5, 10),
            sight("C", 3.8, 500),
        ];
        sort_by_rating(&mut sights);
        let order: Vec<&str> = sights.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(order, ["B", "C", "A"]);
    }

    #[test]
    fn patch_changes_include_recomputed_slug() {
        let patch = SightPatch {
            name: Some("Winter Palace".into()),
            rating: Some(4.9),
            ..Default::default()
        };
        let set = patch.changes();
        assert_eq!(set["slug"], "winter-palace");
        assert_eq!(set["name"], "Winter Palace");
        assert_eq!(set["rating"], 4.9);
        assert!(!set.contains_key("description"));
    }

    #[test]
    fn empty_patch_has_no_changes() {
        assert!(SightPatch::default().changes().is_empty());
        assert_eq!(SightPatch::default().new_slug(), None);
    }
}

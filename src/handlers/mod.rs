pub mod cities;
pub mod sights;
pub mod users;

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::ApiError;

fn default_limit() -> i64 {
    20
}

/// Paging query parameters shared by the list endpoints.
#[derive(Debug, Deserialize)]
pub struct Page {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub skip: i64,
    #[serde(default)]
    pub search: Option<String>,
}

impl Page {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut fields = HashMap::new();
        if self.limit <= 0 {
            fields.insert("limit".to_string(), "must be greater than 0".to_string());
        }
        if self.skip < 0 {
            fields.insert("skip".to_string(), "must not be negative".to_string());
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ApiError::unprocessable_entity("Invalid paging", fields))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let page: Page = serde_json::from_str("{}").unwrap();
        assert_eq!(page.limit, 20);
        assert_eq!(page.skip, 0);
        assert!(page.search.is_none());
        assert!(page.validate().is_ok());
    }

    #[test]
    fn zero_limit_rejected() {
        let page: Page = serde_json::from_str(r#"{"limit": 0}"#).unwrap();
        assert!(page.validate().is_err());
    }

    #[test]
    fn negative_skip_rejected() {
        let page: Page = serde_json::from_str(r#"{"skip": -1}"#).unwrap();
        assert!(page.validate().is_err());
    }
}

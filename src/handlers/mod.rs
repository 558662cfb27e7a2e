pub mod applications;
pub mod auth;
pub mod comments;
pub mod gallery;
pub mod jobs;
pub mod media;
pub mod posts;

use std::collections::HashMap;

use crate::error::ApiError;

/// Reject a create/update body whose required fields are missing or blank,
/// reporting every offending field at once.
pub(crate) fn require_fields(fields: &[(&str, &str)]) -> Result<(), ApiError> {
    let mut errors = HashMap::new();
    for (name, value) in fields {
        if value.trim().is_empty() {
            errors.insert(name.to_string(), "This field is required".to_string());
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Missing required fields", Some(errors)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_populated_fields() {
        assert!(require_fields(&[("title", "Hello"), ("content", "body")]).is_ok());
    }

    #[test]
    fn reports_every_blank_field() {
        let err = require_fields(&[("title", "  "), ("content", ""), ("tags", "ok")]).unwrap_err();
        let body = err.to_json();
        assert_eq!(body["success"], false);
        assert!(body["field_errors"].get("title").is_some());
        assert!(body["field_errors"].get("content").is_some());
        assert!(body["field_errors"].get("tags").is_none());
    }
}

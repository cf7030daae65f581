use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::db::JsonDocument;
use crate::error::AppError;

/// Body of `PUT /users/{email}`, sent by the frontend on every sign-in.
///
/// Besides `role`, any profile fields the client sends are stored as-is.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UserInput {
    #[validate(email)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 32))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl UserInput {
    /// Builds the `$set` document for an upsert keyed on `email`.
    ///
    /// The stored email always equals the key, so a body naming a different email
    /// is rejected rather than silently re-keying the document.
    pub fn into_update(self, email: &str) -> Result<JsonDocument, AppError> {
        if let Some(body_email) = &self.email {
            if body_email != email {
                return Err(AppError::ValidationError(format!(
                    "Body email {} does not match {}",
                    body_email, email
                )));
            }
        }

        let mut document = super::to_document(&self)?;
        document.insert("email".to_string(), Value::String(email.to_string()));
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> UserInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_user_input_validation() {
        assert!(input(json!({ "email": "test@example.com", "role": "host" }))
            .validate()
            .is_ok());
        assert!(input(json!({ "email": "invalid-email" })).validate().is_err());
        assert!(input(json!({ "role": "" })).validate().is_err());
    }

    #[test]
    fn test_update_document_keeps_profile_fields() {
        let document = input(json!({ "name": "Ada", "role": "guest" }))
            .into_update("ada@example.com")
            .unwrap();

        assert_eq!(document["email"], "ada@example.com");
        assert_eq!(document["name"], "Ada");
        assert_eq!(document["role"], "guest");
    }

    #[test]
    fn test_mismatched_body_email_is_rejected() {
        let result = input(json!({ "email": "other@example.com" })).into_update("ada@example.com");
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}

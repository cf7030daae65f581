pub mod booking;
pub mod room;
pub mod user;

pub use booking::{BookingInput, Guest};
pub use room::{Host, RoomInput, StatusPatch};
pub use user::UserInput;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::JsonDocument;
use crate::error::AppError;

/// `?email=` query used by the bookings listings.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

impl EmailQuery {
    /// The email to filter by, or `None` when absent or blank.
    pub fn email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

/// Serializes a validated input into the document that gets stored.
pub(crate) fn to_document<T: Serialize>(input: &T) -> Result<JsonDocument, AppError> {
    match serde_json::to_value(input) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(_) => Err(AppError::ValidationError(
            "Request body must be a JSON object".into(),
        )),
        Err(e) => Err(AppError::ValidationError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_email_query_is_none() {
        assert_eq!(EmailQuery { email: None }.email(), None);
        assert_eq!(EmailQuery { email: Some("  ".into()) }.email(), None);
        assert_eq!(
            EmailQuery {
                email: Some("guest@example.com".into())
            }
            .email(),
            Some("guest@example.com")
        );
    }
}

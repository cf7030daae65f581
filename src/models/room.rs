use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use validator::{Validate, ValidationError};

use crate::db::JsonDocument;
use crate::error::AppError;

/// The listing owner, embedded in every room.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Host {
    #[validate(email)]
    pub email: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Body of `POST /rooms` and `PUT /rooms/{id}`.
///
/// Listing fields other than `host`, `price` and `booked` (title, location, images,
/// dates, ...) are stored as sent.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RoomInput {
    #[validate]
    pub host: Host,
    /// Kept as the number the client sent, so `120` is stored as `120`, not `120.0`.
    #[validate(custom = "non_negative_price")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booked: Option<bool>,
    #[serde(flatten)]
    pub listing: Map<String, Value>,
}

fn non_negative_price(price: &Number) -> Result<(), ValidationError> {
    match price.as_f64() {
        Some(value) if value >= 0.0 => Ok(()),
        _ => Err(ValidationError::new("non_negative_price")),
    }
}

impl RoomInput {
    /// Document for a new listing; rooms start unbooked unless told otherwise.
    pub fn into_new_document(self) -> Result<JsonDocument, AppError> {
        let mut document = super::to_document(&self)?;
        document
            .entry("booked".to_string())
            .or_insert(Value::Bool(false));
        Ok(document)
    }

    /// `$set` document for a full update; `booked` is only touched when sent.
    pub fn into_update(self) -> Result<JsonDocument, AppError> {
        super::to_document(&self)
    }
}

/// Body of `PATCH /rooms/status/{id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusPatch {
    pub status: bool,
}

impl StatusPatch {
    pub fn into_update(self) -> JsonDocument {
        let mut document = JsonDocument::new();
        document.insert("booked".to_string(), Value::Bool(self.status));
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> RoomInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_room_input_validation() {
        let valid = input(json!({
            "host": { "email": "host@example.com", "name": "Host" },
            "price": 120.0,
            "title": "Cabin by the lake"
        }));
        assert!(valid.validate().is_ok());

        let bad_host = input(json!({ "host": { "email": "nope" } }));
        assert!(bad_host.validate().is_err());

        let negative_price = input(json!({
            "host": { "email": "host@example.com" },
            "price": -1.0
        }));
        assert!(negative_price.validate().is_err());

        assert!(serde_json::from_value::<RoomInput>(json!({ "title": "No host" })).is_err());
    }

    #[test]
    fn test_price_keeps_its_json_form() {
        let whole = input(json!({ "host": { "email": "host@example.com" }, "price": 120 }))
            .into_new_document()
            .unwrap();
        assert_eq!(whole["price"], json!(120));
        assert!(whole["price"].is_u64());

        let fractional = input(json!({ "host": { "email": "host@example.com" }, "price": 120.5 }))
            .into_new_document()
            .unwrap();
        assert_eq!(fractional["price"], json!(120.5));

        let negative_int = input(json!({ "host": { "email": "host@example.com" }, "price": -3 }));
        assert!(negative_int.validate().is_err());

        assert!(serde_json::from_value::<RoomInput>(json!({
            "host": { "email": "host@example.com" },
            "price": "cheap"
        }))
        .is_err());
    }

    #[test]
    fn test_new_rooms_start_unbooked() {
        let document = input(json!({
            "host": { "email": "host@example.com" },
            "location": "Dhaka"
        }))
        .into_new_document()
        .unwrap();

        assert_eq!(document["booked"], false);
        assert_eq!(document["location"], "Dhaka");
        assert_eq!(document["host"]["email"], "host@example.com");
        assert!(!document.contains_key("price"));
    }

    #[test]
    fn test_update_leaves_booked_alone() {
        let document = input(json!({ "host": { "email": "host@example.com" } }))
            .into_update()
            .unwrap();
        assert!(!document.contains_key("booked"));
    }

    #[test]
    fn test_status_patch() {
        let patch: StatusPatch = serde_json::from_value(json!({ "status": true })).unwrap();
        assert_eq!(Value::Object(patch.into_update()), json!({ "booked": true }));

        assert!(serde_json::from_value::<StatusPatch>(json!({})).is_err());
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::db::JsonDocument;
use crate::error::AppError;

/// The guest who made the booking.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Guest {
    #[validate(email)]
    pub email: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Body of `POST /bookings`.
///
/// The room, price and dates are copied in by the frontend and kept verbatim in
/// `listing`; nothing links them back to the room document.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct BookingInput {
    #[validate]
    pub guest: Guest,
    /// Host email.
    #[validate(email)]
    pub host: String,
    #[serde(rename = "transactionId")]
    #[validate(length(min = 1))]
    pub transaction_id: String,
    #[serde(flatten)]
    pub listing: Map<String, Value>,
}

impl BookingInput {
    pub fn to_document(&self) -> Result<JsonDocument, AppError> {
        super::to_document(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_booking_input_validation() {
        let valid: BookingInput = serde_json::from_value(json!({
            "guest": { "email": "g@x.com", "name": "Guest" },
            "host": "h@x.com",
            "transactionId": "tx1",
            "price": 240
        }))
        .unwrap();
        assert!(valid.validate().is_ok());

        let document = valid.to_document().unwrap();
        assert_eq!(document["transactionId"], "tx1");
        assert_eq!(document["guest"]["name"], "Guest");
        assert_eq!(document["price"], 240);

        let empty_transaction: BookingInput = serde_json::from_value(json!({
            "guest": { "email": "g@x.com" },
            "host": "h@x.com",
            "transactionId": ""
        }))
        .unwrap();
        assert!(empty_transaction.validate().is_err());

        let bad_host: BookingInput = serde_json::from_value(json!({
            "guest": { "email": "g@x.com" },
            "host": "not an email",
            "transactionId": "tx1"
        }))
        .unwrap();
        assert!(bad_host.validate().is_err());
    }
}

//! Document persistence.
//!
//! Handlers talk to the `DocumentStore` trait, held as `web::Data<dyn DocumentStore>`.
//! `MongoStore` is the production implementation; `MemoryStore` backs the test suite.
//! Both speak plain JSON documents whose `_id` is the 24-character hex form of an
//! ObjectId, and both report writes with the driver-style outcome objects the
//! frontend reads (`insertedId`, `matchedCount`, ...).

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::AppError;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// A stored document as it crosses the HTTP boundary.
pub type JsonDocument = Map<String, Value>;

/// The three collections of the `aircncDb` database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Rooms,
    Bookings,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Rooms => "rooms",
            Collection::Bookings => "bookings",
        }
    }
}

/// A validated document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentId(ObjectId);

impl DocumentId {
    /// Parses a path segment; anything but 24 hex characters is `InvalidId`.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        Ok(DocumentId(ObjectId::parse_str(raw.trim())?))
    }

    pub fn generate() -> Self {
        DocumentId(ObjectId::new())
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// The filter shapes the handlers need.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    Id(DocumentId),
    /// Equality on a possibly dotted field path, e.g. `host.email`.
    Eq(String, Value),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(field.to_string(), value.into())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneOutcome {
    pub acknowledged: bool,
    pub inserted_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Single-document operations over the three collections.
///
/// No operation spans more than one document, so implementations only have to be
/// atomic per call.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(&self, collection: Collection, filter: Filter)
        -> Result<Vec<JsonDocument>, AppError>;

    async fn find_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Option<JsonDocument>, AppError>;

    /// Inserts `document` under a freshly generated id; a client-supplied `_id` is
    /// discarded.
    async fn insert_one(
        &self,
        collection: Collection,
        document: JsonDocument,
    ) -> Result<InsertOneOutcome, AppError>;

    /// Applies `set` as a `$set` to the first match. With `upsert`, a missing match
    /// creates a document from the filter's equality fields plus `set`.
    async fn update_one(
        &self,
        collection: Collection,
        filter: Filter,
        set: JsonDocument,
        upsert: bool,
    ) -> Result<UpdateOutcome, AppError>;

    async fn delete_one(&self, collection: Collection, filter: Filter)
        -> Result<DeleteOutcome, AppError>;

    /// Round-trips to the server; used at startup and by `/health`.
    async fn ping(&self) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_document_id_parsing() {
        let id = DocumentId::parse("64b7f0c2a1b2c3d4e5f60718").unwrap();
        assert_eq!(id.to_hex(), "64b7f0c2a1b2c3d4e5f60718");

        assert!(matches!(
            DocumentId::parse("64b7f0c2"),
            Err(AppError::InvalidId(_))
        ));
        assert!(matches!(
            DocumentId::parse("zzzzzzzzzzzzzzzzzzzzzzzz"),
            Err(AppError::InvalidId(_))
        ));
    }

    #[test]
    fn test_outcomes_serialize_like_the_driver() {
        let outcome = UpdateOutcome {
            acknowledged: true,
            matched_count: 1,
            modified_count: 1,
            upserted_count: 0,
            upserted_id: None,
        };

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "acknowledged": true,
                "matchedCount": 1,
                "modifiedCount": 1,
                "upsertedCount": 0,
                "upsertedId": null
            })
        );
    }
}

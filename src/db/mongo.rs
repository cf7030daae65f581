use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, Bson, Document},
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Database,
};
use serde_json::Value;

use super::{
    Collection, DeleteOutcome, DocumentId, DocumentStore, Filter, InsertOneOutcome, JsonDocument,
    UpdateOutcome,
};
use crate::error::AppError;

/// MongoDB-backed store.
///
/// Cloning shares the underlying driver pool. The client stays open until
/// `shutdown` is called from `main` after the HTTP server stops.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Connects with the Stable API v1 in strict mode.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        let mut options = ClientOptions::parse(uri).await?;
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );
        options.app_name = Some("aircnc".to_string());

        let client = Client::with_options(options)?;
        Ok(Self {
            database: client.database(database),
            client,
        })
    }

    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.database.collection(collection.name())
    }
}

fn filter_document(filter: Filter) -> Result<Document, AppError> {
    Ok(match filter {
        Filter::All => doc! {},
        Filter::Id(id) => doc! { "_id": id.object_id() },
        Filter::Eq(field, value) => {
            let mut document = Document::new();
            document.insert(field, bson::to_bson(&value)?);
            document
        }
    })
}

fn to_bson_document(mut document: JsonDocument) -> Result<Document, AppError> {
    document.remove("_id");
    Ok(bson::to_document(&document)?)
}

/// Renders a stored document as JSON, with `_id` flattened to its hex string.
fn to_json_document(document: Document) -> JsonDocument {
    document
        .into_iter()
        .map(|(key, value)| {
            let value = match (key.as_str(), value) {
                ("_id", Bson::ObjectId(id)) => Value::String(id.to_hex()),
                (_, other) => other.into_relaxed_extjson(),
            };
            (key, value)
        })
        .collect()
}

fn id_string(id: Bson) -> String {
    match id {
        Bson::ObjectId(id) => id.to_hex(),
        Bson::String(raw) => raw,
        other => other.to_string(),
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Vec<JsonDocument>, AppError> {
        let cursor = self
            .collection(collection)
            .find(filter_document(filter)?)
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(to_json_document).collect())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Option<JsonDocument>, AppError> {
        let document = self
            .collection(collection)
            .find_one(filter_document(filter)?)
            .await?;
        Ok(document.map(to_json_document))
    }

    async fn insert_one(
        &self,
        collection: Collection,
        document: JsonDocument,
    ) -> Result<InsertOneOutcome, AppError> {
        let mut document = to_bson_document(document)?;
        document.insert("_id", DocumentId::generate().object_id());

        let result = self.collection(collection).insert_one(document).await?;
        Ok(InsertOneOutcome {
            acknowledged: true,
            inserted_id: id_string(result.inserted_id),
        })
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: Filter,
        set: JsonDocument,
        upsert: bool,
    ) -> Result<UpdateOutcome, AppError> {
        if set.is_empty() {
            return Err(AppError::ValidationError("Nothing to update".into()));
        }
        let update = doc! { "$set": to_bson_document(set)? };

        let result = self
            .collection(collection)
            .update_one(filter_document(filter)?, update)
            .upsert(upsert)
            .await?;

        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(result.upserted_id.is_some()),
            upserted_id: result.upserted_id.map(id_string),
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<DeleteOutcome, AppError> {
        let result = self
            .collection(collection)
            .delete_one(filter_document(filter)?)
            .await?;
        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{
    Collection, DeleteOutcome, DocumentId, DocumentStore, Filter, InsertOneOutcome, JsonDocument,
    UpdateOutcome,
};
use crate::error::AppError;

/// In-process store with the same observable behaviour as `MongoStore` for the
/// operations the server uses. Documents keep their insertion order.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, Vec<JsonDocument>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`.
    pub fn len(&self, collection: Collection) -> usize {
        self.lock()
            .map(|collections| collections.get(&collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Collection, Vec<JsonDocument>>>, AppError> {
        self.collections
            .lock()
            .map_err(|_| AppError::DatabaseError("memory store lock poisoned".into()))
    }
}

fn lookup<'a>(document: &'a JsonDocument, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Writes `value` at a dotted `path`, creating intermediate objects. Returns
/// whether the stored value changed.
fn assign(document: &mut JsonDocument, path: &str, value: Value) -> bool {
    match path.split_once('.') {
        None => document.insert(path.to_string(), value.clone()).as_ref() != Some(&value),
        Some((head, rest)) => {
            let child = document
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(JsonDocument::new()));
            if !child.is_object() {
                *child = Value::Object(JsonDocument::new());
            }
            match child.as_object_mut() {
                Some(nested) => assign(nested, rest, value),
                None => false,
            }
        }
    }
}

fn matches(document: &JsonDocument, filter: &Filter) -> bool {
    match filter {
        Filter::All => true,
        Filter::Id(id) => document.get("_id") == Some(&Value::String(id.to_hex())),
        Filter::Eq(path, value) => lookup(document, path) == Some(value),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Vec<JsonDocument>, AppError> {
        let collections = self.lock()?;
        Ok(collections
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| matches(document, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Option<JsonDocument>, AppError> {
        let collections = self.lock()?;
        Ok(collections.get(&collection).and_then(|documents| {
            documents
                .iter()
                .find(|document| matches(document, &filter))
                .cloned()
        }))
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut document: JsonDocument,
    ) -> Result<InsertOneOutcome, AppError> {
        let id = DocumentId::generate().to_hex();
        document.insert("_id".to_string(), Value::String(id.clone()));

        self.lock()?.entry(collection).or_default().push(document);
        Ok(InsertOneOutcome {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: Filter,
        mut set: JsonDocument,
        upsert: bool,
    ) -> Result<UpdateOutcome, AppError> {
        set.remove("_id");
        if set.is_empty() {
            return Err(AppError::ValidationError("Nothing to update".into()));
        }

        let mut collections = self.lock()?;
        let documents = collections.entry(collection).or_default();

        if let Some(document) = documents
            .iter_mut()
            .find(|document| matches(document, &filter))
        {
            let mut modified = false;
            for (path, value) in set {
                modified |= assign(document, &path, value);
            }
            return Ok(UpdateOutcome {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(modified),
                upserted_count: 0,
                upserted_id: None,
            });
        }

        if !upsert {
            return Ok(UpdateOutcome {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
                upserted_count: 0,
                upserted_id: None,
            });
        }

        let mut document = JsonDocument::new();
        let id = match filter {
            Filter::Id(id) => id,
            Filter::Eq(path, value) => {
                assign(&mut document, &path, value);
                DocumentId::generate()
            }
            Filter::All => DocumentId::generate(),
        };
        document.insert("_id".to_string(), Value::String(id.to_hex()));
        for (path, value) in set {
            assign(&mut document, &path, value);
        }
        documents.push(document);

        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(id.to_hex()),
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<DeleteOutcome, AppError> {
        let mut collections = self.lock()?;
        let documents = collections.entry(collection).or_default();

        let deleted_count = match documents.iter().position(|document| matches(document, &filter)) {
            Some(index) => {
                documents.remove(index);
                1
            }
            None => 0,
        };
        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.lock().map(|_| ())
    }
}

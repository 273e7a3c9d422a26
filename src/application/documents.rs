//! Conversion between typed records and store documents.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{Collection, Document};

pub(crate) fn encode<T: Serialize>(collection: Collection, value: &T) -> Result<Document, DomainError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(DomainError::new(
            ErrorCode::InternalError,
            "document did not serialize to an object",
        )
        .with_detail("collection", collection.name())),
        Err(e) => Err(DomainError::new(ErrorCode::InternalError, e.to_string())
            .with_detail("collection", collection.name())),
    }
}

pub(crate) fn decode<T: DeserializeOwned>(collection: Collection, doc: Document) -> Result<T, DomainError> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| {
        DomainError::new(ErrorCode::DataCorrupted, e.to_string())
            .with_detail("collection", collection.name())
    })
}

/// Decodes every document, dropping and logging the ones that do not parse.
pub(crate) fn decode_all<T: DeserializeOwned>(collection: Collection, docs: Vec<Document>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| match decode(collection, doc) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(collection = collection.name(), error = %err, "Skipping unreadable document");
                None
            }
        })
        .collect()
}

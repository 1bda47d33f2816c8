use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON object body of a stored document.
pub type DocumentData = Map<String, Value>;

/// Document as returned by a store read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned (or explicitly set) id, the last path segment.
    pub id: String,
    pub data: DocumentData,
}

/// Columns of the `documents` table that a read hands back.
#[derive(Debug, Clone)]
pub struct DocumentRow {
    pub doc_id: String,
    pub data: Value,
}

impl DocumentRow {
    /// Convert the row into a [`Document`]. Non-object bodies read as empty.
    pub fn into_document(self) -> Document {
        let data = match self.data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Document {
            id: self.doc_id,
            data,
        }
    }
}

/// Pairs a decoded record with its store-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct Item<R> {
    pub id: String,
    pub record: R,
}

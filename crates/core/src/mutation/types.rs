//! Store operations produced by a save.
use serde::{Deserialize, Serialize};

use crate::document::{CollectionPath, DocPath, DocumentData};

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Insert into a collection; the store assigns the id.
    Create {
        collection: CollectionPath,
        document: DocumentData,
    },
    /// Replace the document at an existing path.
    Update { path: DocPath, document: DocumentData },
    Delete { path: DocPath },
}

impl Mutation {
    pub fn operation(&self) -> Operation {
        match self {
            Mutation::Create { .. } => Operation::Create,
            Mutation::Update { .. } => Operation::Update,
            Mutation::Delete { .. } => Operation::Delete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

/// Outcome of one applied mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResult {
    /// Id of the affected document (store-assigned for creates).
    pub id: String,
    pub operation: Operation,
}

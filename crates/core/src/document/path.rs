/// Document and collection path utilities.
///
/// Store paths alternate collection and document segments:
/// - Page content: `pages/{page}`
/// - Page item: `pages/{page}/items/{itemId}`
/// - Item collection: `pages/{page}/items`
use std::fmt;

use crate::page::PageName;

const PAGES_COLLECTION: &str = "pages";
const ITEMS_COLLECTION: &str = "items";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path cannot be empty")]
    Empty,
    #[error("path {0:?} contains an empty segment")]
    EmptySegment(String),
    #[error("{0:?} is not a document path (needs an even number of segments)")]
    NotADocument(String),
    #[error("{0:?} is not a collection path (needs an odd number of segments)")]
    NotACollection(String),
}

fn split_segments(raw: &str) -> Result<Vec<String>, PathError> {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        return Err(PathError::Empty);
    }
    let segments: Vec<String> = trimmed.split('/').map(str::to_string).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(PathError::EmptySegment(raw.to_string()));
    }
    Ok(segments)
}

/// Path of a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath {
    segments: Vec<String>,
}

impl DocPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let segments = split_segments(raw)?;
        if segments.len() % 2 != 0 {
            return Err(PathError::NotADocument(raw.to_string()));
        }
        Ok(Self { segments })
    }

    /// `pages/{page}`
    pub fn page(page: PageName) -> Self {
        Self {
            segments: vec![PAGES_COLLECTION.to_string(), page.as_str().to_string()],
        }
    }

    /// `pages/{page}/items/{id}`
    pub fn item(page: PageName, id: &str) -> Self {
        CollectionPath::items(page).doc(id)
    }

    /// The trailing segment.
    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Collection holding this document.
    pub fn parent(&self) -> CollectionPath {
        CollectionPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        }
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Path of a collection of documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    segments: Vec<String>,
}

impl CollectionPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let segments = split_segments(raw)?;
        if segments.len() % 2 != 1 {
            return Err(PathError::NotACollection(raw.to_string()));
        }
        Ok(Self { segments })
    }

    /// `pages/{page}/items`
    pub fn items(page: PageName) -> Self {
        Self {
            segments: vec![
                PAGES_COLLECTION.to_string(),
                page.as_str().to_string(),
                ITEMS_COLLECTION.to_string(),
            ],
        }
    }

    /// Child document with the given id.
    pub fn doc(&self, id: &str) -> DocPath {
        let mut segments = self.segments.clone();
        segments.push(id.to_string());
        DocPath { segments }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

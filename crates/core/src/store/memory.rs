use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{new_document_id, DocumentStore, StoreError};
use crate::document::{CollectionPath, DocPath, Document, DocumentData};

/// One call received by a [`MemoryStore`], with the target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get(String),
    Set(String),
    Add(String),
    Delete(String),
    List(String),
}

#[derive(Debug)]
struct Stored {
    seq: u64,
    parent: String,
    id: String,
    data: DocumentData,
}

#[derive(Debug, Default)]
struct Inner {
    docs: HashMap<String, Stored>,
    next_seq: u64,
    record_calls: bool,
    calls: Vec<StoreCall>,
    fail_reads: bool,
    fail_write_prefixes: Vec<String>,
}

impl Inner {
    fn record(&mut self, call: StoreCall) {
        if self.record_calls {
            self.calls.push(call);
        }
    }

    fn check_write(&self, target: &str) -> Result<(), StoreError> {
        if self
            .fail_write_prefixes
            .iter()
            .any(|prefix| target.starts_with(prefix.as_str()))
        {
            return Err(StoreError::Rejected {
                path: target.to_string(),
                reason: "write refused".to_string(),
            });
        }
        Ok(())
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads {
            return Err(StoreError::Unavailable("reads are failing".to_string()));
        }
        Ok(())
    }

    fn upsert(&mut self, path: &DocPath, data: DocumentData) {
        let key = path.to_string();
        if let Some(existing) = self.docs.get_mut(&key) {
            existing.data = data;
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.docs.insert(
            key,
            Stored {
                seq,
                parent: path.parent().to_string(),
                id: path.id().to_string(),
                data,
            },
        );
    }
}

/// Process-local document store.
///
/// Used when no database is configured and by the test suites. Reads or
/// writes can be made to fail on demand, and a store built with
/// [`MemoryStore::recording`] keeps a log of the calls it receives.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that logs every call, for asserting on store traffic.
    pub fn recording() -> Self {
        Self {
            inner: Mutex::new(Inner {
                record_calls: true,
                ..Inner::default()
            }),
        }
    }

    /// Write a document without recording a call.
    pub async fn seed(&self, path: &DocPath, data: DocumentData) {
        self.inner.lock().await.upsert(path, data);
    }

    /// Calls received so far, oldest first. Always empty unless the store
    /// was built with [`MemoryStore::recording`].
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.inner.lock().await.calls.clone()
    }

    pub async fn clear_calls(&self) {
        self.inner.lock().await.calls.clear();
    }

    /// Make every `get` and `list` fail until switched off.
    pub async fn fail_reads(&self, fail: bool) {
        self.inner.lock().await.fail_reads = fail;
    }

    /// Reject `set`, `add` and `delete` whose target path starts with `prefix`.
    pub async fn fail_writes_under(&self, prefix: impl Into<String>) {
        self.inner.lock().await.fail_write_prefixes.push(prefix.into());
    }

    pub async fn heal(&self) {
        let mut inner = self.inner.lock().await;
        inner.fail_reads = false;
        inner.fail_write_prefixes.clear();
    }

    /// Number of documents directly inside a collection.
    pub async fn count(&self, collection: &CollectionPath) -> usize {
        let parent = collection.to_string();
        self.inner
            .lock()
            .await
            .docs
            .values()
            .filter(|d| d.parent == parent)
            .count()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.record(StoreCall::Get(path.to_string()));
        inner.check_read()?;
        Ok(inner.docs.get(&path.to_string()).map(|d| Document {
            id: d.id.clone(),
            data: d.data.clone(),
        }))
    }

    async fn set(&self, path: &DocPath, data: DocumentData) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let target = path.to_string();
        inner.record(StoreCall::Set(target.clone()));
        inner.check_write(&target)?;
        inner.upsert(path, data);
        Ok(())
    }

    async fn add(
        &self,
        collection: &CollectionPath,
        data: DocumentData,
    ) -> Result<String, StoreError> {
        let mut inner = self.inner.lock().await;
        let target = collection.to_string();
        inner.record(StoreCall::Add(target.clone()));
        inner.check_write(&target)?;
        let id = new_document_id();
        inner.upsert(&collection.doc(&id), data);
        Ok(id)
    }

    async fn delete(&self, path: &DocPath) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let target = path.to_string();
        inner.record(StoreCall::Delete(target.clone()));
        inner.check_write(&target)?;
        inner.docs.remove(&target);
        Ok(())
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        let mut inner = self.inner.lock().await;
        let parent = collection.to_string();
        inner.record(StoreCall::List(parent.clone()));
        inner.check_read()?;
        let mut found: Vec<&Stored> = inner.docs.values().filter(|d| d.parent == parent).collect();
        found.sort_by_key(|d| d.seq);
        Ok(found
            .into_iter()
            .map(|d| Document {
                id: d.id.clone(),
                data: d.data.clone(),
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.lock().await.check_read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageName;
    use serde_json::{json, Value};

    fn body(value: Value) -> DocumentData {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn list_keeps_arrival_order_across_updates() {
        let store = MemoryStore::new();
        let items = CollectionPath::items(PageName::Adocao);
        let first = store.add(&items, body(json!({"name": "a"}))).await.unwrap();
        let second = store.add(&items, body(json!({"name": "b"}))).await.unwrap();
        store
            .set(&items.doc(&first), body(json!({"name": "a2"})))
            .await
            .unwrap();

        let docs = store.list(&items).await.unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec![first.as_str(), second.as_str()]);
        assert_eq!(docs[0].data["name"], "a2");
    }

    #[tokio::test]
    async fn list_only_returns_direct_children() {
        let store = MemoryStore::new();
        store
            .seed(&DocPath::page(PageName::Adocao), body(json!({"title": "t"})))
            .await;
        store
            .seed(&DocPath::item(PageName::Adocao, "x"), body(json!({})))
            .await;
        store
            .seed(&DocPath::item(PageName::Campanhas, "y"), body(json!({})))
            .await;

        let docs = store.list(&CollectionPath::items(PageName::Adocao)).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "x");
    }

    #[tokio::test]
    async fn injected_failures_and_call_log() {
        let store = MemoryStore::recording();
        let items = CollectionPath::items(PageName::Trabalhos);
        store.fail_reads(true).await;
        assert!(matches!(store.list(&items).await, Err(StoreError::Unavailable(_))));

        store.fail_writes_under("pages/trabalhos/items").await;
        assert!(store.add(&items, DocumentData::new()).await.is_err());
        assert!(store.delete(&items.doc("gone")).await.is_err());

        store.heal().await;
        store.delete(&items.doc("gone")).await.unwrap();

        assert_eq!(
            store.calls().await,
            vec![
                StoreCall::List("pages/trabalhos/items".into()),
                StoreCall::Add("pages/trabalhos/items".into()),
                StoreCall::Delete("pages/trabalhos/items/gone".into()),
                StoreCall::Delete("pages/trabalhos/items/gone".into()),
            ]
        );
    }

    #[tokio::test]
    async fn plain_store_keeps_no_call_log() {
        let store = MemoryStore::new();
        let items = CollectionPath::items(PageName::Adocao);
        store.add(&items, DocumentData::new()).await.unwrap();
        store.list(&items).await.unwrap();
        assert!(store.calls().await.is_empty());
    }
}

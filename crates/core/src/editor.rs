//! Generic page collection editor: list loading, page content, and the save
//! coordinator, parameterized by an [`ItemSchema`].

use std::marker::PhantomData;
use std::sync::Arc;

use crate::document::{CollectionPath, DocPath, Item};
use crate::form::to_data;
use crate::image::{encode_inline, ImageError};
use crate::items::ItemSchema;
use crate::mutation::{apply, run_bounded, Mutation, MutationResult};
use crate::page::{PageContent, PageName};
use crate::session::{EditSession, ImageChoice, PlannedOp, SavePlan, SessionError};
use crate::store::{DocumentStore, StoreError};

/// Default number of store calls a save keeps in flight.
pub const DEFAULT_SAVE_CONCURRENCY: usize = 8;

/// Result of loading a page's item collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<S> {
    Ready(Vec<Item<S>>),
    /// The collection read was rejected; rendered as an inline error.
    Unavailable,
}

impl<S> Listing<S> {
    pub fn items(&self) -> &[Item<S>] {
        match self {
            Listing::Ready(items) => items,
            Listing::Unavailable => &[],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Listing::Unavailable)
    }
}

/// Everything loaded for one page: header content plus its items.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot<S> {
    pub content: PageContent,
    pub listing: Listing<S>,
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("page content could not be written: {0}")]
    Content(#[source] StoreError),

    #[error("image could not be encoded: {0}")]
    Image(#[from] ImageError),

    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("{failed} of {total} item operations failed; first error: {first}")]
    Batch {
        failed: usize,
        total: usize,
        first: Box<SaveError>,
    },
}

/// Editor for one page with an `items` collection.
pub struct PageCollectionEditor<S> {
    store: Arc<dyn DocumentStore>,
    save_concurrency: usize,
    _schema: PhantomData<fn() -> S>,
}

impl<S> Clone for PageCollectionEditor<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            save_concurrency: self.save_concurrency,
            _schema: PhantomData,
        }
    }
}

impl<S: ItemSchema> PageCollectionEditor<S> {
    pub fn new(store: Arc<dyn DocumentStore>, save_concurrency: usize) -> Self {
        Self {
            store,
            save_concurrency: save_concurrency.max(1),
            _schema: PhantomData,
        }
    }

    fn collection() -> CollectionPath {
        CollectionPath::items(S::PAGE)
    }

    /// Fetch every item of the page in arrival order.
    ///
    /// A rejected read yields [`Listing::Unavailable`]; documents that do not
    /// decode as `S` are skipped.
    pub async fn load_items(&self) -> Listing<S> {
        let docs = match self.store.list(&Self::collection()).await {
            Ok(docs) => docs,
            Err(e) => {
                tracing::error!(page = %S::PAGE, error = %e, "failed to load items");
                return Listing::Unavailable;
            }
        };

        if docs.is_empty() {
            tracing::info!(page = %S::PAGE, "collection has no items");
        }

        let items = docs
            .into_iter()
            .filter_map(|doc| {
                match serde_json::from_value::<S>(serde_json::Value::Object(doc.data)) {
                    Ok(record) => Some(Item { id: doc.id, record }),
                    Err(e) => {
                        tracing::warn!(page = %S::PAGE, id = %doc.id, error = %e, "skipping undecodable item");
                        None
                    }
                }
            })
            .collect();
        Listing::Ready(items)
    }

    /// Load the page header, falling back to defaults on any problem.
    pub async fn load_content(&self) -> PageContent {
        load_page_content(self.store.as_ref(), S::PAGE).await
    }

    pub async fn load(&self) -> PageSnapshot<S> {
        let content = self.load_content().await;
        let listing = self.load_items().await;
        PageSnapshot { content, listing }
    }

    /// Open an edit session over a loaded snapshot.
    pub fn open(&self, snapshot: &PageSnapshot<S>) -> EditSession<S> {
        EditSession::new(snapshot.content.clone(), snapshot.listing.items().to_vec())
    }

    /// Validate, execute and close (or reopen) a session in one call.
    pub async fn save(&self, session: &mut EditSession<S>) -> Result<PageSnapshot<S>, SaveError> {
        let plan = session.begin_save()?;
        let outcome = self.execute(plan).await;
        session.finish_save(outcome.is_ok());
        outcome
    }

    /// Write the page content, then dispatch every planned item operation
    /// through the bounded executor and reload the page.
    ///
    /// There is no rollback: when some operations fail the others stay
    /// applied and the whole save is reported as failed.
    pub async fn execute(&self, plan: SavePlan<S>) -> Result<PageSnapshot<S>, SaveError> {
        let SavePlan { content, ops } = plan;

        self.store
            .set(&DocPath::page(S::PAGE), to_data(&content))
            .await
            .map_err(SaveError::Content)?;

        let total = ops.len();
        let tasks: Vec<_> = ops.into_iter().map(|op| self.run_op(op)).collect();
        let results = run_bounded(tasks, self.save_concurrency).await;

        let mut errors = results.into_iter().filter_map(Result::err);
        if let Some(first) = errors.next() {
            let failed = 1 + errors.count();
            tracing::error!(page = %S::PAGE, failed, total, error = %first, "save failed");
            return Err(SaveError::Batch {
                failed,
                total,
                first: Box::new(first),
            });
        }

        tracing::info!(page = %S::PAGE, operations = total, "save completed");
        Ok(self.load().await)
    }

    async fn run_op(&self, op: PlannedOp<S>) -> Result<MutationResult, SaveError> {
        let mutation = match op {
            PlannedOp::Delete { id } => Mutation::Delete {
                path: DocPath::item(S::PAGE, &id),
            },
            PlannedOp::Create { record, image } => Mutation::Create {
                collection: Self::collection(),
                document: to_data(&prepare(record, image).await?),
            },
            PlannedOp::Update { id, record, image } => Mutation::Update {
                path: DocPath::item(S::PAGE, &id),
                document: to_data(&prepare(record, image).await?),
            },
        };
        Ok(apply(self.store.as_ref(), mutation).await?)
    }
}

/// Resolve the image and recompute derived fields of a record about to be written.
async fn prepare<S: ItemSchema>(mut record: S, image: ImageChoice) -> Result<S, ImageError> {
    if let ImageChoice::Upload { upload, .. } = image {
        record.set_image(encode_inline(upload).await?);
    }
    record.normalize();
    Ok(record)
}

/// Read `pages/<page>`; missing documents, blank fields and read errors fall
/// back to the page defaults.
pub async fn load_page_content(store: &dyn DocumentStore, page: PageName) -> PageContent {
    match store.get(&DocPath::page(page)).await {
        Ok(Some(doc)) => serde_json::from_value::<PageContent>(serde_json::Value::Object(doc.data))
            .unwrap_or_else(|e| {
                tracing::warn!(page = %page, error = %e, "page content does not decode, using defaults");
                PageContent::default()
            })
            .or_defaults(page),
        Ok(None) => {
            tracing::info!(page = %page, "page content not found, using defaults");
            page.default_content()
        }
        Err(e) => {
            tracing::error!(page = %page, error = %e, "failed to load page content");
            page.default_content()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentData;
    use crate::image::{ImageUpload, InlineImage};
    use crate::items::{Animal, Campaign, CampaignStatus, Gender, NewsItem};
    use crate::store::{MemoryStore, StoreCall};
    use serde_json::{json, Value};

    fn body(value: Value) -> DocumentData {
        value.as_object().cloned().unwrap()
    }

    fn editor<S: ItemSchema>(store: &Arc<MemoryStore>) -> PageCollectionEditor<S> {
        PageCollectionEditor::new(store.clone(), 4)
    }

    async fn seed_animals(store: &MemoryStore) {
        store
            .seed(
                &DocPath::item(PageName::Adocao, "rex"),
                body(json!({
                    "name": "Rex", "age": "2 anos", "size": "Médio", "gender": "male",
                    "isNeutered": true, "isVaccinated": false, "temperament": "Brincalhão",
                    "image": "https://img.example/rex.jpg"
                })),
            )
            .await;
        store
            .seed(
                &DocPath::item(PageName::Adocao, "mel"),
                body(json!({
                    "name": "Mel", "age": "8 meses", "size": "Pequeno", "gender": "female",
                    "isNeutered": false, "isVaccinated": true, "temperament": "Tímida",
                    "image": "data:image/png;base64,AAEC"
                })),
            )
            .await;
    }

    #[tokio::test]
    async fn unmodified_save_round_trips_every_field() {
        let store = Arc::new(MemoryStore::new());
        seed_animals(&store).await;
        let editor = editor::<Animal>(&store);

        let before = editor.load().await;
        let mut session = editor.open(&before);
        let after = editor.save(&mut session).await.unwrap();

        assert_eq!(after.listing, before.listing);
        assert_eq!(before.listing.items().len(), 2);
    }

    #[tokio::test]
    async fn created_placeholder_receives_store_id() {
        let store = Arc::new(MemoryStore::new());
        let editor = editor::<NewsItem>(&store);
        let mut session = editor.open(&editor.load().await);

        let key = session.add_new().unwrap();
        session
            .update(
                &key,
                NewsItem {
                    title: "Mutirão".into(),
                    date: "15 de Julho, 2024".into(),
                    summary: "Castração gratuita".into(),
                    ..NewsItem::default()
                },
            )
            .unwrap();
        let snapshot = editor.save(&mut session).await.unwrap();

        let items = snapshot.listing.items();
        assert_eq!(items.len(), 1);
        assert_ne!(items[0].id, key);
        assert!(!items[0].id.starts_with("new-"));
        assert_eq!(items[0].record.link, "#");
        assert_eq!(items[0].record.image_alt, "Imagem da notícia: Mutirão");
    }

    #[tokio::test]
    async fn removed_placeholder_emits_no_store_call() {
        let store = Arc::new(MemoryStore::recording());
        let editor = editor::<Animal>(&store);
        let mut session = editor.open(&editor.load().await);
        let key = session.add_new().unwrap();
        session.remove(&key, true).unwrap();
        store.clear_calls().await;

        editor.save(&mut session).await.unwrap();

        let calls = store.calls().await;
        assert!(calls
            .iter()
            .all(|c| !matches!(c, StoreCall::Add(_) | StoreCall::Delete(_))));
        assert_eq!(calls[0], StoreCall::Set("pages/adocao".into()));
    }

    #[tokio::test]
    async fn removed_persisted_item_is_deleted_once() {
        let store = Arc::new(MemoryStore::recording());
        seed_animals(&store).await;
        let editor = editor::<Animal>(&store);
        let mut session = editor.open(&editor.load().await);
        session.remove("rex", true).unwrap();
        store.clear_calls().await;

        let snapshot = editor.save(&mut session).await.unwrap();

        let deletes: Vec<_> = store
            .calls()
            .await
            .into_iter()
            .filter(|c| matches!(c, StoreCall::Delete(_)))
            .collect();
        assert_eq!(deletes, vec![StoreCall::Delete("pages/adocao/items/rex".into())]);
        assert!(snapshot.listing.items().iter().all(|i| i.id != "rex"));
    }

    #[tokio::test]
    async fn uploaded_image_is_inlined_and_others_are_untouched() {
        let store = Arc::new(MemoryStore::new());
        seed_animals(&store).await;
        let editor = editor::<Animal>(&store);
        let mut session = editor.open(&editor.load().await);
        let bytes = vec![0x89, b'P', b'N', b'G', 7, 7, 7];
        session
            .choose_image(
                "rex",
                ImageUpload::new("rex.png", Some("image/png".into()), bytes.clone()),
                "/preview/rex".into(),
            )
            .unwrap();

        let snapshot = editor.save(&mut session).await.unwrap();
        let find = |id: &str| {
            snapshot
                .listing
                .items()
                .iter()
                .find(|i| i.id == id)
                .map(|i| i.record.image.clone())
                .unwrap()
        };

        let inline = InlineImage::parse(&find("rex")).unwrap();
        assert_eq!(inline.bytes, bytes);
        assert_eq!(inline.mime, "image/png");
        assert_eq!(find("mel"), "data:image/png;base64,AAEC");
    }

    #[tokio::test]
    async fn partial_failure_keeps_successful_writes_and_reports_one_error() {
        let store = Arc::new(MemoryStore::new());
        seed_animals(&store).await;
        store.fail_writes_under("pages/adocao/items/rex").await;
        let editor = editor::<Animal>(&store);
        let mut session = editor.open(&editor.load().await);
        session.set_content("Adote".into(), "Já!".into()).unwrap();
        let key = session.add_new().unwrap();
        session
            .update(
                &key,
                Animal {
                    name: "Bob".into(),
                    age: "1 ano".into(),
                    temperament: "Agitado".into(),
                    ..Animal::template()
                },
            )
            .unwrap();

        let err = editor.save(&mut session).await.unwrap_err();
        assert!(matches!(err, SaveError::Batch { failed: 1, total: 3, .. }));
        assert_eq!(session.state(), crate::session::SessionState::Editing);
        assert_eq!(session.entries().len(), 3);

        store.heal().await;
        let listing = editor.load_items().await;
        assert_eq!(listing.items().len(), 3);
        assert_eq!(editor.load_content().await.title, "Adote");
    }

    #[tokio::test]
    async fn failed_image_encoding_fails_the_save() {
        let store = Arc::new(MemoryStore::new());
        seed_animals(&store).await;
        let editor = editor::<Animal>(&store);
        let mut session = editor.open(&editor.load().await);
        session
            .choose_image("mel", ImageUpload::new("mel.png", None, Vec::new()), "/p".into())
            .unwrap();

        let err = editor.save(&mut session).await.unwrap_err();
        match err {
            SaveError::Batch { first, .. } => assert!(matches!(*first, SaveError::Image(_))),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn content_write_failure_aborts_before_items() {
        let store = Arc::new(MemoryStore::recording());
        seed_animals(&store).await;
        store.fail_writes_under("pages/adocao").await;
        let editor = editor::<Animal>(&store);
        let mut session = editor.open(&editor.load().await);
        session.remove("rex", false).unwrap();
        store.clear_calls().await;

        assert!(matches!(
            editor.save(&mut session).await,
            Err(SaveError::Content(_))
        ));
        assert_eq!(store.calls().await, vec![StoreCall::Set("pages/adocao".into())]);
    }

    #[tokio::test]
    async fn empty_and_failed_loads_are_distinguished() {
        let store = Arc::new(MemoryStore::new());
        let editor = editor::<Campaign>(&store);
        assert_eq!(editor.load_items().await, Listing::Ready(Vec::new()));

        store.fail_reads(true).await;
        let snapshot = editor.load().await;
        assert!(snapshot.listing.is_unavailable());
        assert!(snapshot.listing.items().is_empty());
        assert_eq!(snapshot.content, PageName::Campanhas.default_content());
    }

    #[tokio::test]
    async fn undecodable_documents_are_skipped() {
        let store = Arc::new(MemoryStore::new());
        store
            .seed(&DocPath::item(PageName::Campanhas, "bad"), body(json!({"year": "dois mil"})))
            .await;
        store
            .seed(
                &DocPath::item(PageName::Campanhas, "ok"),
                body(json!({"year": 2024, "status": "ongoing", "link": "https://x"})),
            )
            .await;

        let listing = editor::<Campaign>(&store).load_items().await;
        assert_eq!(listing.items().len(), 1);
        assert_eq!(listing.items()[0].record.status, CampaignStatus::Ongoing);
    }

    #[tokio::test]
    async fn unknown_enum_values_keep_the_record_listed_and_editable() {
        let store = Arc::new(MemoryStore::new());
        store
            .seed(
                &DocPath::item(PageName::Adocao, "bob"),
                body(json!({"name": "Bob", "age": "1 ano", "temperament": "Calmo", "gender": "Macho"})),
            )
            .await;
        store
            .seed(
                &DocPath::item(PageName::Campanhas, "old"),
                body(json!({"year": 2019, "status": ""})),
            )
            .await;

        let animals = editor::<Animal>(&store);
        let snapshot = animals.load().await;
        assert_eq!(snapshot.listing.items().len(), 1);
        assert_eq!(snapshot.listing.items()[0].record.gender, Gender::Male);
        let session = animals.open(&snapshot);
        assert!(session.entry("bob").is_some());

        let campaigns = editor::<Campaign>(&store).load_items().await;
        assert_eq!(campaigns.items()[0].record.status, CampaignStatus::Closed);
    }
}

//! In-memory form state of one edit session.
//!
//! The UI binds to an [`EditSession`]; nothing is read back from markup at
//! save time. A session lives from the moment the edit form is opened until
//! it is saved or discarded.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crate::document::validate::{validate_required_fields, ValidationError};
use crate::document::Item;
use crate::form::{apply_values, to_data, FormError, FormValues};
use crate::image::ImageUpload;
use crate::items::ItemSchema;
use crate::page::PageContent;

static PLACEHOLDER_SEQ: AtomicU64 = AtomicU64::new(0);

/// Identity of a fragment in the edit form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemKey {
    /// Not written yet; the placeholder only addresses the fragment.
    New { placeholder: String },
    Persisted(String),
}

impl ItemKey {
    pub fn new_placeholder() -> Self {
        let seq = PLACEHOLDER_SEQ.fetch_add(1, Ordering::Relaxed);
        ItemKey::New {
            placeholder: format!("new-{}-{seq}", Utc::now().timestamp_millis()),
        }
    }

    /// Key used by forms and routes to address the fragment.
    pub fn form_key(&self) -> &str {
        match self {
            ItemKey::New { placeholder } => placeholder,
            ItemKey::Persisted(id) => id,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, ItemKey::New { .. })
    }
}

/// Image of a fragment: the current source, or a file picked in this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageChoice {
    Keep,
    Upload {
        upload: ImageUpload,
        /// Temporary local reference shown until the session is saved.
        preview: String,
    },
}

/// One fragment of the edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct EditEntry<S> {
    pub key: ItemKey,
    pub record: S,
    pub image: ImageChoice,
    pub deleted: bool,
}

impl<S: ItemSchema> EditEntry<S> {
    fn persisted(item: Item<S>) -> Self {
        Self {
            key: ItemKey::Persisted(item.id),
            record: item.record,
            image: ImageChoice::Keep,
            deleted: false,
        }
    }

    /// Source the preview should show right now.
    pub fn preview(&self) -> &str {
        match &self.image {
            ImageChoice::Keep => self.record.image(),
            ImageChoice::Upload { preview, .. } => preview,
        }
    }

    pub fn pending_upload(&self) -> Option<&ImageUpload> {
        match &self.image {
            ImageChoice::Keep => None,
            ImageChoice::Upload { upload, .. } => Some(upload),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Editing,
    Saving,
    Saved,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("a save is already in progress")]
    SaveInProgress,
    #[error("the session has already been saved")]
    Closed,
    #[error("no fragment with key {0:?}")]
    UnknownKey(String),
    #[error("fragment {0:?} has been removed")]
    Removed(String),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("Por favor, adicione pelo menos a primeira imagem do carrossel.")]
    MissingFirstCarouselImage,
    #[error("{heading}: {source}")]
    Invalid {
        heading: String,
        source: ValidationError,
    },
}

/// Operation planned for one fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedOp<S> {
    Create { record: S, image: ImageChoice },
    Update { id: String, record: S, image: ImageChoice },
    Delete { id: String },
}

/// Everything a save needs, detached from the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SavePlan<S> {
    pub content: PageContent,
    pub ops: Vec<PlannedOp<S>>,
}

/// Form state of a page collection editor.
#[derive(Debug, Clone)]
pub struct EditSession<S> {
    content: PageContent,
    entries: Vec<EditEntry<S>>,
    state: SessionState,
}

impl<S: ItemSchema> EditSession<S> {
    pub(crate) fn new(content: PageContent, mut items: Vec<Item<S>>) -> Self {
        S::sort_for_edit(&mut items);
        Self {
            content,
            entries: items.into_iter().map(EditEntry::persisted).collect(),
            state: SessionState::Editing,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn content(&self) -> &PageContent {
        &self.content
    }

    /// Every fragment, removed ones included, in form order.
    pub fn entries(&self) -> &[EditEntry<S>] {
        &self.entries
    }

    pub fn entry(&self, key: &str) -> Option<&EditEntry<S>> {
        self.entries.iter().find(|e| e.key.form_key() == key)
    }

    fn ensure_editable(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Editing => Ok(()),
            SessionState::Saving => Err(SessionError::SaveInProgress),
            SessionState::Saved => Err(SessionError::Closed),
        }
    }

    fn live_entry_mut(&mut self, key: &str) -> Result<&mut EditEntry<S>, SessionError> {
        self.ensure_editable()?;
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.key.form_key() == key)
            .ok_or_else(|| SessionError::UnknownKey(key.to_string()))?;
        if entry.deleted {
            return Err(SessionError::Removed(key.to_string()));
        }
        Ok(entry)
    }

    pub fn set_content(&mut self, title: String, subtitle: String) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.content = PageContent { title, subtitle };
        Ok(())
    }

    /// Add an empty fragment at the top of the form and return its key.
    pub fn add_new(&mut self) -> Result<String, SessionError> {
        self.ensure_editable()?;
        let entry = EditEntry {
            key: ItemKey::new_placeholder(),
            record: S::template(),
            image: ImageChoice::Keep,
            deleted: false,
        };
        let key = entry.key.form_key().to_string();
        self.entries.insert(0, entry);
        Ok(key)
    }

    /// Replace a fragment's field values from submitted form values.
    pub fn apply_form(&mut self, key: &str, values: &FormValues) -> Result<(), SessionError> {
        let entry = self.live_entry_mut(key)?;
        entry.record = apply_values(&entry.record, S::FIELDS, values)?;
        Ok(())
    }

    /// Replace a fragment's record. The image source is kept as it was.
    pub fn update(&mut self, key: &str, mut record: S) -> Result<(), SessionError> {
        let entry = self.live_entry_mut(key)?;
        record.set_image(entry.record.image().to_string());
        entry.record = record;
        Ok(())
    }

    /// Pick a new image file. Only the preview changes until the save.
    pub fn choose_image(
        &mut self,
        key: &str,
        upload: ImageUpload,
        preview: String,
    ) -> Result<(), SessionError> {
        let entry = self.live_entry_mut(key)?;
        entry.image = ImageChoice::Upload { upload, preview };
        Ok(())
    }

    /// Hide and flag a fragment, but only once the removal was confirmed.
    /// Returns whether the fragment was flagged.
    pub fn remove(&mut self, key: &str, confirmed: bool) -> Result<bool, SessionError> {
        let entry = self.live_entry_mut(key)?;
        if !confirmed {
            return Ok(false);
        }
        entry.deleted = true;
        Ok(true)
    }

    /// Validate the form, switch to `Saving` and detach the save plan.
    ///
    /// Removed placeholders produce no operation at all.
    pub fn begin_save(&mut self) -> Result<SavePlan<S>, SessionError> {
        self.ensure_editable()?;

        for entry in self.entries.iter().filter(|e| !e.deleted) {
            validate_required_fields(S::FIELDS, &to_data(&entry.record)).map_err(|source| {
                SessionError::Invalid {
                    heading: entry.record.heading(),
                    source,
                }
            })?;
        }

        let ops = self
            .entries
            .iter()
            .filter_map(|entry| match (&entry.key, entry.deleted) {
                (ItemKey::New { .. }, true) => None,
                (ItemKey::Persisted(id), true) => Some(PlannedOp::Delete { id: id.clone() }),
                (ItemKey::New { .. }, false) => Some(PlannedOp::Create {
                    record: entry.record.clone(),
                    image: entry.image.clone(),
                }),
                (ItemKey::Persisted(id), false) => Some(PlannedOp::Update {
                    id: id.clone(),
                    record: entry.record.clone(),
                    image: entry.image.clone(),
                }),
            })
            .collect();

        self.state = SessionState::Saving;
        Ok(SavePlan {
            content: self.content.clone(),
            ops,
        })
    }

    /// Leave `Saving`: closed after success, editable again after failure.
    pub fn finish_save(&mut self, succeeded: bool) {
        self.state = if succeeded {
            SessionState::Saved
        } else {
            SessionState::Editing
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{Animal, Campaign};

    fn animal(name: &str) -> Animal {
        Animal {
            name: name.into(),
            age: "1 ano".into(),
            temperament: "Calmo".into(),
            image: format!("https://img.example/{name}.jpg"),
            ..Animal::template()
        }
    }

    fn session() -> EditSession<Animal> {
        EditSession::new(
            PageContent::default(),
            vec![
                Item { id: "a1".into(), record: animal("Rex") },
                Item { id: "a2".into(), record: animal("Mel") },
            ],
        )
    }

    #[test]
    fn add_new_prepends_placeholder_fragment() {
        let mut s = session();
        let key = s.add_new().unwrap();
        assert!(key.starts_with("new-"));
        assert!(s.entries()[0].key.is_new());
        assert_eq!(s.entries()[0].record, Animal::template());
        assert_ne!(s.add_new().unwrap(), key);
    }

    #[test]
    fn choosing_an_image_only_swaps_the_preview() {
        let mut s = session();
        let upload = ImageUpload::new("rex.png", Some("image/png".into()), vec![1, 2, 3]);
        s.choose_image("a1", upload.clone(), "/preview/a1".into()).unwrap();

        let entry = s.entry("a1").unwrap();
        assert_eq!(entry.preview(), "/preview/a1");
        assert_eq!(entry.record.image, "https://img.example/Rex.jpg");
        assert_eq!(entry.pending_upload(), Some(&upload));
    }

    #[test]
    fn removal_requires_confirmation_and_keeps_the_fragment() {
        let mut s = session();
        assert!(!s.remove("a1", false).unwrap());
        assert!(!s.entry("a1").unwrap().deleted);

        assert!(s.remove("a1", true).unwrap());
        assert!(s.entry("a1").unwrap().deleted);
        assert_eq!(s.entries().len(), 2);
        assert_eq!(
            s.apply_form("a1", &FormValues::new()),
            Err(SessionError::Removed("a1".into()))
        );
    }

    #[test]
    fn plan_routes_fragments_by_key_and_flag() {
        let mut s = session();
        let dropped = s.add_new().unwrap();
        let created = s.add_new().unwrap();
        s.update(&created, animal("Luna")).unwrap();
        s.remove(&dropped, true).unwrap();
        s.remove("a2", true).unwrap();

        let plan = s.begin_save().unwrap();
        assert_eq!(s.state(), SessionState::Saving);
        assert_eq!(plan.ops.len(), 3);
        assert!(matches!(&plan.ops[0], PlannedOp::Create { record, .. } if record.name == "Luna"));
        assert!(matches!(&plan.ops[1], PlannedOp::Update { id, .. } if id == "a1"));
        assert_eq!(plan.ops[2], PlannedOp::Delete { id: "a2".into() });
    }

    #[test]
    fn update_keeps_current_image_source() {
        let mut s = session();
        let mut replacement = animal("Rex II");
        replacement.image = "ignored".into();
        s.update("a1", replacement).unwrap();
        assert_eq!(s.entry("a1").unwrap().record.image, "https://img.example/Rex.jpg");
    }

    #[test]
    fn duplicate_submit_is_rejected_until_finished() {
        let mut s = session();
        s.begin_save().unwrap();
        assert_eq!(s.begin_save(), Err(SessionError::SaveInProgress));
        assert_eq!(s.add_new(), Err(SessionError::SaveInProgress));

        s.finish_save(false);
        assert_eq!(s.state(), SessionState::Editing);
        assert!(s.begin_save().is_ok());

        s.finish_save(true);
        assert_eq!(s.begin_save(), Err(SessionError::Closed));
    }

    #[test]
    fn incomplete_live_fragment_blocks_the_save() {
        let mut s = session();
        s.add_new().unwrap();
        let err = s.begin_save().unwrap_err();
        assert!(matches!(err, SessionError::Invalid { .. }));
        assert_eq!(s.state(), SessionState::Editing);
    }

    #[test]
    fn removed_incomplete_placeholder_does_not_block_the_save() {
        let mut s = session();
        let key = s.add_new().unwrap();
        s.remove(&key, true).unwrap();
        assert_eq!(s.begin_save().unwrap().ops.len(), 2);
    }

    #[test]
    fn campaigns_open_newest_first() {
        let campaign = |year| Campaign { year, ..Campaign::template() };
        let s = EditSession::new(
            PageContent::default(),
            vec![
                Item { id: "c1".into(), record: campaign(2021) },
                Item { id: "c2".into(), record: campaign(2023) },
                Item { id: "c3".into(), record: campaign(2022) },
            ],
        );
        let keys: Vec<_> = s.entries().iter().map(|e| e.key.form_key()).collect();
        assert_eq!(keys, vec!["c2", "c3", "c1"]);
    }
}

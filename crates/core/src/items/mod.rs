//! Item schemas of the pages that own an `items` collection.

pub mod animal;
pub mod campaign;
pub mod news;

use serde::{de::DeserializeOwned, Serialize};

use crate::document::Item;
use crate::form::FieldSpec;
use crate::page::PageName;

pub use animal::{Animal, Gender, ANIMAL_FIELDS};
pub use campaign::{Campaign, CampaignStatus, CAMPAIGN_FIELDS};
pub use news::{NewsItem, NEWS_FIELDS};

/// A record type edited through a page collection editor.
pub trait ItemSchema:
    Serialize + DeserializeOwned + Clone + std::fmt::Debug + PartialEq + Send + Sync + 'static
{
    /// Page whose `items` collection holds the records.
    const PAGE: PageName;

    /// Field-to-control table, in form order. The image field is not listed.
    const FIELDS: &'static [FieldSpec];

    /// Label above the image picker.
    const IMAGE_LABEL: &'static str;

    /// Confirmation asked before a fragment is removed.
    const REMOVE_PROMPT: &'static str;

    /// Message shown in place of the list when loading fails.
    const LOAD_ERROR: &'static str;

    /// Record used for a freshly added fragment.
    fn template() -> Self;

    /// Fragment heading, e.g. `Animal: Rex`.
    fn heading(&self) -> String;

    fn image(&self) -> &str;

    fn set_image(&mut self, src: String);

    /// Derived fields recomputed right before a write.
    fn normalize(&mut self) {}

    /// Order of fragments when an edit session is opened.
    fn sort_for_edit(_items: &mut [Item<Self>]) {}
}

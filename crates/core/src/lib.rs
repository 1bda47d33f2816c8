//! Content model and editing engine for the association's public pages.
//!
//! Pages are stored as JSON documents under `pages/<page>` with per-item
//! documents under `pages/<page>/items/<id>`. Staff edit a page through an
//! [`session::EditSession`] and the [`editor::PageCollectionEditor`] turns
//! the session into store calls.

pub mod auth;
pub mod document;
pub mod editor;
pub mod form;
pub mod homepage;
pub mod image;
pub mod items;
pub mod mutation;
pub mod page;
pub mod session;
pub mod store;

pub use editor::{Listing, PageCollectionEditor, PageSnapshot, SaveError};
pub use page::{PageContent, PageName};
pub use store::{DocumentStore, MemoryStore, PgStore, StoreError};

pub mod model;
pub mod path;
pub mod validate;

pub use model::{Document, DocumentData, DocumentRow, Item};
pub use path::{CollectionPath, DocPath, PathError};

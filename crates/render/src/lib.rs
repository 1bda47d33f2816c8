//! HTML projection of page records, listings and edit sessions.
//!
//! Rendering is pure: every function takes loaded data and returns markup.

pub mod cards;
pub mod edit_form;
pub mod homepage;
pub mod layout;
pub mod listing;

pub use cards::{render_animal_detail, Card};
pub use edit_form::render_edit_form;
pub use homepage::{render_homepage, render_homepage_form};
pub use layout::{build_page, html_escape};
pub use listing::{render_listing, render_page};

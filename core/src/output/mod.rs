//! Renderers for [`DiffTable`](crate::diff::DiffTable).
//!
//! Both renderers share the action-column convention: every emitted row
//! starts with a marker cell (`@@` header, `!` column status, `+++`/`---`
//! inserts and deletes, `->` in-place modification).

pub mod html;
pub mod text;

pub use html::{complete_html, render_html};
pub use text::render_text;

//! Output rendering: canonical JSON and human-readable summaries.

mod json;
mod summary;

pub use json::{to_json, JsonFormat};
pub use summary::render_summary;

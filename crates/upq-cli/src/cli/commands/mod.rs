//! CLI command handlers, one per file.

mod completions;
mod control;
mod status;
mod upload;

pub use completions::run_completions;
pub use control::run_control;
pub use status::run_status;
pub use upload::{run_upload, UploadArgs};

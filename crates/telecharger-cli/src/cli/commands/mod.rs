//! CLI command handlers, one per file.

mod add;
mod completions;
mod list;
mod remove;
pub(crate) mod session;

pub use add::run_add;
pub use completions::run_completions;
pub use list::run_list;
pub use remove::run_remove;
pub use session::run_session;

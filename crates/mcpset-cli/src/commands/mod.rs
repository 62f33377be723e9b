//! Command implementations for mcpset

pub mod add;
pub mod completions;
pub mod files;
pub mod init;
pub mod list;
pub mod output;
pub mod remove;
pub mod sync;
pub mod templates;

pub use add::{Payload, run_add};
pub use completions::run_completions;
pub use files::run_files;
pub use init::run_init;
pub use list::{ListArgs, run_list};
pub use remove::run_remove;
pub use sync::run_sync;
pub use templates::run_templates;

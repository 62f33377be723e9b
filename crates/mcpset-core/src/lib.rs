//! Core sync engine for mcpset
//!
//! This crate reconciles one central store of MCP server definitions with
//! the configuration files of many clients, implementing:
//!
//! - **Target registry**: validated descriptors of the managed client files
//! - **Central store**: the canonical mapping of server definitions
//! - **Merge engine**: append-only reconciliation with an explicit plan
//! - **Collector** (`init`): fold target entries into the store
//! - **Applier** (`sync`): merge the store into every target
//! - **Templates**: parameterized definitions expanded with overrides
//!
//! # Architecture
//!
//! ```text
//!                  mcpset-cli
//!                      |
//!                 mcpset-core
//!                      |
//!          +-----------+-----------+
//!          |                       |
//!      mcpset-fs             mcpset-content
//! ```
//!
//! # Example
//!
//! ```no_run
//! use mcpset_core::{ApplyOptions, CentralStore, Settings, TargetRegistry, apply};
//!
//! fn sync_all() -> mcpset_core::Result<()> {
//!     let settings = Settings::from_home()?;
//!     let registry = TargetRegistry::load(&settings)?;
//!     let store = CentralStore::open(registry.central())?;
//!     let report = apply(&registry, &store, &ApplyOptions::default())?;
//!     println!("{} file(s) written", report.written());
//!     Ok(())
//! }
//! ```

pub mod applier;
pub mod collector;
pub mod entry;
pub mod error;
pub mod merge;
pub mod report;
pub mod settings;
pub mod store;
pub mod target;
pub mod template;

pub use applier::{ApplyOptions, apply};
pub use collector::{CollectOptions, CollectReport, Provenance, collect};
pub use entry::{AddOptions, RemoveOptions, add_entry, remove_entry};
pub use error::{Error, Result};
pub use merge::{Decision, MergeOutcome, MergePlan, PlanEntry, Policy, merge, remove};
pub use report::{RunReport, TargetFailure, TargetOutcome, TargetStatus};
pub use settings::Settings;
pub use store::CentralStore;
pub use target::{
    CENTRAL_NAME, CENTRAL_SYNONYM, DEFAULT_CENTRAL_ROOT, Document, Target, TargetRegistry,
    TargetSpec,
};
pub use template::{Overrides, Param, Template, TemplateCatalog};

pub use mcpset_content::{Entries, Format, RootKey};

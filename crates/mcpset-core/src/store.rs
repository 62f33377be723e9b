//! The central store: the canonical mapping of server definitions

use mcpset_content::Entries;

use crate::error::Result;
use crate::target::{Document, Target};

/// In-memory central store backed by the registry's `root` target.
///
/// Mutations stay in memory until [`CentralStore::flush`].
#[derive(Debug, Clone)]
pub struct CentralStore {
    target: Target,
    document: Document,
    entries: Entries,
}

impl CentralStore {
    /// Load the store. A missing file opens as an empty store.
    pub fn open(target: &Target) -> Result<Self> {
        let document = target.document()?;
        tracing::debug!(
            path = %target.path,
            entries = document.entries.len(),
            exists = document.exists,
            "Opened central store"
        );
        Ok(Self {
            entries: document.entries.clone(),
            target: target.clone(),
            document,
        })
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn entries(&self) -> &Entries {
        &self.entries
    }

    /// Copy of the current entries, for runs that must not see later changes
    pub fn snapshot(&self) -> Entries {
        self.entries.clone()
    }

    pub fn replace(&mut self, entries: Entries) {
        self.entries = entries;
    }

    /// Whether the file is absent or differs from the in-memory entries
    pub fn is_dirty(&self) -> bool {
        !self.document.exists || self.entries != self.document.entries
    }

    /// File text the store would be written as
    pub fn render(&self) -> Result<String> {
        self.target.render(&self.document, &self.entries)
    }

    /// Write the store if it changed. Returns whether a write happened.
    pub fn flush(&mut self) -> Result<bool> {
        if !self.is_dirty() {
            tracing::debug!(path = %self.target.path, "Central store unchanged");
            return Ok(false);
        }

        let content = self.render()?;
        self.target.write(&content)?;
        self.document = Document {
            source: content,
            entries: self.entries.clone(),
            exists: true,
            root_present: true,
        };
        Ok(true)
    }
}

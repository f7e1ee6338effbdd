//! Registry of retail locations and the report tab each one publishes to

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEntry {
    /// Display name used on the command line
    pub name: String,
    /// Tab title in the destination spreadsheet
    pub tab: String,
}

#[derive(Debug, Clone, Default)]
pub struct StoreRegistry {
    entries: Vec<StoreEntry>,
}

impl StoreRegistry {
    pub fn new(entries: Vec<StoreEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[StoreEntry] {
        &self.entries
    }

    /// Find a store by name, ignoring case and surrounding whitespace
    pub fn find(&self, name: &str) -> Option<&StoreEntry> {
        let wanted = name.trim();
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(wanted))
    }

    /// Tab for a store name; unknown names are used verbatim as tab titles
    pub fn tab_for(&self, name: &str) -> String {
        match self.find(name) {
            Some(entry) => entry.tab.clone(),
            None => name.trim().to_string(),
        }
    }
}

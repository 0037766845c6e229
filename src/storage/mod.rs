//! Pattern persistence
//!
//! Patterns are saved under a user-chosen name. `FileStore` keeps every
//! pattern in one JSON file; `MemoryStore` holds them for the session only.

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

mod pattern;

pub use pattern::{PatternData, PatternError, PATTERN_VERSION};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no pattern named {0:?}")]
    NotFound(String),

    #[error("a pattern named {0:?} already exists")]
    AlreadyExists(String),

    #[error("pattern name cannot be empty")]
    InvalidName,
}

/// Name-keyed pattern storage.
pub trait PatternStore {
    fn save(&mut self, name: &str, pattern: &PatternData) -> Result<(), StoreError>;

    fn load(&self, name: &str) -> Result<Option<PatternData>, StoreError>;

    /// Saved names, sorted case-insensitively.
    fn list(&self) -> Result<Vec<String>, StoreError>;

    fn rename(&mut self, old: &str, new: &str) -> Result<(), StoreError>;

    fn delete(&mut self, name: &str) -> Result<(), StoreError>;

    /// Name of the pattern most recently saved, renamed or marked used.
    fn last_used(&self) -> Option<String>;

    fn mark_used(&mut self, name: &str) -> Result<(), StoreError>;
}

fn clean_name(name: &str) -> Result<&str, StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(StoreError::InvalidName)
    } else {
        Ok(trimmed)
    }
}

/// Serialized contents of a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PatternBook {
    patterns: BTreeMap<String, PatternData>,
    #[serde(default)]
    last_used: Option<String>,
}

impl PatternBook {
    fn save(&mut self, name: &str, pattern: &PatternData) -> Result<(), StoreError> {
        let name = clean_name(name)?;
        self.patterns.insert(name.to_string(), pattern.clone());
        self.last_used = Some(name.to_string());
        Ok(())
    }

    fn load(&self, name: &str) -> Option<PatternData> {
        self.patterns.get(name.trim()).cloned()
    }

    fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.patterns.keys().cloned().collect();
        names.sort_by_key(|n| n.to_lowercase());
        names
    }

    fn rename(&mut self, old: &str, new: &str) -> Result<(), StoreError> {
        let old = old.trim();
        let new = clean_name(new)?;
        if old == new {
            return Ok(());
        }
        if self.patterns.contains_key(new) {
            return Err(StoreError::AlreadyExists(new.to_string()));
        }
        let pattern = self
            .patterns
            .remove(old)
            .ok_or_else(|| StoreError::NotFound(old.to_string()))?;
        self.patterns.insert(new.to_string(), pattern);
        self.last_used = Some(new.to_string());
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        let name = name.trim();
        self.patterns
            .remove(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        if self.last_used.as_deref() == Some(name) {
            self.last_used = None;
        }
        Ok(())
    }

    fn mark_used(&mut self, name: &str) -> Result<(), StoreError> {
        let name = name.trim();
        if !self.patterns.contains_key(name) {
            return Err(StoreError::NotFound(name.to_string()));
        }
        self.last_used = Some(name.to_string());
        Ok(())
    }
}

/// Session-only store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    book: PatternBook,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PatternStore for MemoryStore {
    fn save(&mut self, name: &str, pattern: &PatternData) -> Result<(), StoreError> {
        self.book.save(name, pattern)
    }

    fn load(&self, name: &str) -> Result<Option<PatternData>, StoreError> {
        Ok(self.book.load(name))
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.book.list())
    }

    fn rename(&mut self, old: &str, new: &str) -> Result<(), StoreError> {
        self.book.rename(old, new)
    }

    fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        self.book.delete(name)
    }

    fn last_used(&self) -> Option<String> {
        self.book.last_used.clone()
    }

    fn mark_used(&mut self, name: &str) -> Result<(), StoreError> {
        self.book.mark_used(name)
    }
}

/// Store backed by a single JSON file, rewritten after every change.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    book: PatternBook,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let book = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PatternBook::default(),
            Err(e) => return Err(e.into()),
        };
        info!("opened pattern store {:?} ({} patterns)", path, book.patterns.len());
        Ok(Self { path, book })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.book)?;

        // Ensure directory exists
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Apply `change` and write the file, rolling back the in-memory copy if either fails.
    fn update<F>(&mut self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut PatternBook) -> Result<(), StoreError>,
    {
        let before = self.book.clone();
        let result = change(&mut self.book).and_then(|_| self.persist());
        if result.is_err() {
            self.book = before;
        }
        result
    }
}

impl PatternStore for FileStore {
    fn save(&mut self, name: &str, pattern: &PatternData) -> Result<(), StoreError> {
        self.update(|book| book.save(name, pattern))?;
        info!("saved pattern {:?}", name.trim());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<PatternData>, StoreError> {
        Ok(self.book.load(name))
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.book.list())
    }

    fn rename(&mut self, old: &str, new: &str) -> Result<(), StoreError> {
        self.update(|book| book.rename(old, new))?;
        info!("renamed pattern {:?} to {:?}", old.trim(), new.trim());
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        self.update(|book| book.delete(name))?;
        info!("deleted pattern {:?}", name.trim());
        Ok(())
    }

    fn last_used(&self) -> Option<String> {
        self.book.last_used.clone()
    }

    fn mark_used(&mut self, name: &str) -> Result<(), StoreError> {
        self.update(|book| book.mark_used(name))
    }
}

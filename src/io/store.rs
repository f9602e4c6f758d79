//! Key/value file store.
//!
//! The pipeline never touches paths directly: scratch payloads, per-chart PNGs,
//! and the combined document all go through `FileStore`. Overlay assets live in
//! a second, read-only store.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::AppError;

pub trait FileStore {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<(), AppError>;
    /// `Ok(None)` when the entry does not exist.
    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, AppError>;
    fn exists(&self, name: &str) -> bool;
    /// Deleting a missing entry is not an error.
    fn delete(&self, name: &str) -> Result<(), AppError>;
    /// Entry names, sorted.
    fn list(&self) -> Result<Vec<String>, AppError>;
}

/// Flat directory of files; entry names are plain file names.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
    read_only: bool,
}

impl DirStore {
    /// Writable store; the directory is created if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            AppError::new(2, format!("Failed to create store directory '{}': {e}", root.display()))
        })?;
        Ok(Self {
            root,
            read_only: false,
        })
    }

    /// Read-only store over a pre-populated directory. A missing directory reads as empty.
    pub fn read_only(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            read_only: true,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, name: &str) -> Result<PathBuf, AppError> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if !valid {
            return Err(AppError::new(2, format!("Invalid store entry name '{name}'.")));
        }
        Ok(self.root.join(name))
    }

    fn ensure_writable(&self, name: &str) -> Result<(), AppError> {
        if self.read_only {
            return Err(AppError::new(
                2,
                format!("Store '{}' is read-only (entry '{name}').", self.root.display()),
            ));
        }
        Ok(())
    }
}

impl FileStore for DirStore {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<(), AppError> {
        self.ensure_writable(name)?;
        let path = self.entry_path(name)?;
        // Write beside the target and rename so readers never see a partial file.
        let partial = self.root.join(format!(".{name}.partial"));
        fs::write(&partial, bytes)
            .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", partial.display())))?;
        fs::rename(&partial, &path)
            .map_err(|e| AppError::new(2, format!("Failed to move '{}' into place: {e}", path.display())))
    }

    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, AppError> {
        let path = self.entry_path(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::new(2, format!("Failed to read '{}': {e}", path.display()))),
        }
    }

    fn exists(&self, name: &str) -> bool {
        self.entry_path(name).map(|path| path.is_file()).unwrap_or(false)
    }

    fn delete(&self, name: &str) -> Result<(), AppError> {
        self.ensure_writable(name)?;
        let path = self.entry_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::new(2, format!("Failed to delete '{}': {e}", path.display()))),
        }
    }

    fn list(&self) -> Result<Vec<String>, AppError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::new(
                    2,
                    format!("Failed to list '{}': {e}", self.root.display()),
                ));
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| AppError::new(2, format!("Failed to list '{}': {e}", self.root.display())))?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// In-memory store backing the pipeline and resolver tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, name: &str, bytes: Vec<u8>) -> Self {
        self.entries.borrow_mut().insert(name.to_string(), bytes);
        self
    }
}

impl FileStore for MemoryStore {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<(), AppError> {
        self.entries
            .borrow_mut()
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, AppError> {
        Ok(self.entries.borrow().get(name).cloned())
    }

    fn exists(&self, name: &str) -> bool {
        self.entries.borrow().contains_key(name)
    }

    fn delete(&self, name: &str) -> Result<(), AppError> {
        self.entries.borrow_mut().remove(name);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, AppError> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}

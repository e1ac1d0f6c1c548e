//! Template Store - Document And Markup Side By Side
//!
//! A saved template is two files in one directory: `<name>.json` holds the
//! document, `<name>.mjml` the markup compiled from it. Loading returns the
//! raw JSON value; it goes back through the validator like any other input.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::pipeline::CompiledTemplate;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid template name: {0:?}")]
    InvalidName(String),

    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPaths {
    pub json: PathBuf,
    pub mjml: PathBuf,
}

pub struct TemplateStore {
    dir: PathBuf,
}

fn check_name(name: &str) -> Result<(), StoreError> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

impl TemplateStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn paths(&self, name: &str) -> SavedPaths {
        SavedPaths {
            json: self.dir.join(format!("{}.json", name)),
            mjml: self.dir.join(format!("{}.mjml", name)),
        }
    }

    pub fn save(&self, name: &str, compiled: &CompiledTemplate) -> Result<SavedPaths, StoreError> {
        check_name(name)?;
        let paths = self.paths(name);

        let json = serde_json::to_string_pretty(&compiled.template)?;
        fs::write(&paths.json, json)?;
        fs::write(&paths.mjml, &compiled.mjml)?;

        tracing::info!(name, hash = %compiled.document_hash, "template saved");
        Ok(paths)
    }

    pub fn load(&self, name: &str) -> Result<Value, StoreError> {
        check_name(name)?;
        let path = self.paths(name).json;
        if !path.exists() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_markup(&self, name: &str) -> Result<String, StoreError> {
        check_name(name)?;
        let path = self.paths(name).mjml;
        if !path.exists() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Ok(fs::read_to_string(path)?)
    }

    /// Names of saved templates, sorted
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names = vec![];
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

//! Register catalog: maps register ids to value kinds and descriptions.
//!
//! The inverter itself is catalog-agnostic; which id means what is shipped as
//! a YAML descriptor file, one entry per register:
//!
//! ```yaml
//! - id: 1074725211
//!   kind: float
//!   description: Battery voltage
//! - id: 1349525536
//!   kind: string
//!   description: Device name
//! ```
//!
//! Unrecognized `kind` tags deserialize to [`ValueKind::Unknown`], so a newer
//! catalog file keeps working against an older build; the payload of such
//! registers is printed undecoded.

use crate::value::ValueKind;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Errors raised while loading a catalog.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("cannot read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// One catalog entry: which register, how to decode it, what to call it.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterDescriptor {
    /// The 4-byte register id sent on the wire.
    pub id: u32,
    /// Declared value kind, used by [`crate::value::convert`].
    pub kind: ValueKind,
    /// Human-readable register name for console output.
    pub description: String,
}

/// An ordered collection of register descriptors.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<RegisterDescriptor>,
}

impl Catalog {
    /// Loads a catalog from a YAML descriptor file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parses a catalog from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self, Error> {
        let entries: Vec<RegisterDescriptor> = serde_yaml::from_str(content)?;
        Ok(Self { entries })
    }

    /// Looks up a descriptor by its zero-based position in the file.
    pub fn by_index(&self, index: usize) -> Option<&RegisterDescriptor> {
        self.entries.get(index)
    }

    /// Looks up a descriptor by register id.
    pub fn by_id(&self, id: u32) -> Option<&RegisterDescriptor> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Iterates the descriptors in file order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisterDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

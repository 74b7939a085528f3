//! JSON manifest describing which image files go into a bundle.
//!
//! A [`IconManifest`] lists `(id, path)` pairs in bundle order plus the output
//! file name. Paths are relative to the manifest's directory.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "output": "icons.mod",
//!   "icons": [
//!     { "id": 0, "path": "start.png" },
//!     { "id": 1, "path": "term.png" }
//!   ]
//! }
//! ```
//!
//! # Example
//!
//! ```
//! use icon_bundle::IconManifest;
//!
//! let manifest = IconManifest::new()
//!     .with_icon(0, "start.png")
//!     .with_icon(1, "term.png");
//!
//! let json = manifest.to_json().unwrap();
//! let restored = IconManifest::from_json(&json).unwrap();
//! assert_eq!(restored.icons.len(), 2);
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::BundleError;
use crate::icon::{IconId, IconImage, IconSet};
use crate::reader::Bundle;

/// Default bundle file name.
pub const DEFAULT_OUTPUT: &str = "icons.mod";

/// Errors from loading manifests, decoding images and bundle file I/O.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("failed to read or write {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error(transparent)]
    Bundle(#[from] BundleError),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PackError {
    move |source| PackError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// ============================================================================
// Manifest Types
// ============================================================================

/// One icon in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct ManifestEntry {
    /// Id the icon is looked up by.
    pub id: IconId,

    /// Image file, relative to the manifest directory. Any format the
    /// `image` crate can decode.
    pub path: PathBuf,
}

/// The list of icons to pack and where to write the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct IconManifest {
    /// Bundle file to write, relative to the manifest directory.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Icons in bundle order.
    #[serde(default)]
    pub icons: Vec<ManifestEntry>,
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}

impl Default for IconManifest {
    fn default() -> Self {
        Self {
            output: default_output(),
            icons: Vec::new(),
        }
    }
}

impl IconManifest {
    /// Creates an empty manifest writing to [`DEFAULT_OUTPUT`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an icon.
    pub fn with_icon(mut self, id: IconId, path: impl Into<PathBuf>) -> Self {
        self.icons.push(ManifestEntry {
            id,
            path: path.into(),
        });
        self
    }

    /// Sets the output file.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Serializes the manifest to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the manifest to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PackError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(io_error(path))?;
        Ok(Self::from_json(&json)?)
    }

    /// First id that appears more than once.
    pub fn duplicate_id(&self) -> Option<IconId> {
        let mut seen = HashSet::new();
        self.icons.iter().map(|e| e.id).find(|id| !seen.insert(*id))
    }

    /// Decodes every listed image into RGBA8, resolving paths against
    /// `base_dir`.
    ///
    /// Duplicate ids are rejected before any file is opened.
    pub fn resolve(&self, base_dir: impl AsRef<Path>) -> Result<IconSet, PackError> {
        if let Some(id) = self.duplicate_id() {
            return Err(BundleError::DuplicateId(id).into());
        }

        let base_dir = base_dir.as_ref();
        let mut set = IconSet::new();
        for entry in &self.icons {
            let path = base_dir.join(&entry.path);
            let decoded = image::open(&path).map_err(|source| PackError::Decode {
                path: path.clone(),
                source,
            })?;
            let image = IconImage::from_rgba(decoded.to_rgba8());
            tracing::trace!(
                id = entry.id,
                width = image.width,
                height = image.height,
                path = %path.display(),
                "decoded icon"
            );
            set.add_icon(entry.id, image);
        }
        Ok(set)
    }

    /// Decodes the listed images and encodes them into bundle bytes.
    pub fn pack(&self, base_dir: impl AsRef<Path>) -> Result<Vec<u8>, PackError> {
        let set = self.resolve(base_dir)?;
        Ok(set.encode()?)
    }

    /// Packs the manifest and writes the bundle to [`output`](Self::output)
    /// under `base_dir`. Returns the written path.
    pub fn pack_to_file(&self, base_dir: impl AsRef<Path>) -> Result<PathBuf, PackError> {
        let base_dir = base_dir.as_ref();
        let bytes = self.pack(base_dir)?;
        let out = base_dir.join(&self.output);
        fs::write(&out, &bytes).map_err(io_error(&out))?;
        tracing::info!(
            icons = self.icons.len(),
            bytes = bytes.len(),
            path = %out.display(),
            "wrote icon bundle"
        );
        Ok(out)
    }
}

// ============================================================================
// Bundle File Helpers
// ============================================================================

/// Encodes `icons` and writes the bundle to `path`.
///
/// Nothing is written if encoding fails.
pub fn write_bundle(path: impl AsRef<Path>, icons: &IconSet) -> Result<(), PackError> {
    let path = path.as_ref();
    let bytes = icons.encode()?;
    fs::write(path, &bytes).map_err(io_error(path))?;
    tracing::info!(icons = icons.len(), bytes = bytes.len(), path = %path.display(), "wrote icon bundle");
    Ok(())
}

/// Reads and validates a bundle file.
pub fn read_bundle(path: impl AsRef<Path>) -> Result<Bundle<Vec<u8>>, PackError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(io_error(path))?;
    Ok(Bundle::open(bytes)?)
}

// ============================================================================
// Tests
// ============================================================================

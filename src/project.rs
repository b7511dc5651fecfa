//! Project identity and on-disk store layout.
//!
//! Every sketch gets its own store directory under the working directory,
//! named by a digest of the absolute sketch path so that two sketches (or
//! the same sketch opened from two checkouts) never share history.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{AmError, Result};

/// Filename of the serialized version index inside the store directory.
pub const INDEX_FILE: &str = "index.json";

/// A resolved project: the sketch being tuned and its store directory.
#[derive(Debug, Clone)]
pub struct Project {
    /// Sketch path as given on the command line, extension normalized.
    pub sketch_path: PathBuf,
    /// Stable hex identifier derived from the working dir and sketch path.
    pub id: String,
    /// Store directory holding the index, version images, and artifacts.
    pub store_dir: PathBuf,
}

impl Project {
    /// Resolve a project from a sketch path relative to `working_dir`.
    ///
    /// Creates the store directory if it does not exist yet.
    pub fn resolve(working_dir: &Path, sketch: &str) -> Result<Self> {
        let sketch_path = normalize_sketch_path(sketch);
        let id = project_id(working_dir, &sketch_path);
        let store_dir = working_dir.join(format!(".automuse-{id}"));

        if !store_dir.exists() {
            std::fs::create_dir_all(&store_dir).map_err(|e| AmError::Persistence {
                path: store_dir.display().to_string(),
                reason: format!("failed to create store directory: {e}"),
            })?;
            info!(store = %store_dir.display(), "Created project store");
        } else {
            debug!(store = %store_dir.display(), "Using existing project store");
        }

        Ok(Self {
            sketch_path,
            id,
            store_dir,
        })
    }

    /// Path to the version index file.
    pub fn index_path(&self) -> PathBuf {
        self.store_dir.join(INDEX_FILE)
    }
}

/// Append a `.js` extension when the sketch path has no `.js`/`.jsx` suffix.
pub fn normalize_sketch_path(sketch: &str) -> PathBuf {
    let lower = sketch.to_ascii_lowercase();
    if lower.ends_with(".js") || lower.ends_with(".jsx") {
        PathBuf::from(sketch)
    } else {
        PathBuf::from(format!("{sketch}.js"))
    }
}

/// Hex digest identifying a project, stable across runs.
///
/// Truncated to 32 hex chars; the digest only needs to avoid collisions
/// between a handful of sketches in one working tree.
pub fn project_id(working_dir: &Path, sketch_path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(working_dir.to_string_lossy().as_bytes());
    hasher.update(b"/");
    hasher.update(sketch_path.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..16])
}

//! On-disk version index operations.
//!
//! The index is one JSON array mirroring the in-memory collection. Every
//! mutation rewrites the file before returning, and rolls back the
//! in-memory state when the rewrite fails.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use super::schema::{Version, timestamp_token};
use crate::error::{AmError, Result};
use crate::project::INDEX_FILE;

/// Persisted collection of version records for one project.
#[derive(Debug)]
pub struct VersionStore {
    store_dir: PathBuf,
    index_path: PathBuf,
    versions: Vec<Version>,
}

impl VersionStore {
    /// Opens the store rooted at `store_dir`, loading the existing index.
    ///
    /// A missing index file means a fresh project and yields an empty
    /// collection. A present but unreadable or unparseable index is a hard
    /// error: silently starting empty would discard the user's history on
    /// the next flush.
    #[instrument(skip_all, fields(store = %store_dir.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(store_dir: P) -> Result<Self> {
        let store_dir = store_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&store_dir).map_err(|e| AmError::Persistence {
            path: store_dir.display().to_string(),
            reason: format!("failed to create store directory: {e}"),
        })?;

        let index_path = store_dir.join(INDEX_FILE);
        let versions = if index_path.exists() {
            let bytes = std::fs::read(&index_path).map_err(|e| AmError::Persistence {
                path: index_path.display().to_string(),
                reason: format!("failed to read index: {e}"),
            })?;
            serde_json::from_slice(&bytes).map_err(|e| AmError::Persistence {
                path: index_path.display().to_string(),
                reason: format!("failed to parse index: {e}"),
            })?
        } else {
            Vec::new()
        };

        info!(
            store = %store_dir.display(),
            versions = versions.len(),
            "Version store ready"
        );
        Ok(Self {
            store_dir,
            index_path,
            versions,
        })
    }

    /// Directory holding the index, version images, and export artifacts.
    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    /// Saves a new version and returns the full updated list.
    ///
    /// The image bytes are decode-validated before anything is written, so
    /// a malformed capture never leaves a partial record behind. A failed
    /// index flush removes both the in-memory record and the image file
    /// written for it.
    #[instrument(skip_all, fields(parent = parent_id.as_deref().unwrap_or("-")))]
    pub fn create(
        &mut self,
        parent_id: Option<String>,
        image_bytes: &[u8],
        config: serde_json::Value,
        revision: Option<String>,
    ) -> Result<Vec<Version>> {
        image::load_from_memory(image_bytes).map_err(|e| AmError::Decode(e.to_string()))?;

        let id = self.allocate_id();
        let image = Version::image_name(&id);
        let image_path = self.store_dir.join(&image);

        std::fs::write(&image_path, image_bytes).map_err(|e| AmError::Persistence {
            path: image_path.display().to_string(),
            reason: format!("failed to write version image: {e}"),
        })?;

        self.versions.push(Version {
            id: id.clone(),
            parent_id,
            image,
            config,
            revision,
        });

        if let Err(e) = self.flush() {
            // Roll back so the in-memory and on-disk views stay in sync.
            self.versions.pop();
            if let Err(rm) = std::fs::remove_file(&image_path) {
                warn!(path = %image_path.display(), error = %rm, "Failed to remove image after flush failure");
            }
            return Err(e);
        }

        info!(id = %id, versions = self.versions.len(), "Version saved");
        Ok(self.list())
    }

    /// Deletes a version, reattaching its children to `replacement_parent_id`,
    /// and returns the full updated list.
    ///
    /// Children are re-linked even when `id` matches no record; deleting an
    /// unknown id is an idempotent no-op with respect to removal. Survivor
    /// order is preserved, since stored order drives the history display.
    #[instrument(skip(self))]
    pub fn delete(
        &mut self,
        id: &str,
        replacement_parent_id: Option<String>,
    ) -> Result<Vec<Version>> {
        let before = self.versions.clone();

        let mut remove_at = None;
        for (i, version) in self.versions.iter_mut().enumerate() {
            if version.id == id {
                remove_at = Some(i);
                continue;
            }
            if version.parent_id.as_deref() == Some(id) {
                version.parent_id = replacement_parent_id.clone();
            }
        }

        if let Some(i) = remove_at {
            self.versions.remove(i);
        } else {
            debug!(id, "Version not found for deletion, re-link only");
        }

        if let Err(e) = self.flush() {
            self.versions = before;
            return Err(e);
        }

        info!(id, versions = self.versions.len(), "Version deleted");
        Ok(self.list())
    }

    /// Returns the full current collection in stored order.
    pub fn list(&self) -> Vec<Version> {
        self.versions.clone()
    }

    /// Allocates a fresh id unique across the store lifetime.
    ///
    /// Millisecond timestamps collide under rapid saves; a numeric suffix
    /// keeps the id unique while still sorting after its base.
    fn allocate_id(&self) -> String {
        let base = timestamp_token();
        if !self.contains(&base) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{base}-{n}");
            if !self.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.versions.iter().any(|v| v.id == id)
    }

    /// Rewrites the whole index file from the in-memory collection.
    fn flush(&self) -> Result<()> {
        let bytes =
            serde_json::to_vec(&self.versions).map_err(|e| AmError::Persistence {
                path: self.index_path.display().to_string(),
                reason: format!("failed to serialize index: {e}"),
            })?;
        std::fs::write(&self.index_path, bytes).map_err(|e| AmError::Persistence {
            path: self.index_path.display().to_string(),
            reason: format!("failed to write index: {e}"),
        })
    }
}

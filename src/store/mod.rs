//! Version history storage for sketch configurations.
//!
//! Each saved version pairs an opaque configuration blob with a PNG
//! snapshot of the canvas and an optional parent link, forming a forest
//! of tuning history. The whole collection is mirrored to a single JSON
//! index file inside the project store directory.
//!
//! # Directory Structure
//!
//! ```text
//! .automuse-<project-id>/
//! ├── index.json                      # serialized version collection
//! ├── 20260830T120501.123Z.png        # one canvas snapshot per version
//! └── seed-20260830T121010.456Z.mp4   # export artifacts (see export module)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use automuse::store::VersionStore;
//!
//! let mut store = VersionStore::open(&store_dir)?;
//! let versions = store.create(None, &png_bytes, config, revision)?;
//! let versions = store.delete(&versions[0].id, None)?;
//! ```
//!
//! Mutations are read-modify-write-flush: the index file is rewritten
//! before the call returns, and a failed flush rolls the in-memory
//! collection back so both views stay in lockstep. Callers hosting the
//! store in a concurrent environment wrap it in a single coarse mutex.

mod index;
mod schema;

pub use index::VersionStore;
pub use schema::{Version, timestamp_token};

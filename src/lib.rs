//! automuse library - version history and frame export for parametric sketches.
//!
//! The sketch itself runs in the browser; this crate owns everything with
//! real state: the persisted version history, the frame-export pipeline,
//! and the HTTP surface the client talks to.
//!
//! # Modules
//!
//! - `store`: Persisted version history (JSON index + PNG per version)
//! - `export`: Frame-sequence export to png/zip/gif/mp4
//! - `server`: axum API and static serving of the store directory
//! - `project`: Store directory identity per sketch
//! - `revision`: git provenance for saved versions
//! - `error`: Error taxonomy shared across operations
#![forbid(unsafe_code)]

pub mod cli;
pub mod error;
pub mod export;
pub mod logging;
pub mod project;
pub mod revision;
pub mod server;
pub mod store;

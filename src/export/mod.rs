//! Frame-capture export pipeline.
//!
//! Turns a client-ordered sequence of captured frames into one artifact
//! file in the project store: a single PNG, a ZIP of PNGs, an animated
//! GIF, or an MP4 video. Frames are materialized into an isolated scratch
//! directory with zero-padded numeric names so that every downstream tool
//! that sorts by filename reconstructs the exact input order; the scratch
//! area is discarded whether or not encoding succeeds.

mod encoder;

pub use encoder::{Encoder, SystemEncoder, is_ffmpeg_on_path};

use std::path::PathBuf;

use tracing::{info, instrument, warn};

use crate::error::{AmError, Result};
use crate::store::timestamp_token;

/// Default playback rate when a render request omits one.
pub const DEFAULT_FPS: u32 = 30;

/// Minimum zero-pad width for numbered frame files.
const MIN_FRAME_PAD: usize = 5;

/// Requested output container for an export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Single still image, or a ZIP archive when more than one frame is sent.
    Png,
    /// Animated GIF.
    Gif,
    /// H.264 MP4 video.
    Mp4,
}

impl ExportFormat {
    /// Parses the wire format value; unknown values are rejected before
    /// any frame is materialized.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "png" => Ok(Self::Png),
            "gif" => Ok(Self::Gif),
            "mp4" => Ok(Self::Mp4),
            other => Err(AmError::InvalidInput(format!(
                "unknown export format '{other}' (expected png, gif, or mp4)"
            ))),
        }
    }
}

/// Converts captured frame sequences into artifacts in the store directory.
///
/// The pipeline keeps no state between calls; each export gets its own
/// uniquely-named scratch directory, so concurrent exports never collide.
pub struct ExportPipeline {
    store_dir: PathBuf,
    encoder: Box<dyn Encoder + Send + Sync>,
}

impl ExportPipeline {
    /// Pipeline writing artifacts into `store_dir`, encoding with the
    /// system ffmpeg.
    pub fn new(store_dir: PathBuf) -> Self {
        Self::with_encoder(store_dir, Box::new(SystemEncoder))
    }

    /// Pipeline with a custom encoding backend.
    pub fn with_encoder(store_dir: PathBuf, encoder: Box<dyn Encoder + Send + Sync>) -> Self {
        Self { store_dir, encoder }
    }

    /// Exports `frames` (order-significant raw PNG bytes) as `format`,
    /// returning the artifact filename relative to the store directory.
    ///
    /// `id` is a caller-supplied label folded into the artifact name for
    /// traceability back to a version.
    #[instrument(skip(self, frames), fields(frames = frames.len()))]
    pub fn export(
        &self,
        frames: &[Vec<u8>],
        format: ExportFormat,
        id: &str,
        fps: Option<u32>,
    ) -> Result<String> {
        if frames.is_empty() {
            return Err(AmError::InvalidInput("no frames to export".to_string()));
        }
        validate_label(id)?;

        let scratch = tempfile::Builder::new()
            .prefix("automuse")
            .tempdir()
            .map_err(|e| AmError::Encode(format!("failed to create scratch directory: {e}")))?;

        // Pad wide enough that lexicographic order always equals numeric
        // order, whatever the frame count.
        let pad = frame_pad(frames.len());
        let mut frame_paths = Vec::with_capacity(frames.len());
        for (i, frame) in frames.iter().enumerate() {
            let path = scratch.path().join(format!("{i:0pad$}.png"));
            std::fs::write(&path, frame)?;
            frame_paths.push(path);
        }

        let fps = fps.unwrap_or(DEFAULT_FPS);
        let ext = match format {
            ExportFormat::Png if frames.len() == 1 => "png",
            ExportFormat::Png => "zip",
            ExportFormat::Gif => "gif",
            ExportFormat::Mp4 => "mp4",
        };
        let (artifact, dest) = self.unique_artifact(id, &timestamp_token(), ext);

        let encoded = match format {
            ExportFormat::Png if frames.len() == 1 => {
                self.encoder.encode_still(&frame_paths[0], &dest)
            }
            ExportFormat::Png => self.encoder.encode_archive(&frame_paths, &dest),
            ExportFormat::Gif => self.encoder.encode_animated(scratch.path(), pad, fps, &dest),
            ExportFormat::Mp4 => self.encoder.encode_video(scratch.path(), pad, fps, &dest),
        };

        // Scratch cleanup happens on drop regardless; a failed encode must
        // also leave no orphaned artifact behind.
        if let Err(e) = encoded {
            if dest.exists() {
                if let Err(rm) = std::fs::remove_file(&dest) {
                    warn!(path = %dest.display(), error = %rm, "Failed to remove partial artifact");
                }
            }
            return Err(e);
        }

        info!(artifact = %artifact, frames = frames.len(), fps, "Export complete");
        Ok(artifact)
    }

    /// Artifact name not yet present in the store directory.
    ///
    /// Millisecond timestamps collide when the same version is exported
    /// twice in quick succession; a numeric suffix keeps the second
    /// artifact from overwriting the first.
    fn unique_artifact(&self, id: &str, token: &str, ext: &str) -> (String, PathBuf) {
        let base = format!("{id}-{token}.{ext}");
        let dest = self.store_dir.join(&base);
        if !dest.exists() {
            return (base, dest);
        }
        let mut n = 1;
        loop {
            let candidate = format!("{id}-{token}-{n}.{ext}");
            let dest = self.store_dir.join(&candidate);
            if !dest.exists() {
                return (candidate, dest);
            }
            n += 1;
        }
    }
}

/// Zero-pad width for `count` frames.
fn frame_pad(count: usize) -> usize {
    MIN_FRAME_PAD.max(count.to_string().len())
}

/// Rejects labels that would escape the store directory or produce an
/// unusable filename.
fn validate_label(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(AmError::InvalidInput("export id must not be empty".to_string()));
    }
    if id.contains(['/', '\\']) || id.contains("..") {
        return Err(AmError::InvalidInput(format!(
            "export id '{id}' must not contain path separators"
        )));
    }
    Ok(())
}

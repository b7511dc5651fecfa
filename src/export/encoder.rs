//! Frame-sequence encoders behind a pluggable trait.
//!
//! The production [`SystemEncoder`] shells out to the host `ffmpeg` for
//! animated/video output and uses the `zip` crate for archives, avoiding
//! native codec build dependencies.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, instrument};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{AmError, Result};

/// Encoding backend for the export pipeline.
///
/// Inputs are the numbered frame files materialized in a scratch
/// directory; each operation produces exactly one destination file.
pub trait Encoder {
    /// Copy a single frame to the destination still image.
    fn encode_still(&self, frame: &Path, dest: &Path) -> Result<()>;

    /// Archive all frames into one compressed container.
    fn encode_archive(&self, frames: &[PathBuf], dest: &Path) -> Result<()>;

    /// Encode the numbered frames under `frames_dir` into an animated image.
    fn encode_animated(&self, frames_dir: &Path, pad: usize, fps: u32, dest: &Path) -> Result<()>;

    /// Encode the numbered frames under `frames_dir` into a video.
    fn encode_video(&self, frames_dir: &Path, pad: usize, fps: u32, dest: &Path) -> Result<()>;
}

/// Encoder backed by the system `ffmpeg` binary and the `zip` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEncoder;

impl SystemEncoder {
    /// ffmpeg input pattern matching the pipeline's zero-padded frame names.
    fn frame_pattern(frames_dir: &Path, pad: usize) -> PathBuf {
        frames_dir.join(format!("%0{pad}d.png"))
    }

    #[instrument(skip(self), fields(dest = %dest.display()))]
    fn run_ffmpeg(&self, input_args: &[String], codec_args: &[&str], dest: &Path) -> Result<()> {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-loglevel", "error"])
            .args(input_args)
            .args(codec_args)
            .arg(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        debug!(?cmd, "Invoking ffmpeg");
        let output = cmd.output().map_err(|e| {
            AmError::Encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AmError::Encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl Encoder for SystemEncoder {
    fn encode_still(&self, frame: &Path, dest: &Path) -> Result<()> {
        std::fs::copy(frame, dest).map_err(|e| {
            AmError::Encode(format!(
                "failed to copy frame to {}: {e}",
                dest.display()
            ))
        })?;
        Ok(())
    }

    fn encode_archive(&self, frames: &[PathBuf], dest: &Path) -> Result<()> {
        let file = std::fs::File::create(dest)
            .map_err(|e| AmError::Encode(format!("failed to create {}: {e}", dest.display())))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        for frame in frames {
            let name = frame
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| AmError::Encode(format!("bad frame path: {}", frame.display())))?;
            let bytes = std::fs::read(frame)
                .map_err(|e| AmError::Encode(format!("failed to read frame {name}: {e}")))?;
            zip.start_file(name, options)
                .map_err(|e| AmError::Encode(format!("failed to add {name} to archive: {e}")))?;
            zip.write_all(&bytes)
                .map_err(|e| AmError::Encode(format!("failed to write {name} to archive: {e}")))?;
        }

        zip.finish()
            .map_err(|e| AmError::Encode(format!("failed to finish archive: {e}")))?;
        Ok(())
    }

    fn encode_animated(&self, frames_dir: &Path, pad: usize, fps: u32, dest: &Path) -> Result<()> {
        let pattern = Self::frame_pattern(frames_dir, pad);
        let input = vec![
            "-framerate".to_string(),
            fps.to_string(),
            "-i".to_string(),
            pattern.display().to_string(),
        ];
        self.run_ffmpeg(&input, &[], dest)
    }

    fn encode_video(&self, frames_dir: &Path, pad: usize, fps: u32, dest: &Path) -> Result<()> {
        let pattern = Self::frame_pattern(frames_dir, pad);
        let input = vec![
            "-framerate".to_string(),
            fps.to_string(),
            "-i".to_string(),
            pattern.display().to_string(),
        ];
        // yuv420p + crf 18 for broad playback compatibility at high quality.
        self.run_ffmpeg(
            &input,
            &["-c:v", "libx264", "-pix_fmt", "yuv420p", "-crf", "18"],
            dest,
        )
    }
}

/// Whether a usable `ffmpeg` binary is reachable on PATH.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

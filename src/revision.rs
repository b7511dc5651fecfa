//! Source-control provenance for saved versions.
//!
//! Each saved version records the short git revision of the sketch's
//! working tree so a result can be traced back to the code that drew it.

use std::path::Path;
use std::process::Command;

use tracing::debug;

/// Short git revision of `dir`, or `None` when git is unavailable or the
/// directory is not a repository.
pub fn current_revision(dir: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .current_dir(dir)
        .output()
        .ok()?;

    if !output.status.success() {
        debug!(status = %output.status, "git rev-parse failed, omitting revision");
        return None;
    }

    let rev = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if rev.is_empty() { None } else { Some(rev) }
}

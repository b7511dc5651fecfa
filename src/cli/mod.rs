//! CLI argument definitions.

use clap::Parser;

/// automuse - local dev server for tuning parametric sketches.
///
/// Serves the sketch with live-editable configuration, keeps a version
/// history of saved configurations, and exports captured frames to
/// png/zip/gif/mp4.
#[derive(Parser, Debug)]
#[command(name = "automuse", version, about, long_about = None)]
pub struct Cli {
    /// Path to the sketch file to tune (".js" is appended when no
    /// .js/.jsx extension is given)
    pub sketch: String,

    /// Port to listen on
    #[arg(long, short = 'p', default_value = "1234", env = "AUTOMUSE_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: String,

    /// Verbose output (repeat for more detail)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

//! automuse - local dev server for tuning parametric sketches.
#![forbid(unsafe_code)]

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use automuse::cli::Cli;
use automuse::error::Result;
use automuse::export::{ExportPipeline, is_ffmpeg_on_path};
use automuse::logging;
use automuse::project::Project;
use automuse::server::{self, AppState};
use automuse::store::VersionStore;

/// Build information embedded at compile time.
mod build_info {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub fn git_sha() -> &'static str {
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(&cli).await {
        eprintln!("error: {e}");
        if let Some(hint) = e.suggestion() {
            eprintln!("hint: {hint}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    info!(
        version = build_info::VERSION,
        sha = build_info::git_sha(),
        "automuse starting"
    );

    let working_dir = std::env::current_dir()?;
    let project = Project::resolve(&working_dir, &cli.sketch)?;
    info!(
        sketch = %project.sketch_path.display(),
        store = %project.store_dir.display(),
        "Project resolved"
    );

    if !is_ffmpeg_on_path() {
        tracing::warn!("ffmpeg not found on PATH; gif/mp4 export will fail");
    }

    let store = VersionStore::open(&project.store_dir)?;
    let pipeline = ExportPipeline::new(project.store_dir.clone());
    let public_url = format!("http://localhost:{}/", cli.port);

    let state = Arc::new(AppState::new(store, pipeline, working_dir, public_url));
    server::run(state, &cli.bind, cli.port).await
}

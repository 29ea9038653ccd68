mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod workflow;

use std::sync::Arc;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::config::{HookConfig, Settings};
use crate::context::HookContext;
use crate::error::AppResult;
use crate::infra::api::DocstringClient;
use crate::infra::git::GitCli;
use crate::workflow::post_merge::{self, PostMergeOutcome};

/// Set to any value to post to the local development endpoint.
const DEV_MODE_ENV: &str = "DOCSTRING_DEV";
/// Set to any value to keep the historical accumulator-based marker check.
const LEGACY_FILTER_ENV: &str = "DOCSTRING_LEGACY_FILTER";

#[derive(Parser)]
#[command(
    name = "docstring-githook",
    version,
    about = "Uploads files changed by a merge on the default branch to Docstring"
)]
struct Cli {
    /// Enable debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run().await {
        error!("{err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> AppResult<()> {
    let workspace_root = std::env::current_dir()?;
    let config = HookConfig::load()?;

    // Environment is consulted exactly once; everything downstream works
    // from Settings.
    let dev_mode = std::env::var_os(DEV_MODE_ENV).is_some();
    let legacy_filter = std::env::var_os(LEGACY_FILTER_ENV).is_some();
    let settings = Settings::new(config, workspace_root, dev_mode, legacy_filter);

    let git = Arc::new(GitCli::new(settings.workspace_root.clone()));
    let uploader = Arc::new(DocstringClient::new(
        settings.endpoint.clone(),
        settings.api_key.clone(),
        settings.timeout,
    )?);
    let context = HookContext::new(settings, git, uploader);

    match post_merge::run(&context).await? {
        PostMergeOutcome::Skipped => {}
        PostMergeOutcome::Uploaded {
            branch,
            commit,
            files,
        } => {
            println!("Uploaded {files} changed file(s) from merge {commit} on {branch}.");
        }
    }

    Ok(())
}

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use next_data_loader_codemod::runner::{self, RunOptions};
use next_data_loader_codemod::{Repomod, RepomodState, BUILD_LEGACY_CTX_UTIL_ABSOLUTE_PATH};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "next-data-loader-codemod")]
#[command(about = "Move pages-router data fetching into app-router data loaders", long_about = None)]
struct Cli {
    /// Project root to migrate
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Options object, as JSON
    #[arg(long, value_name = "JSON")]
    options: Option<String>,

    /// Where to write the buildLegacyCtx helper module (overrides --options)
    #[arg(long, value_name = "PATH")]
    build_legacy_ctx_util_path: Option<String>,

    /// JSON file holding the migration step, read before and written after
    /// the run
    #[arg(long, value_name = "FILE")]
    state: Option<PathBuf>,

    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,
}

fn load_state(path: &Path) -> Result<Option<RepomodState>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let state = RepomodState::from_json(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(state))
}

fn save_state(path: &Path, state: &RepomodState) -> Result<()> {
    let text = state.to_json()?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config: HashMap<String, serde_json::Value> = match &cli.options {
        Some(json) => serde_json::from_str(json).context("--options must be a JSON object")?,
        None => HashMap::new(),
    };
    if let Some(path) = cli.build_legacy_ctx_util_path {
        config.insert(
            BUILD_LEGACY_CTX_UTIL_ABSOLUTE_PATH.to_string(),
            serde_json::Value::String(path),
        );
    }

    let previous = match &cli.state {
        Some(path) => load_state(path)?,
        None => None,
    };

    let mut repomod = Repomod::new(&config, previous)?;
    let summary = runner::run(&cli.root, &mut repomod, RunOptions { dry_run: cli.dry_run })?;

    tracing::info!(
        written = summary.written.len(),
        unchanged = summary.unchanged.len(),
        "done"
    );

    if let (Some(path), false) = (&cli.state, cli.dry_run) {
        save_state(path, repomod.state())?;
    }

    Ok(())
}

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::repomod::{DataCommand, Repomod};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Compute every rewrite without touching the disk.
    pub dry_run: bool,
}

/// Files a run rewrote (or would have, in a dry run) and files it left alone.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
}

/// Pages under `root` the repomod selects, in file name order.
pub fn discover_pages(root: &Path, repomod: &Repomod) -> Result<Vec<PathBuf>> {
    let mut pages = vec![];

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != "node_modules");

    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            Error::io(path, err.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if repomod.selects(relative) {
            pages.push(entry.into_path());
        }
    }

    Ok(pages)
}

fn read_or_empty(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(Error::io(path, err)),
    }
}

fn write(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| Error::io(parent, err))?;
    }
    fs::write(path, data).map_err(|err| Error::io(path, err))
}

/// Runs `repomod` over every page under `root`.
pub fn run(root: &Path, repomod: &mut Repomod, options: RunOptions) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for page in discover_pages(root, repomod)? {
        for command in repomod.handle_file(&page) {
            let path = command.path();
            let current = read_or_empty(path)?;

            let data_command = repomod.handle_data(&command, &current);
            match &data_command {
                DataCommand::UpsertData { path, data } if *data != current => {
                    if options.dry_run {
                        tracing::info!(path = %path.display(), "would rewrite");
                    } else {
                        write(path, data)?;
                        tracing::info!(path = %path.display(), "rewrote");
                    }
                    summary.written.push(path.clone());
                }
                _ => {
                    tracing::debug!(path = %path.display(), "unchanged");
                    summary.unchanged.push(path.to_path_buf());
                }
            }

            repomod.acknowledge(&data_command);
        }
    }

    Ok(summary)
}

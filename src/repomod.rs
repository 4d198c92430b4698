//! Project-level driver: which files to visit and the two steps a project
//! goes through.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::options::TransformOptions;
use crate::transform::transform_file;

pub const INCLUDE_PATTERNS: &[&str] = &["**/pages/**/*.{js,jsx,ts,tsx}"];
pub const EXCLUDE_PATTERNS: &[&str] = &["**/node_modules/**", "**/pages/api/**"];

/// Source of the module every rewritten page imports `buildLegacyCtx` from.
pub const BUILD_LEGACY_CTX_UTIL_CONTENT: &str = r#"
import { type ReadonlyHeaders } from "next/dist/server/web/spec-extension/adapters/headers";
import { type ReadonlyRequestCookies } from "next/dist/server/web/spec-extension/adapters/request-cookies";

export const buildLegacyCtx = (headers: ReadonlyHeaders, cookies: ReadonlyRequestCookies, params: Record<string, string | string[] | undefined>, searchParams: Record<string, string | string[]>) => {
	return {
		query: { ...searchParams, ...params },
		params,
		req: { headers, cookies }
	}
}
"#;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepomodStep {
    /// Write the `buildLegacyCtx` helper module.
    #[default]
    AddUtilityFile,
    /// Rewrite the pages.
    AddDataLoaderHooks,
}

/// State persisted between runs over the same project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepomodState {
    pub step: RepomodStep,
}

impl RepomodState {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A file the driver wants rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileCommand {
    UpsertHelper { path: PathBuf },
    UpsertPage { path: PathBuf },
}

impl FileCommand {
    pub fn path(&self) -> &Path {
        match self {
            FileCommand::UpsertHelper { path } | FileCommand::UpsertPage { path } => path,
        }
    }
}

/// What to do with a file once its current text is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataCommand {
    Noop,
    UpsertData { path: PathBuf, data: String },
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// `a/*.{x,y}` becomes `a/*.x` and `a/*.y`. Only one brace group is
/// supported, which is all the selection patterns use.
fn expand_braces(pattern: &str) -> Vec<String> {
    let Some((head, rest)) = pattern.split_once('{') else {
        return vec![pattern.to_string()];
    };
    let Some((alternatives, tail)) = rest.split_once('}') else {
        return vec![pattern.to_string()];
    };

    alternatives
        .split(',')
        .map(|alternative| format!("{head}{alternative}{tail}"))
        .collect()
}

fn compile(patterns: &[&str]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .flat_map(|pattern| expand_braces(pattern))
        .map(|pattern| {
            Pattern::new(&pattern).map_err(|err| Error::Pattern {
                pattern,
                message: err.msg.to_string(),
            })
        })
        .collect()
}

pub struct Repomod {
    options: TransformOptions,
    state: RepomodState,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl Repomod {
    /// Builds the driver from a loosely typed options object. Fails when
    /// `buildLegacyCtxUtilAbsolutePath` is missing or not a string.
    pub fn new(config: &HashMap<String, serde_json::Value>, previous: Option<RepomodState>) -> Result<Self> {
        Self::with_options(TransformOptions::from_config(config)?, previous)
    }

    pub fn with_options(options: TransformOptions, previous: Option<RepomodState>) -> Result<Self> {
        Ok(Self {
            options,
            state: Self::initialize_state(previous),
            include: compile(INCLUDE_PATTERNS)?,
            exclude: compile(EXCLUDE_PATTERNS)?,
        })
    }

    /// A fresh project starts by writing the helper module.
    pub fn initialize_state(previous: Option<RepomodState>) -> RepomodState {
        previous.unwrap_or_default()
    }

    pub fn state(&self) -> &RepomodState {
        &self.state
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    fn helper_path(&self) -> &Path {
        Path::new(&self.options.build_legacy_ctx_util_absolute_path)
    }

    /// Whether a path relative to the project root is a page to migrate.
    pub fn selects(&self, relative: &Path) -> bool {
        let included = self
            .include
            .iter()
            .any(|pattern| pattern.matches_path_with(relative, MATCH_OPTIONS));
        let excluded = self
            .exclude
            .iter()
            .any(|pattern| pattern.matches_path_with(relative, MATCH_OPTIONS));

        included && !excluded
    }

    pub fn handle_file(&self, path: &Path) -> Vec<FileCommand> {
        let mut commands = vec![];

        if self.state.step == RepomodStep::AddUtilityFile {
            commands.push(FileCommand::UpsertHelper {
                path: self.helper_path().to_path_buf(),
            });
        }
        commands.push(FileCommand::UpsertPage {
            path: path.to_path_buf(),
        });

        commands
    }

    /// Decides the new content of the file behind `command`, given its
    /// current text.
    pub fn handle_data(&self, command: &FileCommand, data: &str) -> DataCommand {
        match command {
            FileCommand::UpsertHelper { path } if self.state.step == RepomodStep::AddUtilityFile => {
                DataCommand::UpsertData {
                    path: path.clone(),
                    data: BUILD_LEGACY_CTX_UTIL_CONTENT.to_string(),
                }
            }
            FileCommand::UpsertPage { path } if self.state.step == RepomodStep::AddDataLoaderHooks => {
                let file = path.to_string_lossy();
                match transform_file(&file, data, &self.options) {
                    Ok(Some(data)) => DataCommand::UpsertData {
                        path: path.clone(),
                        data,
                    },
                    Ok(None) => DataCommand::Noop,
                    Err(err) => {
                        tracing::warn!(%err, "skipping page");
                        DataCommand::Noop
                    }
                }
            }
            _ => DataCommand::Noop,
        }
    }

    /// Records that `written` reached the disk. Writing the helper module
    /// moves the project on to rewriting pages.
    pub fn acknowledge(&mut self, written: &DataCommand) {
        let DataCommand::UpsertData { path, .. } = written else {
            return;
        };
        if self.state.step == RepomodStep::AddUtilityFile && path.as_path() == self.helper_path() {
            tracing::info!(path = %path.display(), "helper module written");
            self.state.step = RepomodStep::AddDataLoaderHooks;
        }
    }
}

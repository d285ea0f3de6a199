//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds what every command needs: global flags, the
//! loaded configuration, and the repository root used to turn notebook
//! arguments into repository-relative paths.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use colab_badge_config::config::{BadgeConfig, find_config_file, load_config};
use colab_badge_config::repo_root::{find_git_root, relative_to_root, to_url_path};
use tracing::{debug, warn};

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Whether to produce a JSON report.
    pub json: bool,

    /// Verbose output.
    pub verbose: bool,

    /// Quiet mode: suppress non-essential output.
    pub quiet: bool,

    /// Loaded configuration (defaults if no file was found).
    pub config: BadgeConfig,

    /// The configuration file that was loaded, if any.
    pub config_path: Option<PathBuf>,

    /// Repository root notebook paths are resolved against.
    pub root: Option<PathBuf>,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed global arguments.
    ///
    /// The repository root is resolved as `--root` > config `root` > the git
    /// root enclosing the working directory.
    pub fn from_global_args(global: &GlobalArgs) -> Result<Self> {
        let cwd = env::current_dir().context("failed to determine working directory")?;

        let config_path = match &global.config {
            Some(path) => {
                if !path.is_file() {
                    bail!("config file not found: {}", path.display());
                }
                Some(path.clone())
            }
            None => find_config_file(&cwd),
        };

        let config = match &config_path {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => BadgeConfig::default(),
        };

        let config_root = config_path.as_ref().and_then(|path| {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.root_relative_to(base)
        });

        let root = global
            .root
            .clone()
            .or(config_root)
            .or_else(|| find_git_root(&cwd));

        debug!(
            config = ?config_path,
            root = ?root,
            "resolved runtime context"
        );

        Ok(Self {
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
            config,
            config_path,
            root,
        })
    }

    /// Returns the path of `file` as seen from the repository root, with `/`
    /// separators, ready to be placed in a badge URL.
    ///
    /// Falls back to the path as given when there is no root or the file is
    /// not underneath it.
    pub fn repo_relative_path(&self, file: &Path) -> String {
        if let Some(root) = &self.root {
            if let Some(relative) = relative_to_root(root, file) {
                return to_url_path(&relative);
            }
            if file.exists() {
                warn!(
                    path = %file.display(),
                    root = %root.display(),
                    "notebook is outside the repository root; using the path as given"
                );
            }
        }
        to_url_path(file)
    }
}

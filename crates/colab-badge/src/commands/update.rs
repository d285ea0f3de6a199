//! Default mode and `colab-badge check` -- refresh or verify notebook badges.
//!
//! Each file is an independent unit of work: a failure is recorded in the
//! report and processing moves on to the next file. The run fails at the
//! end if any file failed (or, for `check`, if any file is stale).

use anyhow::{Result, bail};
use colab_badge_core::io::{ProcessMode, process_file};
use colab_badge_core::{BadgeStyle, BadgeTarget};
use tracing::{debug, info, warn};

use crate::cli::UpdateArgs;
use crate::context::RuntimeContext;
use crate::output::{FileReport, FileStatus, RunReport, output_json, print_file_line, print_summary};

/// Badge parameters shared by every file of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeSettings {
    pub repository: String,
    pub branch: String,
    pub style: BadgeStyle,
    pub encode_branch: bool,
}

impl BadgeSettings {
    /// Merges command-line flags over the loaded configuration.
    pub fn resolve(ctx: &RuntimeContext, args: &UpdateArgs) -> Result<Self> {
        let repository = args
            .repo
            .clone()
            .or_else(|| ctx.config.repository.clone())
            .unwrap_or_default();
        if repository.trim().is_empty() {
            bail!("no repository given (use --repo or set `repository` in .colab-badge.yaml)");
        }

        let branch = args
            .branch
            .clone()
            .or_else(|| ctx.config.branch.clone())
            .unwrap_or_default();
        if branch.trim().is_empty() {
            bail!("no branch given (use --branch or set `branch` in .colab-badge.yaml)");
        }

        Ok(Self {
            repository,
            branch,
            style: args.style.or(ctx.config.style).unwrap_or_default(),
            encode_branch: args.encode_branch || ctx.config.encode_branch.unwrap_or(false),
        })
    }

    /// Builds the badge target for one notebook.
    pub fn target_for(&self, file_path: String) -> BadgeTarget {
        BadgeTarget::new(self.repository.clone(), self.branch.clone(), file_path)
            .style(self.style)
            .encode_branch(self.encode_branch)
    }
}

/// Execute the update (or check) run over `args.files`.
pub fn run(ctx: &RuntimeContext, args: &UpdateArgs, mode: ProcessMode) -> Result<()> {
    let settings = BadgeSettings::resolve(ctx, args)?;
    debug!(?settings, config = ?ctx.config_path, "badge settings resolved");

    if args.files.is_empty() {
        info!("no notebooks given, nothing to do");
    }

    let mut report = RunReport::new(mode);
    for file in &args.files {
        if crate::interrupted() {
            warn!(
                remaining = args.files.len() - report.files.len(),
                "interrupted, skipping remaining notebooks"
            );
            break;
        }

        let target = settings.target_for(ctx.repo_relative_path(file));
        let url = target.badge_url();
        info!(path = %file.display(), %url, "processing notebook");

        let entry = match process_file(file, &target, mode) {
            Ok(outcome) => FileReport::ok(file, url, FileStatus::from_outcome(outcome, mode)),
            Err(err) => FileReport::failed(file, url, &err),
        };

        if ctx.json {
            // The JSON report carries the details; keep failures visible on stderr.
            if let Some(reason) = &entry.error {
                eprintln!("Error: {}: {}", entry.path, reason);
            }
        } else {
            print_file_line(ctx, &entry);
        }
        report.push(entry);
    }

    if ctx.json {
        output_json(&report);
    } else {
        print_summary(ctx, &report);
    }

    if report.failed > 0 {
        bail!(
            "{} of {} notebook(s) could not be processed",
            report.failed,
            report.files.len()
        );
    }
    if mode == ProcessMode::Check && report.stale > 0 {
        bail!("{} notebook(s) need a badge update", report.stale);
    }
    Ok(())
}

//! `colab-badge version` -- print the version and the settings a run would use.

use std::path::Path;

use anyhow::Result;
use colab_badge_core::badge::COLAB_GITHUB_URL;
use serde::Serialize;

use crate::context::RuntimeContext;
use crate::output::output_json;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build identifier, set through `COLAB_BADGE_BUILD` at compile time.
const BUILD: &str = match option_env!("COLAB_BADGE_BUILD") {
    Some(b) => b,
    None => "dev",
};

#[derive(Debug, Serialize)]
struct VersionInfo {
    version: &'static str,
    build: &'static str,
    colab_url: &'static str,
    config: Option<String>,
    root: Option<String>,
}

impl VersionInfo {
    fn from_context(ctx: &RuntimeContext) -> Self {
        let display = |path: &Path| path.display().to_string();
        Self {
            version: VERSION,
            build: BUILD,
            colab_url: COLAB_GITHUB_URL,
            config: ctx.config_path.as_deref().map(display),
            root: ctx.root.as_deref().map(display),
        }
    }
}

/// Execute the `colab-badge version` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let info = VersionInfo::from_context(ctx);

    if ctx.json {
        output_json(&info);
        return Ok(());
    }

    println!("colab-badge version {} ({})", info.version, info.build);
    println!("  badges link to {}", info.colab_url);
    println!("  config: {}", info.config.as_deref().unwrap_or("none"));
    println!("  root:   {}", info.root.as_deref().unwrap_or("none"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use colab_badge_config::config::BadgeConfig;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn reports_resolved_config_and_root() {
        let ctx = RuntimeContext {
            json: true,
            verbose: false,
            quiet: false,
            config: BadgeConfig::default(),
            config_path: Some(PathBuf::from("/repo/.colab-badge.yaml")),
            root: Some(PathBuf::from("/repo")),
        };

        let json = serde_json::to_value(VersionInfo::from_context(&ctx)).unwrap();
        assert_eq!(json["version"], VERSION);
        assert_eq!(json["colab_url"], "https://colab.research.google.com/github");
        assert_eq!(json["config"], "/repo/.colab-badge.yaml");
        assert_eq!(json["root"], "/repo");
    }
}

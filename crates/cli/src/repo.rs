//! Resolves which repository a command targets.

use std::env;

use anyhow::{Context, Result, bail};
use ghwf_types::RepoRef;
use ghwf_util::CliConfig;
use tokio::process::Command;
use tracing::debug;

/// Environment variable naming the target repository.
pub const REPO_ENV: &str = "GH_REPO";

/// Resolution order: `--repo`, `GH_REPO`, the config file's `default_repo`,
/// then the `origin` remote of the current git checkout.
pub async fn resolve_repo(flag: Option<&str>, config: &CliConfig) -> Result<RepoRef> {
    if let Some((value, source)) = configured_repo(flag, config) {
        debug!(%value, source, "using configured repository");
        return value
            .parse()
            .with_context(|| format!("could not determine base repo from {source}"));
    }

    let remote = origin_remote_url().await?;
    debug!(%remote, "using git origin remote");
    remote
        .parse()
        .with_context(|| format!("could not determine base repo from git remote '{remote}'"))
}

fn configured_repo(flag: Option<&str>, config: &CliConfig) -> Option<(String, &'static str)> {
    let non_empty = |value: &str| {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    };

    flag.and_then(non_empty)
        .map(|value| (value, "--repo"))
        .or_else(|| {
            env::var(REPO_ENV)
                .ok()
                .and_then(|value| non_empty(&value))
                .map(|value| (value, REPO_ENV))
        })
        .or_else(|| {
            config
                .default_repo
                .as_deref()
                .and_then(non_empty)
                .map(|value| (value, "config default_repo"))
        })
}

async fn origin_remote_url() -> Result<String> {
    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .output()
        .await
        .context("could not run git to find the current repository")?;

    if !output.status.success() {
        bail!("could not determine base repo: no --repo flag and no git remote named origin");
    }

    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if url.is_empty() {
        bail!("could not determine base repo: git remote origin has no URL");
    }
    Ok(url)
}

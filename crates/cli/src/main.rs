mod cli;
mod prompt;
mod repo;

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use ghwf_api::GitHubClient;
use ghwf_engine::{DispatchOptions, DispatchOutcome, run_dispatch};
use ghwf_types::RepoRef;
use ghwf_util::CliConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, RunArgs, Terminal, plan_run};
use crate::prompt::{DialoguerPrompter, NoPrompter};
use crate::repo::resolve_repo;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run(args) => run_workflow(cli.repo.as_deref(), args).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

async fn run_workflow(repo_flag: Option<&str>, args: RunArgs) -> Result<()> {
    let terminal = Terminal::detect();
    let plan = plan_run(&args, terminal, || io::read_to_string(io::stdin()))?;

    let config = CliConfig::load();
    let repo = resolve_repo(repo_flag, &config).await?;
    let client = GitHubClient::new_for_repo(&repo, &config).context("could not build http client")?;

    let options = DispatchOptions {
        repo: repo.clone(),
        selector: plan.selector,
        git_ref: args.git_ref,
        inputs: plan.inputs,
        interactive: plan.interactive,
        dry_run: args.dry_run,
    };
    let outcome = if plan.interactive {
        run_dispatch(&client, &DialoguerPrompter::default(), options).await?
    } else {
        run_dispatch(&client, &NoPrompter, options).await?
    };

    if outcome.dispatched {
        println!(
            "✓ Created workflow_dispatch event for {} at {}",
            outcome.workflow.base(),
            outcome.request.git_ref
        );
    } else {
        let preview = dry_run_preview(&client, &repo, &outcome)?;
        println!("{}", serde_json::to_string_pretty(&preview)?);
    }
    Ok(())
}

/// The request `run` would send, with secret-looking header values redacted.
fn dry_run_preview(client: &GitHubClient, repo: &RepoRef, outcome: &DispatchOutcome) -> Result<serde_json::Value> {
    let path = format!(
        "repos/{}/actions/workflows/{}/dispatches",
        repo.full_name(),
        outcome.workflow.id
    );
    let request = client
        .request(reqwest::Method::POST, &path)
        .json(&outcome.request)
        .build()?;

    let mut headers_out = serde_json::Map::new();
    for (name, value) in request.headers() {
        let line = format!("{}: {}", name.as_str(), value.to_str().unwrap_or(""));
        let redacted = ghwf_util::redact_sensitive(&line);
        let out_value = redacted
            .split_once(':')
            .map(|(_, value)| value.trim())
            .unwrap_or("")
            .to_string();
        headers_out.insert(name.as_str().to_string(), serde_json::Value::String(out_value));
    }

    Ok(serde_json::json!({
        "method": request.method().as_str(),
        "url": request.url().as_str(),
        "headers": headers_out,
        "workflow": outcome.workflow.path,
        "body": outcome.request,
    }))
}

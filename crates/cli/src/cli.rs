//! Command line surface and the argument rules checked before any network access.

use std::io;

use anyhow::{Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use ghwf_engine::InputSource;

#[derive(Debug, Parser)]
#[command(name = "ghwf")]
#[command(about = "Trigger GitHub Actions workflow runs from the terminal")]
#[command(version)]
pub struct Cli {
    /// Select another repository using the [HOST/]OWNER/REPO format
    #[arg(short = 'R', long, global = true, value_name = "[HOST/]OWNER/REPO")]
    pub repo: Option<String>,

    /// Log API requests and resolution steps to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a workflow_dispatch event for a workflow, starting a run
    Run(RunArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Workflow ID, name, file name, or path
    #[arg(value_name = "WORKFLOW")]
    pub selector: Option<String>,

    /// Workflow inputs as flags after `--`, e.g. `-- --name=mona`
    #[arg(last = true, value_name = "INPUT ARGS")]
    pub input_args: Vec<String>,

    /// The branch or tag name which contains the version of the workflow file to run
    #[arg(short = 'r', long = "ref", value_name = "REF")]
    pub git_ref: Option<String>,

    /// Workflow inputs as a JSON object
    #[arg(long, value_name = "JSON")]
    pub json: Option<String>,

    /// Print the dispatch request instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

/// Whether the standard streams are attached to a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terminal {
    pub stdin: bool,
    pub stdout: bool,
}

impl Terminal {
    pub fn detect() -> Self {
        use std::io::IsTerminal;
        Self {
            stdin: io::stdin().is_terminal(),
            stdout: io::stdout().is_terminal(),
        }
    }

    pub fn can_prompt(&self) -> bool {
        self.stdin && self.stdout
    }
}

/// What `run` will do once the arguments pass the rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub selector: Option<String>,
    pub inputs: InputSource,
    pub interactive: bool,
}

/// Apply the argument rules for `run`.
///
/// Non-empty piped stdin is read as the JSON payload and replaces `--json`.
/// Empty piped stdin, as from `< /dev/null`, leaves `--json` in effect.
pub fn plan_run<F>(args: &RunArgs, terminal: Terminal, read_stdin: F) -> Result<RunPlan>
where
    F: FnOnce() -> io::Result<String>,
{
    let selector = args.selector.clone().filter(|selector| !selector.is_empty());
    if selector.is_none() && !args.input_args.is_empty() {
        bail!("workflow argument required when passing input flags");
    }
    if selector.is_none() && !terminal.can_prompt() {
        bail!("workflow ID or name required when not running interactively");
    }
    let prompt = selector.is_none();

    let mut json = args.json.clone().filter(|json| !json.trim().is_empty());
    if !terminal.stdin {
        let piped = read_stdin().map_err(|_| anyhow!("failed to read from STDIN"))?;
        if !piped.trim().is_empty() {
            json = Some(piped);
        }
    }

    if selector.is_none() && json.is_some() {
        bail!("workflow argument required when passing JSON");
    }
    if json.is_some() && !args.input_args.is_empty() {
        bail!("only one of JSON or input arguments can be passed at a time");
    }

    let inputs = match json {
        _ if prompt => InputSource::Prompt,
        Some(json) => InputSource::Json(json),
        None if !args.input_args.is_empty() => InputSource::Args(args.input_args.clone()),
        None => InputSource::None,
    };

    Ok(RunPlan {
        selector,
        inputs,
        interactive: terminal.can_prompt(),
    })
}

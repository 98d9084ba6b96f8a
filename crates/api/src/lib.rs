//! GitHub REST API client utilities.
//!
//! This crate provides a lightweight client for the parts of the GitHub API
//! that `ghwf` needs. It focuses on:
//!
//! - Constructing an HTTP client with the headers GitHub expects
//! - Discovering credentials from the environment, the config file, or `~/.netrc`
//! - Validating the API base URL for safety
//! - Exposing the workflow endpoints behind the [`WorkflowsApi`] trait
//!
//! The primary entry point is [`GitHubClient`]. Create an instance via
//! [`GitHubClient::new_for_repo`], then call the [`WorkflowsApi`] methods.
//!
//! # Example
//!
//! ```ignore
//! use ghwf_api::{GitHubClient, WorkflowsApi};
//! use ghwf_types::RepoRef;
//! use ghwf_util::CliConfig;
//!
//! async fn list() -> anyhow::Result<()> {
//!     let repo: RepoRef = "octo-org/hello-world".parse()?;
//!     let client = GitHubClient::new_for_repo(&repo, &CliConfig::load())?;
//!     for workflow in client.list_workflows(&repo).await? {
//!         println!("{} {}", workflow.id, workflow.name);
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod workflows;

pub use error::ApiError;
pub use workflows::{WorkflowsApi, decode_file_content};

use std::time::Duration;
use std::{env, fs};

use anyhow::{Context, Result, anyhow};
use ghwf_types::RepoRef;
use ghwf_util::CliConfig;
use reqwest::{Client, RequestBuilder, Url, header};
use tracing::debug;

/// Environment variable overriding the REST API root for every host.
pub const API_BASE_ENV: &str = "GHWF_API_BASE";
/// Media type GitHub recommends for REST requests.
pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
/// REST API version pinned by this client.
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Token variables consulted for `github.com` and `*.ghe.com`, in order.
const GITHUB_COM_TOKEN_VARS: &[&str] = &["GH_TOKEN", "GITHUB_TOKEN"];
/// Token variables consulted for GitHub Enterprise Server hosts, in order.
const ENTERPRISE_TOKEN_VARS: &[&str] = &["GH_ENTERPRISE_TOKEN", "GITHUB_ENTERPRISE_TOKEN"];
/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1", "[::1]"];

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for GitHub API access.
///
/// The client pre-configures default headers and builds requests against a
/// validated base URL.
pub struct GitHubClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl GitHubClient {
    /// Construct a [`GitHubClient`] for the host of `repo`.
    ///
    /// Resolution order for authentication:
    /// - `GH_TOKEN`, then `GITHUB_TOKEN` (`github.com` and `*.ghe.com`), or
    ///   `GH_ENTERPRISE_TOKEN`, then `GITHUB_ENTERPRISE_TOKEN` (other hosts)
    /// - the `token` stored for the host in the config file
    /// - a `~/.netrc` entry for the API host or the repository host
    ///
    /// The base URL is taken from `GHWF_API_BASE`, then the host's `api_base`
    /// in the config file, then derived from the hostname.
    pub fn new_for_repo(repo: &RepoRef, config: &CliConfig) -> Result<Self> {
        let base_url = env::var(API_BASE_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| config.api_base_for(repo.host()).map(str::to_string))
            .unwrap_or_else(|| repo.api_base_url());

        let api_token = resolve_token(repo, config, &base_url);
        if api_token.is_none() {
            debug!(host = repo.host(), "no API token found; requests will be anonymous");
        }

        Self::with_base_url(&base_url, api_token)
    }

    /// Construct a client for an explicit base URL and optional token.
    pub fn with_base_url(base_url: &str, api_token: Option<String>) -> Result<Self> {
        validate_base_url(base_url)?;

        let mut default_headers = header::HeaderMap::new();
        if let Some(api_token) = api_token {
            let mut authorization_header_value = header::HeaderValue::from_str(&format!("Bearer {}", api_token))
                .context("API token contains characters that are not valid in an HTTP header")?;
            authorization_header_value.set_sensitive(true);
            default_headers.insert(header::AUTHORIZATION, authorization_header_value);
        }
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static(GITHUB_MEDIA_TYPE));
        default_headers.insert("x-github-api-version", header::HeaderValue::from_static(GITHUB_API_VERSION));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("build http client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            user_agent: format!("ghwf/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    ///
    /// The resulting request includes the configured User-Agent and base
    /// headers, and is resolved relative to `self.base_url`.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%method, %url, "building request");

        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or a loopback address: any scheme is allowed
/// - otherwise: scheme must be HTTPS
fn validate_base_url(base: &str) -> Result<()> {
    let parsed_base_url = Url::parse(base).map_err(|e| anyhow!("Invalid API base URL '{}': {}", base, e))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| anyhow!("API base URL '{}' must include a host", base))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(anyhow!(
            "API base URL must use https for non-localhost hosts; got '{}://'",
            parsed_base_url.scheme()
        ));
    }

    Ok(())
}

fn resolve_token(repo: &RepoRef, config: &CliConfig, base_url: &str) -> Option<String> {
    let token_vars = if repo.is_github_com() || repo.host().ends_with(".ghe.com") {
        GITHUB_COM_TOKEN_VARS
    } else {
        ENTERPRISE_TOKEN_VARS
    };

    token_vars
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .or_else(|| config.token_for(repo.host()).map(str::to_string))
        .or_else(|| {
            let api_host = Url::parse(base_url)
                .ok()
                .and_then(|url| url.host_str().map(str::to_string));
            let mut machines = Vec::new();
            if let Some(api_host) = api_host.as_deref() {
                machines.push(api_host);
            }
            machines.push(repo.host());
            get_netrc_token(&machines)
        })
}

/// Attempt to read an API token from the user's `~/.netrc` file.
fn get_netrc_token(machines: &[&str]) -> Option<String> {
    let home = dirs_next::home_dir()?;
    let netrc_path = home.join(".netrc");
    let content = fs::read_to_string(netrc_path).ok()?;
    parse_netrc_token(&content, machines)
}

/// Small `.netrc` parser that extracts the password for the first matching machine.
///
/// The expected form is roughly:
///
/// ```text
/// machine api.github.com
///   login octocat
///   password <TOKEN>
/// ```
///
/// Machines are tried in the order given, so an API-host entry wins over a
/// plain host entry.
fn parse_netrc_token(content: &str, machines: &[&str]) -> Option<String> {
    let mut passwords: Vec<(String, String)> = Vec::new();
    let mut current_machine: Option<String> = None;
    let mut tokens = content.split_whitespace();

    while let Some(token) = tokens.next() {
        match token {
            "machine" => current_machine = tokens.next().map(str::to_ascii_lowercase),
            // A `default` stanza ends the previous machine; it never matches a named host.
            "default" => current_machine = None,
            "password" => {
                let value = tokens.next();
                if let (Some(machine), Some(value)) = (current_machine.as_ref(), value) {
                    passwords.push((machine.clone(), value.to_string()));
                }
            }
            // Skip the value that follows other keywords.
            "login" | "account" => {
                tokens.next();
            }
            _ => {}
        }
    }

    machines.iter().find_map(|wanted| {
        passwords
            .iter()
            .find(|(machine, _)| machine.eq_ignore_ascii_case(wanted))
            .map(|(_, password)| password.clone())
    })
}

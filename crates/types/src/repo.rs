//! Repository references in the forms users and git remotes spell them.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

/// Host assumed when a reference does not name one.
pub const DEFAULT_HOST: &str = "github.com";

/// Error returned when a repository reference cannot be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepoParseError {
    #[error("expected the \"[HOST/]OWNER/REPO\" format, got {0:?}")]
    InvalidFormat(String),
    #[error("invalid repository URL {input:?}: {reason}")]
    InvalidUrl { input: String, reason: String },
}

/// A repository on a specific host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    host: String,
    owner: String,
    name: String,
}

impl RepoRef {
    pub fn new(host: impl Into<String>, owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            host: normalize_host(&host.into()),
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `OWNER/REPO`, as used in REST paths.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn is_github_com(&self) -> bool {
        self.host == DEFAULT_HOST
    }

    /// Default REST API root for the repository host.
    ///
    /// - `github.com` uses `https://api.github.com`
    /// - data-residency tenants (`*.ghe.com`) use `https://api.<host>`
    /// - everything else is treated as GitHub Enterprise Server (`https://<host>/api/v3`)
    pub fn api_base_url(&self) -> String {
        if self.is_github_com() {
            "https://api.github.com".to_string()
        } else if self.host.ends_with(".ghe.com") {
            format!("https://api.{}", self.host)
        } else {
            format!("https://{}/api/v3", self.host)
        }
    }

    fn from_url(input: &str, url: &Url) -> Result<Self, RepoParseError> {
        let host = url.host_str().ok_or_else(|| RepoParseError::InvalidUrl {
            input: input.to_string(),
            reason: "missing host".to_string(),
        })?;
        let segments: Vec<&str> = url
            .path()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        match segments.as_slice() {
            [owner, name] => Self::from_parts(input, host, owner, name),
            _ => Err(RepoParseError::InvalidUrl {
                input: input.to_string(),
                reason: "expected a path of the form /OWNER/REPO".to_string(),
            }),
        }
    }

    fn from_parts(input: &str, host: &str, owner: &str, name: &str) -> Result<Self, RepoParseError> {
        let name = name.strip_suffix(".git").unwrap_or(name);
        if host.is_empty() || owner.is_empty() || name.is_empty() {
            return Err(RepoParseError::InvalidFormat(input.to_string()));
        }
        Ok(Self::new(host, owner, name))
    }
}

impl FromStr for RepoRef {
    type Err = RepoParseError;

    /// Accepts `OWNER/REPO`, `HOST/OWNER/REPO`, `https://HOST/OWNER/REPO(.git)`,
    /// `ssh://git@HOST/OWNER/REPO(.git)` and scp-like `git@HOST:OWNER/REPO(.git)`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();

        if trimmed.contains("://") {
            let url = Url::parse(trimmed).map_err(|error| RepoParseError::InvalidUrl {
                input: trimmed.to_string(),
                reason: error.to_string(),
            })?;
            return Self::from_url(trimmed, &url);
        }

        if let Some((user_host, path)) = trimmed.split_once(':')
            && let Some((_, host)) = user_host.split_once('@')
        {
            return match path.trim_matches('/').split('/').collect::<Vec<_>>().as_slice() {
                [owner, name] => Self::from_parts(trimmed, host, owner, name),
                _ => Err(RepoParseError::InvalidFormat(trimmed.to_string())),
            };
        }

        match trimmed.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] => Self::from_parts(trimmed, DEFAULT_HOST, owner, name),
            [host, owner, name] => Self::from_parts(trimmed, host, owner, name),
            _ => Err(RepoParseError::InvalidFormat(trimmed.to_string())),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_github_com() {
            write!(f, "{}/{}", self.owner, self.name)
        } else {
            write!(f, "{}/{}/{}", self.host, self.owner, self.name)
        }
    }
}

fn normalize_host(host: &str) -> String {
    let lowered = host.trim().to_ascii_lowercase();
    match lowered.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lowered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_and_name_on_default_host() {
        let repo: RepoRef = "octo-org/hello-world".parse().expect("parse repo");
        assert_eq!(repo.host(), "github.com");
        assert_eq!(repo.full_name(), "octo-org/hello-world");
        assert_eq!(repo.api_base_url(), "https://api.github.com");
        assert_eq!(repo.to_string(), "octo-org/hello-world");
    }

    #[test]
    fn parses_explicit_host_case_insensitively() {
        let repo: RepoRef = "GHE.Example.com/octo/app".parse().expect("parse repo");
        assert_eq!(repo.host(), "ghe.example.com");
        assert_eq!(repo.api_base_url(), "https://ghe.example.com/api/v3");
        assert_eq!(repo.to_string(), "ghe.example.com/octo/app");
    }

    #[test]
    fn parses_remote_urls() {
        let https: RepoRef = "https://www.github.com/octo/app.git".parse().expect("https url");
        let ssh: RepoRef = "ssh://git@github.com/octo/app.git".parse().expect("ssh url");
        let scp: RepoRef = "git@github.com:octo/app.git".parse().expect("scp url");

        let expected = RepoRef::new("github.com", "octo", "app");
        assert_eq!(https, expected);
        assert_eq!(ssh, expected);
        assert_eq!(scp, expected);
    }

    #[test]
    fn data_residency_hosts_use_api_subdomain() {
        let repo = RepoRef::new("acme.ghe.com", "octo", "app");
        assert_eq!(repo.api_base_url(), "https://api.acme.ghe.com");
    }

    #[test]
    fn rejects_malformed_references() {
        assert!(matches!("justone".parse::<RepoRef>(), Err(RepoParseError::InvalidFormat(_))));
        assert!(matches!("a/b/c/d".parse::<RepoRef>(), Err(RepoParseError::InvalidFormat(_))));
        assert!(matches!("owner/".parse::<RepoRef>(), Err(RepoParseError::InvalidFormat(_))));
        assert!(matches!(
            "https://github.com/only-owner".parse::<RepoRef>(),
            Err(RepoParseError::InvalidUrl { .. })
        ));
    }
}

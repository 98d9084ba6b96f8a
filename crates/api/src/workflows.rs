//! GitHub Actions workflow endpoints.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ghwf_types::{DispatchRequest, RepoRef, Workflow, WorkflowList};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{ApiError, GitHubClient};

/// Page size used when listing workflows (the API maximum).
const WORKFLOWS_PER_PAGE: usize = 100;

/// Characters escaped inside a single path segment of a contents URL.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Remote operations needed to dispatch a workflow run.
#[async_trait]
pub trait WorkflowsApi: Send + Sync {
    /// Every workflow registered in the repository, across all pages.
    async fn list_workflows(&self, repo: &RepoRef) -> Result<Vec<Workflow>, ApiError>;

    /// A single workflow by numeric ID, or `None` when the repository has no such workflow.
    async fn get_workflow(&self, repo: &RepoRef, workflow_id: u64) -> Result<Option<Workflow>, ApiError>;

    /// Name of the repository's default branch.
    async fn default_branch(&self, repo: &RepoRef) -> Result<String, ApiError>;

    /// Raw bytes of the file at `path` as of `git_ref`.
    async fn workflow_content(&self, repo: &RepoRef, path: &str, git_ref: &str) -> Result<Vec<u8>, ApiError>;

    /// Create a `workflow_dispatch` event for the workflow.
    async fn create_dispatch(&self, repo: &RepoRef, workflow_id: u64, request: &DispatchRequest) -> Result<(), ApiError>;
}

#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

impl GitHubClient {
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path).query(query).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl WorkflowsApi for GitHubClient {
    async fn list_workflows(&self, repo: &RepoRef) -> Result<Vec<Workflow>, ApiError> {
        let path = format!("repos/{}/actions/workflows", repo.full_name());
        let mut workflows = Vec::new();
        let mut page = 1usize;

        loop {
            let query = [("per_page", WORKFLOWS_PER_PAGE.to_string()), ("page", page.to_string())];
            let listing: WorkflowList = self.get_json(&path, &query).await?;
            let received = listing.workflows.len();
            workflows.extend(listing.workflows);

            if received < WORKFLOWS_PER_PAGE || workflows.len() as u64 >= listing.total_count {
                break;
            }
            page += 1;
        }

        debug!(repo = %repo, count = workflows.len(), "listed workflows");
        Ok(workflows)
    }

    async fn get_workflow(&self, repo: &RepoRef, workflow_id: u64) -> Result<Option<Workflow>, ApiError> {
        let path = format!("repos/{}/actions/workflows/{}", repo.full_name(), workflow_id);
        let response = self.request(Method::GET, &path).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response).await?;
        Ok(Some(response.json::<Workflow>().await?))
    }

    async fn default_branch(&self, repo: &RepoRef) -> Result<String, ApiError> {
        let path = format!("repos/{}", repo.full_name());
        let repository: RepositoryResponse = self.get_json(&path, &[]).await?;
        Ok(repository.default_branch)
    }

    async fn workflow_content(&self, repo: &RepoRef, path: &str, git_ref: &str) -> Result<Vec<u8>, ApiError> {
        let encoded_path = path
            .split('/')
            .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        let request_path = format!("repos/{}/contents/{}", repo.full_name(), encoded_path);
        let file: ContentResponse = self
            .get_json(&request_path, &[("ref", git_ref.to_string())])
            .await?;

        if file.encoding != "base64" {
            return Err(ApiError::InvalidResponse(format!(
                "expected base64 file content for '{}', got encoding '{}'",
                path, file.encoding
            )));
        }

        Ok(decode_file_content(&file.content)?)
    }

    async fn create_dispatch(&self, repo: &RepoRef, workflow_id: u64, request: &DispatchRequest) -> Result<(), ApiError> {
        let path = format!("repos/{}/actions/workflows/{}/dispatches", repo.full_name(), workflow_id);
        let response = self.request(Method::POST, &path).json(request).send().await?;
        ensure_success(response).await?;
        debug!(repo = %repo, workflow_id, git_ref = %request.git_ref, "created workflow_dispatch event");
        Ok(())
    }
}

/// Decode base64 file content as returned by the contents API.
///
/// GitHub wraps the encoded payload at 60 columns, so ASCII whitespace is
/// dropped before decoding.
///
/// # Example
/// ```rust
/// use ghwf_api::decode_file_content;
///
/// let bytes = decode_file_content("b246\nIHB1c2g=\n").unwrap();
/// assert_eq!(bytes, b"on: push");
/// ```
pub fn decode_file_content(content: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = content.chars().filter(|ch| !ch.is_ascii_whitespace()).collect();
    STANDARD.decode(compact)
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::status(status.as_u16(), &body))
}

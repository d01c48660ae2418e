use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::models::Repository;
use octocrab::Octocrab;
use tracing::debug;

use crate::discovery::{ListOptions, RepositoryDescriptor, RepositoryLister, RepositoryPage};
use crate::error::SyncError;

/// GitHub client wrapper listing organization repositories
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// Create a client authenticated with a pre-issued access token
    pub fn new(token: &str) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .context("Failed to create GitHub client")?;

        Ok(Self { client })
    }

    /// Wrap an already configured octocrab instance
    pub fn with_client(client: Octocrab) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RepositoryLister for GitHubClient {
    async fn list_page(
        &self,
        org: &str,
        options: ListOptions,
    ) -> Result<RepositoryPage, SyncError> {
        debug!(
            "Fetching repositories for organization {} (page {}, {} per page)",
            org, options.page, options.per_page
        );

        let page = self
            .client
            .orgs(org)
            .list_repos()
            .per_page(options.per_page)
            .page(options.page)
            .send()
            .await
            .map_err(|e| SyncError::remote(org, options.page, e))?;

        let next_page = page
            .next
            .as_ref()
            .map(|uri| uri.query().and_then(page_number).unwrap_or(options.page + 1));

        Ok(RepositoryPage {
            repositories: page.items.iter().map(RepositoryDescriptor::from).collect(),
            next_page,
        })
    }
}

/// Page number carried in the query of a `Link: rel="next"` URI
fn page_number(query: &str) -> Option<u32> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}

impl From<&Repository> for RepositoryDescriptor {
    fn from(repo: &Repository) -> Self {
        Self {
            name: repo.name.clone(),
            full_name: repo.full_name.clone(),
            clone_url: repo.clone_url.as_ref().map(|u| u.to_string()),
            ssh_url: repo.ssh_url.clone(),
            default_branch: repo.default_branch.clone(),
            fork: repo.fork.unwrap_or(false),
            archived: repo.archived.unwrap_or(false),
        }
    }
}

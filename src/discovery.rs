//! Repository discovery
//!
//! This module defines the provider-agnostic listing seam ([`RepositoryLister`])
//! and the pagination logic that turns page-by-page responses into one lazy
//! sequence of [`RepositoryDescriptor`]s.

use async_trait::async_trait;
use futures::stream::{self, Stream, TryStreamExt};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::SyncError;

/// Page size requested from the hosting API
pub const DEFAULT_PAGE_SIZE: u8 = 50;

/// Remote-side description of a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryDescriptor {
    /// Repository name, unique within the organization
    pub name: String,

    /// Owner/name form, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub clone_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,

    pub fork: bool,
    pub archived: bool,
}

impl RepositoryDescriptor {
    /// Descriptor carrying only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: None,
            clone_url: None,
            ssh_url: None,
            default_branch: None,
            fork: false,
            archived: false,
        }
    }
}

/// Paging options for a single listing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub per_page: u8,
    /// 1-based page number
    pub page: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PAGE_SIZE,
            page: 1,
        }
    }
}

/// One page of listing results
#[derive(Debug, Clone, Default)]
pub struct RepositoryPage {
    pub repositories: Vec<RepositoryDescriptor>,

    /// Cursor for the following page; `None` on the last page
    pub next_page: Option<u32>,
}

/// Source of an organization's repositories, one page per call
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryLister: Send + Sync {
    async fn list_page(&self, org: &str, options: ListOptions)
        -> Result<RepositoryPage, SyncError>;
}

/// Fetch the first page of `org` with the default page size
pub async fn fetch_page<L>(org: &str, lister: &L) -> Result<RepositoryPage, SyncError>
where
    L: RepositoryLister + ?Sized,
{
    lister.list_page(org, ListOptions::default()).await
}

/// Lazily walk every page of `org`, following each page's next-page cursor.
///
/// Nothing is requested until the stream is polled. A failed page ends the
/// stream after yielding its error. Calling this again starts over at page 1.
pub fn repository_stream<'a, L>(
    lister: &'a L,
    org: &'a str,
    per_page: u8,
) -> impl Stream<Item = Result<RepositoryDescriptor, SyncError>> + Send + 'a
where
    L: RepositoryLister + ?Sized,
{
    stream::try_unfold(Some(1u32), move |cursor| async move {
        let Some(page) = cursor else {
            return Ok::<_, SyncError>(None);
        };

        debug!("Requesting page {} of repositories for {}", page, org);
        let response = lister.list_page(org, ListOptions { per_page, page }).await?;

        // A cursor that does not move forward would loop forever
        let next = response.next_page.filter(|next| *next > page);

        let items = stream::iter(
            response
                .repositories
                .into_iter()
                .map(Ok::<_, SyncError>),
        );
        Ok(Some((items, next)))
    })
    .try_flatten()
}

/// Collect every repository of `org` across all pages
pub async fn list_repositories<L>(
    lister: &L,
    org: &str,
    per_page: u8,
) -> Result<Vec<RepositoryDescriptor>, SyncError>
where
    L: RepositoryLister + ?Sized,
{
    let repositories: Vec<RepositoryDescriptor> =
        repository_stream(lister, org, per_page).try_collect().await?;

    info!(
        "Found {} repositories for organization: {}",
        repositories.len(),
        org
    );
    Ok(repositories)
}

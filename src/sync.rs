//! Reconciler - decides the sync action for every repository of an organization
//!
//! This module composes repository discovery with local working copy
//! inspection. It only reports decisions; cloning and fetching are left to
//! whatever consumes the [`Decision`] list.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::discovery::{list_repositories, RepositoryDescriptor, RepositoryLister};
use crate::error::SyncError;
use crate::git::{LocalInspector, LocalSyncState};

/// Action to apply to one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Clone,
    Fetch,
    Error(String),
}

impl From<LocalSyncState> for SyncAction {
    fn from(state: LocalSyncState) -> Self {
        match state {
            LocalSyncState::NotPresent => Self::Clone,
            LocalSyncState::ClonedAsGitRepo => Self::Fetch,
            LocalSyncState::ConflictingPath(conflict) => Self::Error(conflict.to_string()),
        }
    }
}

impl From<Result<LocalSyncState, SyncError>> for SyncAction {
    fn from(result: Result<LocalSyncState, SyncError>) -> Self {
        match result {
            Ok(state) => state.into(),
            Err(e) => Self::Error(e.to_string()),
        }
    }
}

/// A repository paired with the action decided for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub repository: RepositoryDescriptor,
    pub action: SyncAction,
}

/// Counts over a reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub total_repositories: usize,
    pub to_clone: usize,
    pub to_fetch: usize,
    pub errors: usize,
    pub duration: Duration,
}

impl ReconcileSummary {
    pub fn from_decisions(decisions: &[Decision], duration: Duration) -> Self {
        let mut summary = Self {
            total_repositories: decisions.len(),
            duration,
            ..Self::default()
        };

        for decision in decisions {
            match decision.action {
                SyncAction::Clone => summary.to_clone += 1,
                SyncAction::Fetch => summary.to_fetch += 1,
                SyncAction::Error(_) => summary.errors += 1,
            }
        }

        summary
    }
}

/// Decides clone/fetch for each repository of an organization
pub struct Reconciler<L: ?Sized> {
    lister: Arc<L>,
    inspector: LocalInspector,
    page_size: u8,
    max_parallel: usize,
}

impl<L: RepositoryLister + ?Sized> Reconciler<L> {
    /// Create a reconciler from run settings
    pub fn new(lister: Arc<L>, settings: &Settings) -> Self {
        Self {
            lister,
            inspector: LocalInspector::new(&settings.base_directory),
            page_size: settings.page_size,
            max_parallel: settings.max_parallel.max(1),
        }
    }

    /// Create a reconciler from explicit parts
    pub fn with_parts(
        lister: Arc<L>,
        inspector: LocalInspector,
        page_size: u8,
        max_parallel: usize,
    ) -> Self {
        Self {
            lister,
            inspector,
            page_size,
            max_parallel: max_parallel.max(1),
        }
    }

    /// Decide the action for every repository of `org`, in listing order.
    ///
    /// A listing failure fails the whole run. Inspection failures only turn
    /// the affected repository's action into [`SyncAction::Error`].
    pub async fn reconcile(&self, org: &str) -> Result<Vec<Decision>, SyncError> {
        info!("Looking up repos for org '{}'", org);

        let repositories = list_repositories(self.lister.as_ref(), org, self.page_size).await?;

        debug!(
            "Inspecting {} repositories under {} with concurrency {}",
            repositories.len(),
            self.inspector.base_directory().display(),
            self.max_parallel
        );

        let inspector = &self.inspector;
        let decisions = stream::iter(repositories)
            .map(|repository| async move {
                let result = inspector.inspect(&repository.name).await;
                if let Err(e) = &result {
                    warn!("Failed to inspect {}: {}", repository.name, e);
                }
                Decision {
                    action: result.into(),
                    repository,
                }
            })
            .buffered(self.max_parallel)
            .collect()
            .await;

        Ok(decisions)
    }

    /// Reconcile and summarize in one pass
    pub async fn reconcile_with_summary(
        &self,
        org: &str,
    ) -> Result<(Vec<Decision>, ReconcileSummary), SyncError> {
        let start_time = Instant::now();
        let decisions = self.reconcile(org).await?;
        let summary = ReconcileSummary::from_decisions(&decisions, start_time.elapsed());

        info!(
            "Reconciled {} repositories in {:.2}s: {} to clone, {} to fetch, {} errors",
            summary.total_repositories,
            summary.duration.as_secs_f64(),
            summary.to_clone,
            summary.to_fetch,
            summary.errors
        );

        Ok((decisions, summary))
    }
}

/// Log each decision line by line
pub fn log_decisions(decisions: &[Decision]) {
    for decision in decisions {
        info!("{}", decision.repository.name);
        match &decision.action {
            SyncAction::Clone => info!("  would clone"),
            SyncAction::Fetch => info!("  would fetch"),
            SyncAction::Error(reason) => warn!("  error: {}", reason),
        }
    }
}

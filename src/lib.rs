//! octosync - GitHub organization repository reconciliation
//!
//! octosync works out, for every repository of a GitHub organization, whether a
//! local working copy already exists and whether it should be cloned or fetched.
//! It only decides; executing the decisions is left to a later step.
//!
//! ## Modules
//!
//! - [`config`]: Configuration file, token lookup and run settings
//! - [`discovery`]: Paginated repository listing behind the [`RepositoryLister`] seam
//! - [`github`]: GitHub API implementation of the lister
//! - [`git`]: Local working copy inspection
//! - [`sync`]: Reconciliation of remote repositories against local state

pub mod config;
pub mod discovery;
pub mod error;
pub mod git;
pub mod github;
pub mod sync;

pub use config::{Config, Settings};
pub use discovery::{RepositoryDescriptor, RepositoryLister};
pub use error::SyncError;
pub use git::{LocalInspector, LocalSyncState};
pub use github::GitHubClient;
pub use sync::{Decision, ReconcileSummary, Reconciler, SyncAction};

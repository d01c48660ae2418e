//! Error taxonomy for a reconciliation run

use std::path::PathBuf;
use thiserror::Error;

/// Boxed source error coming from the remote API client
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while reconciling an organization
#[derive(Debug, Error)]
pub enum SyncError {
    /// The access token variable is unset or empty
    #[error("You must set the {var} variable with a GitHub access token")]
    MissingToken { var: String },

    /// No organization argument and no usable working directory name
    #[error("Could not determine the organization name: {0}")]
    OrganizationName(String),

    /// Listing the organization's repositories failed
    #[error("Failed to list repositories for organization '{org}' (page {page}): {source}")]
    RemoteApi {
        org: String,
        page: u32,
        #[source]
        source: BoxError,
    },

    /// Inspecting a local path failed for a reason other than "not found"
    #[error("Failed to inspect {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub fn remote(org: &str, page: u32, source: impl Into<BoxError>) -> Self {
        Self::RemoteApi {
            org: org.to_string(),
            page,
            source: source.into(),
        }
    }
}

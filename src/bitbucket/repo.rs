//! Bitbucket API payloads and conversion to the platform records
use crate::platform::{SourceRepo, Workspace};
use serde::{Deserialize, Serialize};

/// One page of a Bitbucket listing
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BitbucketPage<T> {
    /// Items of the page
    pub values: Vec<T>,

    /// Absolute URL of the next page, absent on the last one
    pub next: Option<String>,
}

/// Bitbucket workspace
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct BitbucketWorkspace {
    /// Workspace slug
    pub slug: String,

    /// Workspace UUID, with braces
    pub uuid: String,
}

/// Bitbucket repository
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct BitbucketRepo {
    /// Repository slug
    pub slug: String,
}

impl From<BitbucketWorkspace> for Workspace {
    fn from(workspace: BitbucketWorkspace) -> Self {
        Workspace {
            slug: workspace.slug,
            uuid: workspace.uuid,
        }
    }
}

impl From<BitbucketRepo> for SourceRepo {
    fn from(repo: BitbucketRepo) -> Self {
        SourceRepo { slug: repo.slug }
    }
}

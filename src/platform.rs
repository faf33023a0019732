//! Platform abstractions shared by the source and destination clients
use std::{future::Future, pin::Pin};

use serde::{Deserialize, Serialize};

use crate::errors::MoverError;

/// Boxed future returned by the platform traits
pub type PlatformFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, MoverError>> + Send + 'a>>;

/// Source organizational unit (a Bitbucket workspace)
#[derive(Deserialize, Serialize, Debug, Default, PartialEq, Eq, Hash, Clone)]
pub struct Workspace {
    /// Workspace slug
    pub slug: String,

    /// Workspace unique identifier
    pub uuid: String,
}

/// Source repository
#[derive(Deserialize, Serialize, Debug, Default, PartialEq, Eq, Hash, Clone)]
pub struct SourceRepo {
    /// Repository slug
    pub slug: String,
}

/// Destination namespace (a GitLab group or user namespace)
#[derive(Deserialize, Serialize, Debug, Default, PartialEq, Eq, Hash, Clone)]
pub struct Namespace {
    /// Numeric identifier
    pub id: u64,

    /// Display name
    pub name: String,
}

/// Destination project
#[derive(Deserialize, Serialize, Debug, Default, PartialEq, Eq, Hash, Clone)]
pub struct Project {
    /// Numeric identifier
    pub id: u64,

    /// Full path, `namespace/project`
    pub path_with_namespace: String,

    /// Whether the repository holds no commits
    #[serde(default)]
    pub empty_repo: bool,
}

/// Platform the repositories are read from
pub trait SourcePlatform: Sync + Send {
    /// List every workspace visible to the credential
    fn get_all_workspaces(&self) -> PlatformFuture<'_, Vec<Workspace>>;

    /// List every repository of a workspace
    fn get_workspace_repos<'a>(&'a self, workspace: &'a str)
        -> PlatformFuture<'a, Vec<SourceRepo>>;

    /// Clone URL of a repository, credentials included
    fn clone_url(&self, workspace: &str, repo: &str) -> Result<String, MoverError>;

    /// Host of the platform
    fn get_remote_url(&self) -> &str;
}

/// Platform the repositories are moved to
pub trait DestinationPlatform: Sync + Send {
    /// Username of the authenticated identity
    fn get_username(&self) -> PlatformFuture<'_, String>;

    /// List every namespace visible to the credential
    fn get_all_namespaces(&self) -> PlatformFuture<'_, Vec<Namespace>>;

    /// Get a project by its full path
    fn get_project<'a>(&'a self, path: &'a str) -> PlatformFuture<'a, Project>;

    /// Create a private project, in the personal namespace when `namespace_id` is `None`
    fn create_project<'a>(
        &'a self,
        name: &'a str,
        namespace_id: Option<u64>,
    ) -> PlatformFuture<'a, Project>;

    /// Create a private group using `name` as name and path
    fn create_group<'a>(&'a self, name: &'a str) -> PlatformFuture<'a, Namespace>;

    /// Push URL of a project, credentials included
    fn push_url(&self, namespace: &str, project: &str) -> Result<String, MoverError>;

    /// Host of the platform
    fn get_remote_url(&self) -> &str;
}

/// Known platforms
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum PlatformType {
    /// Bitbucket Cloud
    Bitbucket,
    /// GitLab
    Gitlab,
}

impl std::fmt::Display for PlatformType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformType::Bitbucket => write!(f, "bitbucket"),
            PlatformType::Gitlab => write!(f, "gitlab"),
        }
    }
}

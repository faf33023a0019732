//! GitLab API payloads and conversion to the platform records
use crate::platform::{Namespace, Project};
use serde::{Deserialize, Serialize};

/// GitLab visibility used for every created resource
pub const PRIVATE_VISIBILITY: &str = "private";

/// Authenticated user
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct GitlabUser {
    /// Username, also the path of the personal namespace
    pub username: String,
}

/// GitLab namespace or group
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct GitlabNamespace {
    /// Namespace ID
    pub id: u64,

    /// Namespace name
    pub name: String,
}

/// GitLab project
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct GitlabProject {
    /// Project ID
    pub id: u64,

    /// Full path of the project
    pub path_with_namespace: String,

    /// Whether the repository has no commits
    #[serde(default)]
    pub empty_repo: bool,
}

/// Body of a project creation
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GitlabProjectCreation {
    /// Project name
    pub name: String,

    /// Project path
    pub path: String,

    /// Parent namespace, the personal one when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<u64>,

    /// Project visibility
    pub visibility: String,
}

/// Body of a group creation
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GitlabGroupCreation {
    /// Group name
    pub name: String,

    /// Group path
    pub path: String,

    /// Group visibility
    pub visibility: String,
}

/// Error body returned by the API
#[derive(Deserialize, Debug, Clone)]
pub struct GitlabMessage {
    /// Either a string or a map of field errors
    pub message: serde_json::Value,
}

impl From<GitlabNamespace> for Namespace {
    fn from(namespace: GitlabNamespace) -> Self {
        Namespace {
            id: namespace.id,
            name: namespace.name,
        }
    }
}

impl From<GitlabProject> for Project {
    fn from(project: GitlabProject) -> Self {
        Project {
            id: project.id,
            path_with_namespace: project.path_with_namespace,
            empty_repo: project.empty_repo,
        }
    }
}

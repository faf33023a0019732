//! Source inventory: every repository of every workspace
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{errors::MoverError, platform::SourcePlatform};

/// One source repository and what is known of its destination
#[derive(Deserialize, Serialize, Debug, Default, PartialEq, Eq, Clone)]
pub struct WorkspaceProjectPair {
    /// Source workspace, also the destination namespace path
    pub workspace_slug: String,

    /// Source repository, also the destination project path
    pub project_slug: String,

    /// Source workspace UUID
    pub workspace_uuid: String,

    /// Destination namespace, once resolved
    pub namespace_id: Option<u64>,

    /// Destination project already holds commits; never copied again
    pub full_repo: bool,
}

impl WorkspaceProjectPair {
    /// Create a pair with nothing known about the destination
    pub fn new(workspace_slug: &str, project_slug: &str, workspace_uuid: &str) -> Self {
        Self {
            workspace_slug: workspace_slug.to_string(),
            project_slug: project_slug.to_string(),
            workspace_uuid: workspace_uuid.to_string(),
            ..Default::default()
        }
    }

    /// `workspace/project`
    pub fn path(&self) -> String {
        format!("{}/{}", self.workspace_slug, self.project_slug)
    }
}

/// List every repository of every workspace visible on the source
/// # Errors
/// Any listing error, a partial inventory is never returned
pub(crate) async fn read_inventory(
    source: &dyn SourcePlatform,
) -> Result<Vec<WorkspaceProjectPair>, MoverError> {
    let workspaces = source.get_all_workspaces().await?;
    info!(
        "Found {} workspaces on {}",
        workspaces.len(),
        source.get_remote_url()
    );
    let mut pairs = vec![];
    for (idx, workspace) in workspaces.iter().enumerate() {
        let repos = source.get_workspace_repos(&workspace.slug).await?;
        info!(
            "[{}/{}] {}: {} repositories",
            idx + 1,
            workspaces.len(),
            workspace.slug,
            repos.len()
        );
        for repo in repos {
            debug!("Has repo: {}/{}", workspace.slug, repo.slug);
            pairs.push(WorkspaceProjectPair::new(
                &workspace.slug,
                &repo.slug,
                &workspace.uuid,
            ));
        }
    }
    Ok(pairs)
}

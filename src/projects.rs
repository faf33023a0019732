//! Destination projects: create the missing ones, detect the populated ones
use std::collections::BTreeSet;

use log::{info, warn};

use crate::{errors::MoverError, inventory::WorkspaceProjectPair, platform::DestinationPlatform};

/// Outcome of the project provisioning
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProjectProvisioning {
    /// Projects created
    pub created: usize,

    /// Projects already present
    pub existing: usize,

    /// Creations refused because the name was already taken
    pub taken: usize,

    /// Pairs skipped because their namespace is unknown
    pub unresolved: Vec<String>,
}

/// Make sure a destination project exists for every pair and record whether it holds data
///
/// Pairs of `personal_namespace` are created in the personal namespace of the
/// authenticated identity and need no namespace identifier. In dry run, pairs
/// of `planned_namespaces` are reported as created although their group
/// does not exist yet.
/// # Errors
/// Lookup errors other than a missing project, creation errors other than a taken name
pub(crate) async fn provision_projects(
    destination: &dyn DestinationPlatform,
    pairs: &mut [WorkspaceProjectPair],
    personal_namespace: &str,
    planned_namespaces: &BTreeSet<String>,
    dry_run: bool,
) -> Result<ProjectProvisioning, MoverError> {
    let mut provisioning = ProjectProvisioning::default();
    let total = pairs.len();
    for (idx, pair) in pairs.iter_mut().enumerate() {
        let path = pair.path();
        let prefix = format!("[{}/{total}] {path}", idx + 1);
        match destination.get_project(&path).await {
            Ok(project) => {
                pair.full_repo = !project.empty_repo;
                provisioning.existing += 1;
                info!(
                    "{prefix}: exists ({})",
                    if pair.full_repo { "full" } else { "empty" }
                );
                continue;
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let planned = dry_run && planned_namespaces.contains(&pair.workspace_slug);
        if pair.namespace_id.is_none() && pair.workspace_slug != personal_namespace && !planned
        {
            warn!("{prefix}: namespace {} is unknown, not creating", pair.workspace_slug);
            provisioning.unresolved.push(path);
            continue;
        }
        if dry_run {
            info!("{prefix}: would create");
            continue;
        }
        info!("{prefix}: creating");
        match destination
            .create_project(&pair.project_slug, pair.namespace_id)
            .await
        {
            Ok(_) => provisioning.created += 1,
            Err(e) if e.is_already_taken() => {
                warn!("{prefix}: already taken: {e}");
                provisioning.taken += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(provisioning)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::FakeDestination;

    #[tokio::test]
    async fn emptiness_decides_full_repo() {
        let destination = FakeDestination::new("alice")
            .with_namespace(7, "acme")
            .with_project("acme/webapp", false)
            .with_project("acme/docs", true);
        let mut pairs = vec![
            WorkspaceProjectPair::new("acme", "webapp", ""),
            WorkspaceProjectPair::new("acme", "docs", ""),
        ];

        let provisioning =
            provision_projects(&destination, &mut pairs, "alice", &BTreeSet::new(), false)
                .await
                .unwrap();
        assert!(pairs[0].full_repo);
        assert!(!pairs[1].full_repo);
        assert_eq!(provisioning.existing, 2);
        assert!(destination.project_creations().is_empty());
    }

    #[tokio::test]
    async fn missing_projects_are_created_in_their_namespace() {
        let destination = FakeDestination::new("alice")
            .with_namespace(7, "acme")
            .ambiguous_project("acme/odd");
        let mut pairs = vec![
            WorkspaceProjectPair::new("acme", "cli", ""),
            WorkspaceProjectPair::new("acme", "odd", ""),
            WorkspaceProjectPair::new("alice", "dotfiles", ""),
        ];
        pairs[0].namespace_id = Some(7);
        pairs[1].namespace_id = Some(7);

        let provisioning =
            provision_projects(&destination, &mut pairs, "alice", &BTreeSet::new(), false)
                .await
                .unwrap();
        assert_eq!(provisioning.created, 3);
        assert_eq!(
            destination.project_creations(),
            vec![
                ("cli".to_string(), Some(7)),
                ("odd".to_string(), Some(7)),
                ("dotfiles".to_string(), None)
            ]
        );
        assert!(pairs.iter().all(|p| !p.full_repo));
    }

    #[tokio::test]
    async fn unknown_namespace_is_skipped() {
        let destination = FakeDestination::new("alice");
        let mut pairs = vec![WorkspaceProjectPair::new("tools", "ci", "")];

        let provisioning =
            provision_projects(&destination, &mut pairs, "alice", &BTreeSet::new(), false)
                .await
                .unwrap();
        assert_eq!(provisioning.unresolved, vec!["tools/ci"]);
        assert!(destination.project_creations().is_empty());
    }

    #[tokio::test]
    async fn taken_project_is_not_fatal() {
        let destination = FakeDestination::new("alice")
            .with_namespace(7, "acme")
            .taking_project("acme/cli");
        let mut pairs = vec![
            WorkspaceProjectPair::new("acme", "cli", ""),
            WorkspaceProjectPair::new("acme", "web", ""),
        ];
        pairs[0].namespace_id = Some(7);
        pairs[1].namespace_id = Some(7);

        let provisioning =
            provision_projects(&destination, &mut pairs, "alice", &BTreeSet::new(), false)
                .await
                .unwrap();
        assert_eq!(provisioning.taken, 1);
        assert_eq!(provisioning.created, 1);
    }

    #[tokio::test]
    async fn dry_run_plans_projects_of_planned_groups() {
        let destination = FakeDestination::new("alice");
        let mut pairs = vec![
            WorkspaceProjectPair::new("acme", "cli", ""),
            WorkspaceProjectPair::new("tools", "ci", ""),
        ];
        let planned: BTreeSet<String> = ["acme".to_string()].into_iter().collect();

        let provisioning = provision_projects(&destination, &mut pairs, "alice", &planned, true)
            .await
            .unwrap();
        assert_eq!(provisioning.unresolved, vec!["tools/ci"]);
        assert_eq!(provisioning.created, 0);
        assert!(destination.project_creations().is_empty());
    }

    #[tokio::test]
    async fn lookup_errors_are_fatal() {
        let destination = FakeDestination::new("alice").failing_project("acme/cli");
        let mut pairs = vec![WorkspaceProjectPair::new("acme", "cli", "")];
        pairs[0].namespace_id = Some(7);

        assert!(
            provision_projects(&destination, &mut pairs, "alice", &BTreeSet::new(), false)
                .await
                .is_err()
        );
        assert!(destination.project_creations().is_empty());
    }
}

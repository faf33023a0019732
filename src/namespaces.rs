//! Destination namespaces: find the missing ones and create them
use std::collections::{BTreeSet, HashMap};

use log::{debug, info, warn};

use crate::{errors::MoverError, inventory::WorkspaceProjectPair, platform::DestinationPlatform};

/// Destination namespace identifiers by name
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NamespaceIndex(HashMap<String, u64>);

impl NamespaceIndex {
    /// Record an identifier, replacing a previous one with the same name
    pub fn insert(&mut self, name: &str, id: u64) {
        self.0.insert(name.to_string(), id);
    }

    /// Identifier of a namespace
    pub fn get(&self, name: &str) -> Option<u64> {
        self.0.get(name).copied()
    }

    /// Add every identifier of `other`, replacing the ones with the same name
    pub fn merge(&mut self, other: &NamespaceIndex) {
        for (name, id) in &other.0 {
            self.insert(name, *id);
        }
    }

    /// Number of known namespaces
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no namespace is known
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set the namespace identifier of every pair whose workspace is known
    pub fn apply(&self, pairs: &mut [WorkspaceProjectPair]) {
        for pair in pairs.iter_mut() {
            if let Some(id) = self.get(&pair.workspace_slug) {
                pair.namespace_id = Some(id);
            }
        }
    }
}

/// Outcome of the namespace resolution
#[derive(Debug, Default, Clone)]
pub struct NamespaceResolution {
    /// Authenticated identity, owner of the personal namespace
    pub username: String,

    /// Workspaces without a destination namespace
    pub missing: BTreeSet<String>,

    /// Identifiers of the workspaces found on the destination
    pub index: NamespaceIndex,
}

/// Outcome of the namespace creation
#[derive(Debug, Default, Clone)]
pub struct NamespaceCreation {
    /// Identifiers of the created groups
    pub created: NamespaceIndex,

    /// Groups whose name was already taken
    pub taken: Vec<String>,
}

/// Find the workspaces with no namespace on the destination
/// # Errors
/// Identity or namespace listing errors
pub(crate) async fn resolve_namespaces(
    destination: &dyn DestinationPlatform,
    pairs: &[WorkspaceProjectPair],
) -> Result<NamespaceResolution, MoverError> {
    let mut missing: BTreeSet<String> = pairs.iter().map(|p| p.workspace_slug.clone()).collect();
    let username = destination.get_username().await?;
    info!("Logged in {} as {username}", destination.get_remote_url());
    missing.remove(&username);

    let index = index_namespaces(destination, &missing).await?;
    for name in index.0.keys() {
        missing.remove(name);
    }
    info!(
        "{} namespaces found, {} missing",
        index.len(),
        missing.len()
    );
    Ok(NamespaceResolution {
        username,
        missing,
        index,
    })
}

/// List every destination namespace and keep the ones named in `wanted`
/// # Errors
/// Namespace listing errors
pub(crate) async fn index_namespaces(
    destination: &dyn DestinationPlatform,
    wanted: &BTreeSet<String>,
) -> Result<NamespaceIndex, MoverError> {
    let mut index = NamespaceIndex::default();
    for namespace in destination.get_all_namespaces().await? {
        debug!("Namespace: {} ({})", namespace.name, namespace.id);
        if wanted.contains(&namespace.name) {
            index.insert(&namespace.name, namespace.id);
        }
    }
    Ok(index)
}

/// Create a private group for every missing namespace
/// # Errors
/// Any creation error other than a name already taken
pub(crate) async fn create_missing_namespaces(
    destination: &dyn DestinationPlatform,
    missing: &BTreeSet<String>,
    dry_run: bool,
) -> Result<NamespaceCreation, MoverError> {
    let mut creation = NamespaceCreation::default();
    for name in missing {
        if dry_run {
            info!("Would create group {name}");
            continue;
        }
        info!("Creating group {name}");
        match destination.create_group(name).await {
            Ok(group) => creation.created.insert(name, group.id),
            Err(e) if e.is_already_taken() => {
                warn!("Group {name} already exists: {e}");
                creation.taken.push(name.clone());
            }
            Err(e) => return Err(e),
        }
    }
    Ok(creation)
}

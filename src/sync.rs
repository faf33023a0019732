//! Mirror repositories from the source to the destination
use std::{
    fmt,
    fs::{create_dir, remove_dir_all},
    path::{Path, PathBuf},
};

use log::{error, info, warn};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::{
    errors::MoverError,
    git::GitTransport,
    inventory::WorkspaceProjectPair,
    platform::{DestinationPlatform, SourcePlatform},
    shutdown::Shutdown,
    utils::redact_url,
};

/// Remote name used for the source, then for the destination
const REMOTE_NAME: &str = "origin";

/// Name of the clone inside the run directory, reused by every repository
const MIRROR_DIR: &str = "mirror.git";

/// Steps of the copy of one repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStep {
    /// Mirror clone from the source
    Clone,
    /// Removal of the source remote
    Rebind,
    /// Addition of the destination remote
    Bind,
    /// Push of every ref
    Push,
    /// Removal of the local clone
    Cleanup,
}

impl fmt::Display for CopyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyStep::Clone => write!(f, "clone"),
            CopyStep::Rebind => write!(f, "rebind"),
            CopyStep::Bind => write!(f, "bind"),
            CopyStep::Push => write!(f, "push"),
            CopyStep::Cleanup => write!(f, "cleanup"),
        }
    }
}

/// A repository whose copy failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedCopy {
    /// Source workspace
    pub workspace_slug: String,

    /// Source repository
    pub project_slug: String,

    /// First step that failed
    pub step: CopyStep,

    /// Error message
    pub reason: String,
}

/// Outcome of the copy stage
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CopyReport {
    /// Repositories fully copied, as `workspace/project`
    pub copied: Vec<String>,

    /// Repositories skipped because the destination holds data
    pub skipped: usize,

    /// Repositories whose copy failed
    pub failed: Vec<FailedCopy>,

    /// Repositories left untouched because of an interruption
    pub not_attempted: usize,

    /// Whether the copy stopped early
    pub interrupted: bool,
}

/// Run directory holding the local clone
#[derive(Debug)]
pub struct ScratchDir {
    /// Directory unique to the run
    root: PathBuf,
}

impl ScratchDir {
    /// Create a run directory in the system temporary directory
    /// # Errors
    /// Error if the directory can't be created
    pub fn new() -> Result<Self, MoverError> {
        Self::new_in(&std::env::temp_dir())
    }

    /// Create a run directory in `parent`
    /// # Errors
    /// Error if the directory can't be created
    pub fn new_in(parent: &Path) -> Result<Self, MoverError> {
        let rand_string: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(char::from)
            .collect();
        let root = parent.join(format!("bucket-mover-{rand_string}"));
        create_dir(&root)?;
        Ok(Self { root })
    }

    /// Run directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the clone of the repository being copied
    pub fn repo_path(&self) -> PathBuf {
        self.root.join(MIRROR_DIR)
    }

    /// Remove the run directory
    /// # Errors
    /// Error if the directory can't be removed
    pub fn cleanup(self) -> Result<(), MoverError> {
        remove_dir_all(&self.root)?;
        Ok(())
    }
}

/// Everything a run needs
pub(crate) struct MigrationContext<'a> {
    /// Platform the repositories are cloned from
    pub source: &'a dyn SourcePlatform,

    /// Platform the repositories are pushed to
    pub destination: &'a dyn DestinationPlatform,

    /// Git implementation
    pub git: &'a dyn GitTransport,

    /// Local storage
    pub scratch: &'a ScratchDir,

    /// Interruption flag, checked between repositories
    pub shutdown: &'a Shutdown,

    /// Only list what would be copied
    pub dry_run: bool,
}

/// Copy every repository whose destination holds no data, one at a time
///
/// Never fails: each failure is recorded and the next repository is attempted.
pub(crate) async fn copy_repos(
    ctx: &MigrationContext<'_>,
    pairs: &[WorkspaceProjectPair],
) -> CopyReport {
    let mut report = CopyReport::default();
    let todo: Vec<&WorkspaceProjectPair> = pairs.iter().filter(|p| !p.full_repo).collect();
    report.skipped = pairs.len() - todo.len();
    info!(
        "{} repositories to copy, {} already populated",
        todo.len(),
        report.skipped
    );
    let total = todo.len();
    for (idx, pair) in todo.into_iter().enumerate() {
        let prefix = format!("[{}/{total}] {}", idx + 1, pair.path());
        if ctx.shutdown.is_requested() {
            report.interrupted = true;
            report.not_attempted = total - idx;
            warn!("Interrupted, {} repositories not attempted", report.not_attempted);
            break;
        }
        if ctx.dry_run {
            info!("{prefix}: would copy");
            continue;
        }
        match copy_one_repo(ctx, pair, &prefix).await {
            Ok(()) => {
                info!("{prefix}: done");
                report.copied.push(pair.path());
            }
            Err((step, e)) => {
                error!("{prefix}: {step} failed: {e}");
                report.failed.push(FailedCopy {
                    workspace_slug: pair.workspace_slug.clone(),
                    project_slug: pair.project_slug.clone(),
                    step,
                    reason: e.to_string(),
                });
            }
        }
    }
    for failed in &report.failed {
        error!(
            "Failed: {}/{} ({}): {}",
            failed.workspace_slug, failed.project_slug, failed.step, failed.reason
        );
    }
    report
}

/// Copy one repository and remove its clone whatever happened
async fn copy_one_repo(
    ctx: &MigrationContext<'_>,
    pair: &WorkspaceProjectPair,
    prefix: &str,
) -> Result<(), (CopyStep, MoverError)> {
    let path = ctx.scratch.repo_path();
    let outcome = mirror_repo(ctx, pair, &path, prefix).await;
    info!("{prefix}: deleting {}", path.display());
    let cleanup = ctx.git.remove_scratch(&path).await;
    match (outcome, cleanup) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(e)) => Err((CopyStep::Cleanup, e)),
        (Err(failure), Ok(())) => Err(failure),
        (Err((step, e)), Err(cleanup_error)) => Err((
            step,
            MoverError::from(format!("{e} (cleanup also failed: {cleanup_error})")),
        )),
    }
}

/// Clone, rebind, bind and push
async fn mirror_repo(
    ctx: &MigrationContext<'_>,
    pair: &WorkspaceProjectPair,
    path: &Path,
    prefix: &str,
) -> Result<(), (CopyStep, MoverError)> {
    let at = |step: CopyStep| move |e: MoverError| (step, e);

    let source_url = ctx
        .source
        .clone_url(&pair.workspace_slug, &pair.project_slug)
        .map_err(at(CopyStep::Clone))?;
    if path.exists() {
        return Err((
            CopyStep::Clone,
            format!("'{}' already exists", path.display()).into(),
        ));
    }
    info!("{prefix}: git clone {}", redact_url(&source_url));
    ctx.git
        .clone_mirror(&source_url, path)
        .await
        .map_err(at(CopyStep::Clone))?;

    info!("{prefix}: removing remote {REMOTE_NAME}");
    ctx.git
        .remove_remote(path, REMOTE_NAME)
        .await
        .map_err(at(CopyStep::Rebind))?;

    let destination_url = ctx
        .destination
        .push_url(&pair.workspace_slug, &pair.project_slug)
        .map_err(at(CopyStep::Bind))?;
    info!("{prefix}: adding remote {REMOTE_NAME} {}", redact_url(&destination_url));
    ctx.git
        .add_remote(path, REMOTE_NAME, &destination_url)
        .await
        .map_err(at(CopyStep::Bind))?;

    info!("{prefix}: git push {}", redact_url(&destination_url));
    ctx.git
        .push_all(path, REMOTE_NAME)
        .await
        .map_err(at(CopyStep::Push))?;
    Ok(())
}

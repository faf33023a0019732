//! Utility functions
use log::{error, info, warn};
use url::Url;

use crate::bitbucket::config::BitbucketConfig;
use crate::config::MoverConfig;
use crate::errors::{MoverError, MoverErrorKind};
use crate::gitlab::config::GitlabConfig;
use crate::inventory::read_inventory;
use crate::namespaces::{create_missing_namespaces, index_namespaces, resolve_namespaces};
use crate::platform::{DestinationPlatform, SourcePlatform};
use crate::projects::{provision_projects, ProjectProvisioning};
use crate::shutdown::Shutdown;
use crate::sync::{copy_repos, CopyReport, MigrationContext, ScratchDir};

/// Outcome of a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Repositories found on the source
    pub repositories: usize,

    /// Groups created on the destination
    pub namespaces_created: usize,

    /// Project provisioning outcome
    pub projects: ProjectProvisioning,

    /// Copy outcome
    pub copy: CopyReport,
}

impl MigrationSummary {
    /// Whether some repository could not be copied
    pub fn has_failures(&self) -> bool {
        !self.copy.failed.is_empty()
    }
}

/// Run the whole pipeline: inventory, namespaces, projects, copy
/// # Errors
/// Any error outside of the copy of a single repository
pub(crate) async fn run_migration(
    ctx: &MigrationContext<'_>,
) -> Result<MigrationSummary, MoverError> {
    let mut pairs = read_inventory(ctx.source).await?;
    let mut summary = MigrationSummary {
        repositories: pairs.len(),
        ..Default::default()
    };

    let resolution = resolve_namespaces(ctx.destination, &pairs).await?;
    if ctx.shutdown.is_requested() {
        return Ok(interrupted(summary, pairs.len()));
    }
    let mut index = resolution.index;
    let creation =
        create_missing_namespaces(ctx.destination, &resolution.missing, ctx.dry_run).await?;
    summary.namespaces_created = creation.created.len();
    index.merge(&creation.created);
    if !creation.taken.is_empty() {
        // created concurrently, their identifiers are only known from a new listing
        let taken = creation.taken.iter().cloned().collect();
        index.merge(&index_namespaces(ctx.destination, &taken).await?);
    }
    index.apply(&mut pairs);
    if ctx.shutdown.is_requested() {
        return Ok(interrupted(summary, pairs.len()));
    }

    summary.projects = provision_projects(
        ctx.destination,
        &mut pairs,
        &resolution.username,
        &resolution.missing,
        ctx.dry_run,
    )
    .await?;
    summary.copy = copy_repos(ctx, &pairs).await;
    Ok(summary)
}

/// Summary of a run stopped before the copy stage
fn interrupted(mut summary: MigrationSummary, not_attempted: usize) -> MigrationSummary {
    warn!("Interrupted, nothing more will be created or copied");
    summary.copy.interrupted = true;
    summary.copy.not_attempted = not_attempted;
    summary
}

/// Log the outcome of a run
fn log_summary(summary: &MigrationSummary) {
    info!("Repositories on source: {}", summary.repositories);
    info!("Groups created: {}", summary.namespaces_created);
    info!(
        "Projects created: {} (existing: {}, taken: {})",
        summary.projects.created, summary.projects.existing, summary.projects.taken
    );
    for path in &summary.projects.unresolved {
        warn!("Not created, unknown namespace: {path}");
    }
    info!(
        "Repositories copied: {} (already populated: {})",
        summary.copy.copied.len(),
        summary.copy.skipped
    );
    if summary.copy.interrupted {
        warn!("Interrupted, {} repositories not attempted", summary.copy.not_attempted);
    }
    if summary.has_failures() {
        error!("Repositories failed: {}", summary.copy.failed.len());
    }
}

/// Main function to move the repositories
/// # Errors
/// Error if an error happens outside of the copy of a single repository
pub async fn main_sync(config: MoverConfig) -> Result<MigrationSummary, MoverError> {
    let mut config = config;
    let source_platform = BitbucketConfig::get_plateform(&mut config)?;
    info!("Chosen {} as source", source_platform.get_remote_url());
    let destination_platform = GitlabConfig::get_plateform(&mut config)?;
    info!(
        "Chosen {} as destination",
        destination_platform.get_remote_url()
    );
    if config.cli_args.dry_run {
        info!("Dry run, nothing will be created or copied");
    }
    let git = config.cli_args.transport.transport();
    let scratch = ScratchDir::new()?;
    let shutdown = Shutdown::listen();
    let ctx = MigrationContext {
        source: &source_platform,
        destination: &destination_platform,
        git: git.as_ref(),
        scratch: &scratch,
        shutdown: &shutdown,
        dry_run: config.cli_args.dry_run,
    };
    let result = run_migration(&ctx).await;

    info!("Cleaning up {}", scratch.root().display());
    if let Err(e) = scratch.cleanup() {
        warn!("Unable to clean up: {e}");
    }
    let summary = result?;
    log_summary(&summary);
    Ok(summary)
}

/// Hide the password of a URL
pub(crate) fn redact_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("***"));
            }
            parsed.to_string()
        }
        Err(_) => redact_userinfo(url),
    }
}

/// Hide the user info of every URL found in a text
pub(crate) fn redact_userinfo(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("://") {
        let (head, tail) = rest.split_at(pos + 3);
        result.push_str(head);
        let end = tail
            .find(|c: char| c == '/' || c == '\'' || c == '"' || c.is_whitespace())
            .unwrap_or(tail.len());
        let authority = &tail[..end];
        match authority.rfind('@') {
            Some(at) => {
                result.push_str("***");
                result.push_str(&authority[at..]);
            }
            None => result.push_str(authority),
        }
        rest = &tail[end..];
    }
    result.push_str(rest);
    result
}

/// Get input from the user
pub(crate) fn input() -> Result<String, MoverError> {
    use std::io::{stdin, stdout, Write};
    let mut s = String::new();
    let _ = stdout().flush();
    stdin()
        .read_line(&mut s)
        .map_err(|e| MoverError::new(MoverErrorKind::Input).with_source(e))?;
    if let Some('\n') = s.chars().next_back() {
        s.pop();
    }
    if let Some('\r') = s.chars().next_back() {
        s.pop();
    }
    Ok(s)
}

/// Get password from the user
pub(crate) fn get_password() -> Result<String, MoverError> {
    rpassword::read_password().map_err(|e| MoverError::new(MoverErrorKind::Input).with_source(e))
}

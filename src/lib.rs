//! # bucket-mover
//!
//! Move Bitbucket workspaces and repositories to GitLab groups and projects
//!
//! ## Usage
//!
//! ```txt
//! Usage: bucket-mover [OPTIONS]
//!
//! Options:
//!      --bitbucket-username <BITBUCKET_USERNAME>  Bitbucket username [env: BITBUCKET_USERNAME=]
//!      --bitbucket-token <BITBUCKET_TOKEN>        Bitbucket API token [env: BITBUCKET_API_TOKEN]
//!      --gitlab-url <GITLAB_URL>                  GitLab instance URL [env: GITLAB_URL=]
//!      --gitlab-token <GITLAB_TOKEN>              GitLab personal access token [env: GITLAB_API_TOKEN]
//!  -c, --config <CONFIG>                          Custom configuration file path
//!      --show-config-path                         Show the current config path
//!  -n, --dry-run                                  List what would be created and copied without changing anything
//!  -t, --transport <TRANSPORT>                    Git implementation used to copy the repositories [default: git] [possible values: git, libgit2]
//!      --strict                                   Exit with a non-zero status when a repository could not be copied
//!  -v, --verbose...                               Verbose mode (-v, -vv, -vvv)
//!  -h, --help                                     Print help
//!  -V, --version                                  Print version
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![deny(
    missing_docs,
    clippy::all,
    clippy::missing_docs_in_private_items,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![warn(clippy::multiple_crate_versions)]

pub(crate) mod cli;
pub(crate) mod config;
pub(crate) mod errors;
pub(crate) mod git;
pub(crate) mod inventory;
pub(crate) mod macros;
pub(crate) mod namespaces;
pub(crate) mod platform;
pub(crate) mod projects;
pub(crate) mod shutdown;
pub(crate) mod sync;
pub(crate) mod utils;

mod bitbucket;
mod gitlab;

#[cfg(test)]
mod testing;

pub use cli::{bucket_mover_main, BucketMoverCli};
pub use config::MoverConfig;
pub use errors::{MoverError, MoverErrorKind};
pub use git::TransportType;
pub use projects::ProjectProvisioning;
pub use sync::{CopyReport, CopyStep, FailedCopy};
pub use utils::{main_sync, MigrationSummary};

//! Command line options for the bucket-mover tool
use crate::{
    config::MoverConfig,
    errors::MoverError,
    git::TransportType,
    utils::{main_sync, MigrationSummary},
};
use clap::Parser;
use std::path::PathBuf;

/// bucket-mover - Move Bitbucket workspaces and repositories to GitLab
#[derive(Parser, Default, Clone, Debug)]
#[command(version, about)]
pub struct BucketMoverCli {
    /// Bitbucket username
    #[arg(long, env = "BITBUCKET_USERNAME")]
    pub bitbucket_username: Option<String>,

    /// Bitbucket API token
    #[arg(long, env = "BITBUCKET_API_TOKEN", hide_env_values = true)]
    pub bitbucket_token: Option<String>,

    /// GitLab instance URL
    #[arg(long, env = "GITLAB_URL")]
    pub gitlab_url: Option<String>,

    /// GitLab personal access token
    #[arg(long, env = "GITLAB_API_TOKEN", hide_env_values = true)]
    pub gitlab_token: Option<String>,

    /// Custom configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show the current config path
    #[arg(long)]
    pub show_config_path: bool,

    /// List what would be created and copied without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Git implementation used to copy the repositories
    #[arg(short, long, value_enum, default_value_t)]
    pub transport: TransportType,

    /// Exit with a non-zero status when a repository could not be copied
    #[arg(long)]
    pub strict: bool,

    /// Verbose mode (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Run the bucket-mover tool with the provided command line options
///
/// Returns `None` when only the config path was requested.
/// # Errors
/// Error if the configuration can't be loaded or the run fails before the copy
pub async fn bucket_mover_main(
    args: BucketMoverCli,
) -> Result<Option<MigrationSummary>, MoverError> {
    let config = MoverConfig::try_new(args)?;
    if config.cli_args.show_config_path {
        println!("{}", config.config_path.display());
        return Ok(None);
    }
    main_sync(config).await.map(Some)
}

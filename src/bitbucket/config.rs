//! Bitbucket configuration
use super::{platform::BitbucketPlatform, BITBUCKET_API_URL, BITBUCKET_URL};
use serde::{Deserialize, Serialize};

use crate::{
    config::MoverConfig,
    errors::MoverError,
    macros::{config_password_wrap, config_value_wrap},
};

/// Bitbucket configuration
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct BitbucketConfig {
    /// Bitbucket username
    pub username: Option<String>,

    /// Bitbucket API token
    pub token: Option<String>,

    /// REST API base URL
    pub api_url: Option<String>,

    /// Host serving git over HTTPS
    pub git_host: Option<String>,
}

impl BitbucketConfig {
    /// Get the bitbucket platform
    /// # Errors
    /// Error if a missing value can't be read or saved
    pub fn get_plateform(config: &mut MoverConfig) -> Result<BitbucketPlatform, MoverError> {
        let username = config_value_wrap!(
            config,
            bitbucket_username,
            bitbucket,
            BitbucketConfig,
            username,
            "your bitbucket username"
        );
        let token = config_password_wrap!(
            config,
            bitbucket_token,
            bitbucket,
            BitbucketConfig,
            token,
            "your bitbucket API token (https://id.atlassian.com/manage-profile/security/api-tokens)"
        );
        let section = config.config_data.bitbucket.clone().unwrap_or_default();
        let api_url = section
            .api_url
            .unwrap_or_else(|| BITBUCKET_API_URL.to_string());
        let git_host = section.git_host.unwrap_or_else(|| BITBUCKET_URL.to_string());
        Ok(BitbucketPlatform::new(username, token).with_urls(&api_url, &git_host))
    }
}

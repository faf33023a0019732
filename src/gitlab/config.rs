//! Gitlab configuration
use super::{platform::GitlabPlatform, GITLAB_URL};
use serde::{Deserialize, Serialize};

use crate::{
    config::MoverConfig,
    errors::MoverError,
    macros::config_password_wrap,
};

/// Gitlab configuration
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct GitlabConfig {
    /// Gitlab instance URL
    pub url: Option<String>,

    /// Gitlab token
    pub token: Option<String>,
}

impl GitlabConfig {
    /// Get the gitlab platform
    /// # Errors
    /// Error if a missing value can't be read or saved, or if the URL is invalid
    pub fn get_plateform(config: &mut MoverConfig) -> Result<GitlabPlatform, MoverError> {
        let url = match config.cli_args.gitlab_url.clone() {
            Some(url) => url,
            None => match config.config_data.gitlab.as_ref().and_then(|c| c.url.clone()) {
                Some(url) => url,
                None => GITLAB_URL.to_string(),
            },
        };
        let token = config_password_wrap!(
            config,
            gitlab_token,
            gitlab,
            GitlabConfig,
            token,
            "your gitlab token (https://gitlab.com/-/user_settings/personal_access_tokens)"
        );
        GitlabPlatform::new(&url, token)
    }
}

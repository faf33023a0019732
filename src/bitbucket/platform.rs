//! Bitbucket Platform
use super::{BITBUCKET_API_URL, BITBUCKET_PAGELEN, BITBUCKET_URL};
use crate::{
    bitbucket::repo::{BitbucketPage, BitbucketRepo, BitbucketWorkspace},
    errors::{MoverError, MoverErrorKind},
    platform::{PlatformFuture, PlatformType, SourcePlatform, SourceRepo, Workspace},
};
use log::debug;
use reqwest::{header::ACCEPT, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;
use urlencoding::encode;

/// Bitbucket Platform
#[derive(Default, Debug, Clone)]
pub struct BitbucketPlatform {
    /// Bitbucket username
    username: String,

    /// Bitbucket API token
    token: String,

    /// REST API base URL, without trailing slash
    api_url: String,

    /// Host serving git over HTTPS
    git_host: String,

    /// Reqwest client
    client: reqwest::Client,
}

impl BitbucketPlatform {
    /// Create a new BitbucketPlatform talking to bitbucket.org
    pub(crate) fn new(username: String, token: String) -> Self {
        Self {
            username,
            token,
            api_url: BITBUCKET_API_URL.to_string(),
            git_host: BITBUCKET_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the API base URL and the git host
    pub(crate) fn with_urls(mut self, api_url: &str, git_host: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self.git_host = git_host.trim_end_matches('/').to_string();
        self
    }

    /// Fetch one page of a listing
    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<BitbucketPage<T>, MoverError> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.token))
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(error_from_status(status, &text));
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Follow the `next` links until the last page
    async fn get_paginated<T: DeserializeOwned>(
        &self,
        first_url: String,
    ) -> Result<Vec<T>, MoverError> {
        let mut items = vec![];
        let mut next = Some(first_url);
        let mut page = 1;
        while let Some(url) = next {
            let result: BitbucketPage<T> = self.get_page(&url).await?;
            debug!("Requested bitbucket (page {page}): {}", result.values.len());
            items.extend(result.values);
            next = result.next;
            page += 1;
        }
        Ok(items)
    }
}

/// Map a failed Bitbucket response to an error kind
fn error_from_status(status: StatusCode, text: &str) -> MoverError {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => MoverErrorKind::Auth,
        StatusCode::NOT_FOUND => MoverErrorKind::NotFound,
        _ => MoverErrorKind::Api,
    };
    MoverError::new(kind)
        .with_platform(PlatformType::Bitbucket)
        .with_text(&format!("{status}: {text}"))
}

impl SourcePlatform for BitbucketPlatform {
    fn get_remote_url(&self) -> &str {
        &self.git_host
    }

    fn get_all_workspaces(&self) -> PlatformFuture<'_, Vec<Workspace>> {
        Box::pin(async move {
            let url = format!("{}/workspaces?pagelen={BITBUCKET_PAGELEN}", self.api_url);
            let workspaces: Vec<BitbucketWorkspace> = self.get_paginated(url).await?;
            Ok(workspaces.into_iter().map(Into::into).collect())
        })
    }

    fn get_workspace_repos<'a>(
        &'a self,
        workspace: &'a str,
    ) -> PlatformFuture<'a, Vec<SourceRepo>> {
        Box::pin(async move {
            let url = format!(
                "{}/repositories/{}?pagelen={BITBUCKET_PAGELEN}",
                self.api_url,
                encode(workspace)
            );
            let repos: Vec<BitbucketRepo> = self.get_paginated(url).await?;
            Ok(repos.into_iter().map(Into::into).collect())
        })
    }

    fn clone_url(&self, workspace: &str, repo: &str) -> Result<String, MoverError> {
        let mut url = Url::parse(&format!("https://{}/{workspace}/{repo}.git", self.git_host))?;
        let credentials_error = || {
            MoverError::new(MoverErrorKind::Url)
                .with_platform(PlatformType::Bitbucket)
                .with_text("Unable to embed credentials in clone URL")
        };
        url.set_username(&self.username)
            .map_err(|_| credentials_error())?;
        url.set_password(Some(&self.token))
            .map_err(|_| credentials_error())?;
        Ok(url.to_string())
    }
}

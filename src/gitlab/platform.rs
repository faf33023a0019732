//! Gitlab Platform
use super::{GITLAB_PER_PAGE, GITLAB_TOKEN_HEADER, GITLAB_TOKEN_USERNAME, GITLAB_URL};
use crate::{
    errors::{MoverError, MoverErrorKind},
    gitlab::repo::{
        GitlabGroupCreation, GitlabMessage, GitlabNamespace, GitlabProject,
        GitlabProjectCreation, GitlabUser, PRIVATE_VISIBILITY,
    },
    platform::{DestinationPlatform, Namespace, PlatformFuture, PlatformType, Project},
};
use log::debug;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Response, StatusCode,
};
use serde::de::DeserializeOwned;
use url::Url;
use urlencoding::encode;

/// Fragment GitLab puts in validation errors for a name or path in use
const ALREADY_TAKEN: &str = "has already been taken";

/// Message of a 404 on a project that does not exist
const PROJECT_NOT_FOUND: &str = "404 Project Not Found";

/// Gitlab Platform
#[derive(Default, Debug, Clone)]
pub struct GitlabPlatform {
    /// Instance URL, without trailing slash
    url: String,

    /// Instance host, used for display
    host: String,

    /// Gitlab token
    token: String,

    /// Reqwest client
    client: reqwest::Client,
}

impl GitlabPlatform {
    /// Create a new GitlabPlatform
    /// # Errors
    /// Error if the instance URL is not a valid URL
    pub(crate) fn new(url: &str, token: String) -> Result<Self, MoverError> {
        let url = url.trim_end_matches('/').to_string();
        let host = Url::parse(&url)?
            .host_str()
            .unwrap_or(GITLAB_URL)
            .to_string();
        Ok(Self {
            url,
            host,
            token,
            client: reqwest::Client::new(),
        })
    }

    /// URL of an API endpoint
    fn api(&self, endpoint: &str) -> String {
        format!("{}/api/v4/{endpoint}", self.url)
    }

    /// Decode a response, classifying failures
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, MoverError> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(error_from_status(status, &text));
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// GET an endpoint
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, MoverError> {
        let response = self
            .client
            .get(self.api(endpoint))
            .header(GITLAB_TOKEN_HEADER, &self.token)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// POST a JSON body to an endpoint
    async fn post<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, MoverError> {
        let response = self
            .client
            .post(self.api(endpoint))
            .header(GITLAB_TOKEN_HEADER, &self.token)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }
}

/// Whether a 404 body is GitLab's own missing project message
fn is_project_not_found(text: &str) -> bool {
    match serde_json::from_str::<GitlabMessage>(text) {
        Ok(GitlabMessage {
            message: serde_json::Value::String(message),
        }) => message == PROJECT_NOT_FOUND,
        _ => false,
    }
}

/// Map a failed GitLab response to an error kind
fn error_from_status(status: StatusCode, text: &str) -> MoverError {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => MoverErrorKind::Auth,
        StatusCode::NOT_FOUND if is_project_not_found(text) => MoverErrorKind::NotFound,
        StatusCode::NOT_FOUND => MoverErrorKind::AmbiguousNotFound,
        _ if text.contains(ALREADY_TAKEN) => MoverErrorKind::AlreadyTaken,
        _ => MoverErrorKind::Api,
    };
    MoverError::new(kind)
        .with_platform(PlatformType::Gitlab)
        .with_text(&format!("{status}: {text}"))
}

impl DestinationPlatform for GitlabPlatform {
    fn get_remote_url(&self) -> &str {
        &self.host
    }

    fn get_username(&self) -> PlatformFuture<'_, String> {
        Box::pin(async move {
            let user: GitlabUser = self.get("user", &[]).await?;
            Ok(user.username)
        })
    }

    fn get_all_namespaces(&self) -> PlatformFuture<'_, Vec<Namespace>> {
        Box::pin(async move {
            let mut page: usize = 1;
            let mut all_namespaces = vec![];
            loop {
                let page_str = page.to_string();
                let namespaces: Vec<GitlabNamespace> = self
                    .get(
                        "namespaces",
                        &[("per_page", GITLAB_PER_PAGE), ("page", &page_str)],
                    )
                    .await?;
                debug!("Requested gitlab namespaces (page {page}): {}", namespaces.len());
                if namespaces.is_empty() {
                    break;
                }
                all_namespaces.extend(namespaces.into_iter().map(Namespace::from));
                page += 1;
            }
            Ok(all_namespaces)
        })
    }

    fn get_project<'a>(&'a self, path: &'a str) -> PlatformFuture<'a, Project> {
        Box::pin(async move {
            let endpoint = format!("projects/{}", encode(path));
            let project: GitlabProject = self.get(&endpoint, &[]).await?;
            Ok(project.into())
        })
    }

    fn create_project<'a>(
        &'a self,
        name: &'a str,
        namespace_id: Option<u64>,
    ) -> PlatformFuture<'a, Project> {
        Box::pin(async move {
            let json_body = GitlabProjectCreation {
                name: name.to_string(),
                path: name.to_string(),
                namespace_id,
                visibility: PRIVATE_VISIBILITY.to_string(),
            };
            let project: GitlabProject = self.post("projects", &json_body).await?;
            Ok(project.into())
        })
    }

    fn create_group<'a>(&'a self, name: &'a str) -> PlatformFuture<'a, Namespace> {
        Box::pin(async move {
            let json_body = GitlabGroupCreation {
                name: name.to_string(),
                path: name.to_string(),
                visibility: PRIVATE_VISIBILITY.to_string(),
            };
            let group: GitlabNamespace = self.post("groups", &json_body).await?;
            Ok(group.into())
        })
    }

    fn push_url(&self, namespace: &str, project: &str) -> Result<String, MoverError> {
        let mut url = Url::parse(&format!("{}/{namespace}/{project}.git", self.url))?;
        let credentials_error = || {
            MoverError::new(MoverErrorKind::Url)
                .with_platform(PlatformType::Gitlab)
                .with_text("Unable to embed credentials in push URL")
        };
        url.set_username(GITLAB_TOKEN_USERNAME)
            .map_err(|_| credentials_error())?;
        url.set_password(Some(&self.token))
            .map_err(|_| credentials_error())?;
        Ok(url.to_string())
    }
}

//! GitLab API module.
pub(crate) mod config;
pub(crate) mod platform;
pub(crate) mod repo;

/// Default GitLab instance
const GITLAB_URL: &str = "https://gitlab.com";

/// Header carrying the personal access token
const GITLAB_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Username used with a token in git URLs
const GITLAB_TOKEN_USERNAME: &str = "oauth2";

/// Page size requested on every listing
const GITLAB_PER_PAGE: &str = "100";

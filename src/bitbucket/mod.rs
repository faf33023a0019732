//! Bitbucket Cloud API module.
pub(crate) mod config;
pub(crate) mod platform;
pub(crate) mod repo;

/// Bitbucket git host
const BITBUCKET_URL: &str = "bitbucket.org";

/// Bitbucket REST API base URL
const BITBUCKET_API_URL: &str = "https://api.bitbucket.org/2.0";

/// Page size requested on every listing
const BITBUCKET_PAGELEN: &str = "100";

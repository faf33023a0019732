//! Error handling for the bucket-mover crate.
use std::{error::Error as StdError, fmt};

use crate::platform::PlatformType;

/// Error type for the bucket-mover crate.
#[derive(Debug)]
pub struct MoverError {
    /// Inner error.
    inner: Box<Inner>,
}

impl MoverError {
    /// Create a new error.
    pub(crate) fn new(kind: MoverErrorKind) -> Self {
        Self {
            inner: Box::new(Inner {
                kind,
                source: None,
                platform: None,
            }),
        }
    }

    /// Create a new custom error wrapping a source error.
    pub(crate) fn new_with_source<E>(text: &str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::new(MoverErrorKind::Custom(text.to_string())).with_source(source)
    }

    /// Attach a textual source.
    pub(crate) fn with_text(self, text: &str) -> Self {
        self.with_source(std::io::Error::other(text.to_string()))
    }

    /// Attach a source error.
    pub(crate) fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        self.inner.source = Some(source.into());
        self
    }

    /// Attach the platform the error comes from.
    pub(crate) fn with_platform(mut self, platform: PlatformType) -> Self {
        self.inner.platform = Some(platform);
        self
    }

    /// Kind of the error
    pub fn kind(&self) -> &MoverErrorKind {
        &self.inner.kind
    }

    /// Platform that produced the error, if any
    pub fn platform(&self) -> Option<&PlatformType> {
        self.inner.platform.as_ref()
    }

    /// Whether the remote resource is missing.
    ///
    /// The ambiguous variant (a 404 the destination did not describe) counts as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.inner.kind,
            MoverErrorKind::NotFound | MoverErrorKind::AmbiguousNotFound
        )
    }

    /// Whether a create call was refused because the name or path is in use
    pub fn is_already_taken(&self) -> bool {
        matches!(self.inner.kind, MoverErrorKind::AlreadyTaken)
    }
}

/// Type alias for a boxed error.
pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Inner error type for the bucket-mover crate.
#[derive(Debug)]
struct Inner {
    /// Error kind.
    kind: MoverErrorKind,

    /// Platform error
    platform: Option<PlatformType>,

    /// Source error.
    source: Option<BoxError>,
}

/// Kind of [`MoverError`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoverErrorKind {
    /// Error related to the reqwest crate.
    Reqwest,

    /// Error related to serde.
    Serde,

    /// Error related to the configuration file format.
    Toml,

    /// Malformed URL.
    Url,

    /// Filesystem or process error.
    Io,

    /// Error related to Git2.
    Git2,

    /// A `git` process exited unsuccessfully.
    Git,

    /// Error while reading user input.
    Input,

    /// Credentials were refused.
    Auth,

    /// Unexpected API answer.
    Api,

    /// The requested resource does not exist.
    NotFound,

    /// A 404 without the usual not-found description.
    AmbiguousNotFound,

    /// Name or path already in use on the destination.
    AlreadyTaken,

    /// Free-form error.
    Custom(String),
}

impl fmt::Display for MoverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.kind {
            MoverErrorKind::Custom(text) => write!(f, "{text}")?,
            kind => write!(f, "{kind:?}")?,
        }
        if let Some(platform) = &self.inner.platform {
            write!(f, " ({platform})")?;
        }
        if let Some(source) = &self.inner.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl StdError for MoverError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| &**e as _)
    }
}

impl From<reqwest::Error> for MoverError {
    fn from(e: reqwest::Error) -> Self {
        Self::new(MoverErrorKind::Reqwest).with_source(e)
    }
}

impl From<serde_json::Error> for MoverError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(MoverErrorKind::Serde).with_source(e)
    }
}

impl From<toml::de::Error> for MoverError {
    fn from(e: toml::de::Error) -> Self {
        Self::new(MoverErrorKind::Toml).with_source(e)
    }
}

impl From<toml::ser::Error> for MoverError {
    fn from(e: toml::ser::Error) -> Self {
        Self::new(MoverErrorKind::Toml).with_source(e)
    }
}

impl From<url::ParseError> for MoverError {
    fn from(e: url::ParseError) -> Self {
        Self::new(MoverErrorKind::Url).with_source(e)
    }
}

impl From<std::io::Error> for MoverError {
    fn from(e: std::io::Error) -> Self {
        Self::new(MoverErrorKind::Io).with_source(e)
    }
}

impl From<git2::Error> for MoverError {
    fn from(e: git2::Error) -> Self {
        Self::new(MoverErrorKind::Git2).with_source(e)
    }
}

impl From<tokio::task::JoinError> for MoverError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::new(MoverErrorKind::Io).with_source(e)
    }
}

impl From<&str> for MoverError {
    fn from(text: &str) -> Self {
        Self::new(MoverErrorKind::Custom(text.to_string()))
    }
}

impl From<String> for MoverError {
    fn from(text: String) -> Self {
        Self::new(MoverErrorKind::Custom(text))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn both_not_found_kinds_count_as_missing() {
        assert!(MoverError::new(MoverErrorKind::NotFound).is_not_found());
        assert!(MoverError::new(MoverErrorKind::AmbiguousNotFound).is_not_found());
        assert!(!MoverError::new(MoverErrorKind::Api).is_not_found());
        assert!(!MoverError::new(MoverErrorKind::AlreadyTaken).is_not_found());
    }

    #[test]
    fn display_includes_platform_and_source() {
        let err = MoverError::new(MoverErrorKind::Api)
            .with_platform(PlatformType::Gitlab)
            .with_text("500 Internal Server Error");
        assert_eq!(err.to_string(), "Api (gitlab): 500 Internal Server Error");

        let err: MoverError = "Unable to open".into();
        assert_eq!(err.to_string(), "Unable to open");
    }
}

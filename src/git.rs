//! Git transport used by the mirror copy
use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use clap::ValueEnum;
use git2::{Cred, FetchOptions, PushOptions, RemoteCallbacks, Repository};
use log::{debug, trace};
use tokio::{process::Command, task::spawn_blocking};
use url::Url;

use crate::{
    errors::{MoverError, MoverErrorKind},
    platform::PlatformFuture,
    utils::redact_userinfo,
};

/// Refspec fetching every ref of the remote as-is
const MIRROR_REFSPEC: &str = "+refs/*:refs/*";

/// Operations the mirror copy needs from git
pub trait GitTransport: Sync + Send {
    /// Full mirror clone of `url` into `path`
    fn clone_mirror<'a>(&'a self, url: &'a str, path: &'a Path) -> PlatformFuture<'a, ()>;

    /// Remove the remote `name` of the repository at `path`
    fn remove_remote<'a>(&'a self, path: &'a Path, name: &'a str) -> PlatformFuture<'a, ()>;

    /// Add the remote `name` pointing at `url`
    fn add_remote<'a>(
        &'a self,
        path: &'a Path,
        name: &'a str,
        url: &'a str,
    ) -> PlatformFuture<'a, ()>;

    /// Push every ref to the remote `name`
    fn push_all<'a>(&'a self, path: &'a Path, name: &'a str) -> PlatformFuture<'a, ()>;

    /// Remove the local clone, a missing path is not an error
    fn remove_scratch<'a>(&'a self, path: &'a Path) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            match tokio::fs::remove_dir_all(path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }
}

/// Available transports
#[derive(ValueEnum, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TransportType {
    /// Run the `git` executable
    #[default]
    Git,
    /// Use libgit2 in-process
    Libgit2,
}

impl TransportType {
    /// Build the transport
    pub fn transport(self) -> Box<dyn GitTransport> {
        match self {
            TransportType::Git => Box::new(GitCommand),
            TransportType::Libgit2 => Box::new(LibGit2),
        }
    }
}

/// Transport running the `git` executable
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCommand;

impl GitCommand {
    /// Run git with `args`, in `dir` when given
    async fn run(dir: Option<&Path>, args: &[&str]) -> Result<(), MoverError> {
        let mut command = Command::new("git");
        command
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = dir {
            command.current_dir(dir);
        }
        let output = command.output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            trace!("{}", redact_userinfo(stdout.trim()));
        }
        if !output.status.success() {
            return Err(MoverError::new(MoverErrorKind::Git).with_text(&format!(
                "git {} exited with {}: {}",
                args.first().unwrap_or(&""),
                output.status,
                redact_userinfo(stderr.trim())
            )));
        }
        if !stderr.trim().is_empty() {
            debug!("{}", redact_userinfo(stderr.trim()));
        }
        Ok(())
    }
}

impl GitTransport for GitCommand {
    fn clone_mirror<'a>(&'a self, url: &'a str, path: &'a Path) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            let path = path.to_string_lossy().into_owned();
            Self::run(None, &["clone", "--mirror", url, path.as_str()]).await
        })
    }

    fn remove_remote<'a>(&'a self, path: &'a Path, name: &'a str) -> PlatformFuture<'a, ()> {
        Box::pin(async move { Self::run(Some(path), &["remote", "remove", name]).await })
    }

    fn add_remote<'a>(
        &'a self,
        path: &'a Path,
        name: &'a str,
        url: &'a str,
    ) -> PlatformFuture<'a, ()> {
        Box::pin(async move { Self::run(Some(path), &["remote", "add", name, url]).await })
    }

    fn push_all<'a>(&'a self, path: &'a Path, name: &'a str) -> PlatformFuture<'a, ()> {
        Box::pin(async move { Self::run(Some(path), &["push", "--mirror", name]).await })
    }
}

/// Transport using libgit2
#[derive(Debug, Default, Clone, Copy)]
pub struct LibGit2;

/// Credentials callback answering with the user info of the URL
fn url_credentials<'a>() -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|url, username_from_url, _allowed| {
        let parsed = Url::parse(url).map_err(|e| git2::Error::from_str(&e.to_string()))?;
        match parsed.password() {
            Some(password) => {
                let username = username_from_url.unwrap_or(parsed.username());
                let password = urlencoding::decode(password)
                    .map_err(|e| git2::Error::from_str(&e.to_string()))?;
                Cred::userpass_plaintext(username, &password)
            }
            None => Err(git2::Error::from_str("No credentials in remote URL")),
        }
    });
    callbacks
}

impl GitTransport for LibGit2 {
    fn clone_mirror<'a>(&'a self, url: &'a str, path: &'a Path) -> PlatformFuture<'a, ()> {
        let url = url.to_string();
        let path = path.to_path_buf();
        Box::pin(async move {
            spawn_blocking(move || -> Result<(), MoverError> {
                if path.exists() {
                    return Err(MoverError::new(MoverErrorKind::Io)
                        .with_text(&format!("'{}' already exists", path.display())));
                }
                let repo = Repository::init_bare(&path)?;
                let mut remote = repo.remote_with_fetch("origin", &url, MIRROR_REFSPEC)?;
                repo.config()?.set_bool("remote.origin.mirror", true)?;
                let mut fetch_opts = FetchOptions::new();
                fetch_opts.remote_callbacks(url_credentials());
                let no_refspecs: &[&str] = &[];
                remote.fetch(no_refspecs, Some(&mut fetch_opts), None)?;
                Ok(())
            })
            .await?
        })
    }

    fn remove_remote<'a>(&'a self, path: &'a Path, name: &'a str) -> PlatformFuture<'a, ()> {
        let path = path.to_path_buf();
        let name = name.to_string();
        Box::pin(async move {
            spawn_blocking(move || -> Result<(), MoverError> {
                let repo = Repository::open_bare(&path)?;
                // libgit2 deletes the refs matched by the fetch refspecs, which for a
                // mirror is every ref
                repo.config()?
                    .remove_multivar(&format!("remote.{name}.fetch"), ".*")?;
                repo.remote_delete(&name)?;
                Ok(())
            })
            .await?
        })
    }

    fn add_remote<'a>(
        &'a self,
        path: &'a Path,
        name: &'a str,
        url: &'a str,
    ) -> PlatformFuture<'a, ()> {
        let path = path.to_path_buf();
        let name = name.to_string();
        let url = url.to_string();
        Box::pin(async move {
            spawn_blocking(move || -> Result<(), MoverError> {
                Repository::open_bare(&path)?.remote(&name, &url)?;
                Ok(())
            })
            .await?
        })
    }

    fn push_all<'a>(&'a self, path: &'a Path, name: &'a str) -> PlatformFuture<'a, ()> {
        let path: PathBuf = path.to_path_buf();
        let name = name.to_string();
        Box::pin(async move {
            spawn_blocking(move || -> Result<(), MoverError> {
                let repo = Repository::open_bare(&path)?;
                let mut refspecs = vec![];
                for reference in repo.references()? {
                    let reference = reference?;
                    if let Some(ref_name) = reference.name() {
                        if reference.symbolic_target().is_none() {
                            refspecs.push(format!("+{ref_name}:{ref_name}"));
                        }
                    }
                }
                debug!("Pushing {} refs", refspecs.len());
                let mut remote = repo.find_remote(&name)?;
                let mut opts = PushOptions::new();
                opts.remote_callbacks(url_credentials());
                remote.push(&refspecs, Some(&mut opts))?;
                Ok(())
            })
            .await?
        })
    }
}

//! In-memory platforms and git transport for the pipeline tests
use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::Mutex,
};

use crate::{
    errors::{MoverError, MoverErrorKind},
    git::GitTransport,
    shutdown::Shutdown,
    platform::{
        DestinationPlatform, Namespace, PlatformFuture, Project, SourcePlatform, SourceRepo,
        Workspace,
    },
};

/// Source with fixed workspaces
#[derive(Debug, Default)]
pub(crate) struct FakeSource {
    workspaces: Vec<(Workspace, Vec<SourceRepo>)>,
    failing: HashSet<String>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_workspace(mut self, slug: &str, repos: &[&str]) -> Self {
        let workspace = Workspace {
            slug: slug.to_string(),
            uuid: format!("{{{slug}}}"),
        };
        let repos = repos
            .iter()
            .map(|r| SourceRepo {
                slug: r.to_string(),
            })
            .collect();
        self.workspaces.push((workspace, repos));
        self
    }

    pub(crate) fn failing_workspace(mut self, slug: &str) -> Self {
        self.failing.insert(slug.to_string());
        self
    }
}

impl SourcePlatform for FakeSource {
    fn get_all_workspaces(&self) -> PlatformFuture<'_, Vec<Workspace>> {
        let workspaces = self.workspaces.iter().map(|(w, _)| w.clone()).collect();
        Box::pin(async move { Ok(workspaces) })
    }

    fn get_workspace_repos<'a>(
        &'a self,
        workspace: &'a str,
    ) -> PlatformFuture<'a, Vec<SourceRepo>> {
        Box::pin(async move {
            if self.failing.contains(workspace) {
                return Err(MoverError::new(MoverErrorKind::Api).with_text("listing failed"));
            }
            Ok(self
                .workspaces
                .iter()
                .find(|(w, _)| w.slug == workspace)
                .map(|(_, repos)| repos.clone())
                .unwrap_or_default())
        })
    }

    fn clone_url(&self, workspace: &str, repo: &str) -> Result<String, MoverError> {
        Ok(format!("https://src.example/{workspace}/{repo}.git"))
    }

    fn get_remote_url(&self) -> &str {
        "src.example"
    }
}

#[derive(Debug, Default)]
struct DestinationState {
    namespaces: Vec<Namespace>,
    /// Project emptiness by path
    projects: HashMap<String, bool>,
    /// Groups that exist but only show up in listings once a creation collided
    hidden_groups: HashMap<String, u64>,
    failing_groups: HashSet<String>,
    ambiguous_projects: HashSet<String>,
    taken_projects: HashSet<String>,
    failing_projects: HashSet<String>,
    group_creations: Vec<String>,
    project_creations: Vec<(String, Option<u64>)>,
    next_id: u64,
}

/// Destination keeping its namespaces and projects in memory
#[derive(Debug)]
pub(crate) struct FakeDestination {
    username: String,
    state: Mutex<DestinationState>,
    /// Requested once a group is created
    interrupt: Option<Shutdown>,
}

impl FakeDestination {
    pub(crate) fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            state: Mutex::new(DestinationState {
                next_id: 100,
                ..Default::default()
            }),
            interrupt: None,
        }
    }

    fn with_state(self, f: impl FnOnce(&mut DestinationState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub(crate) fn with_namespace(self, id: u64, name: &str) -> Self {
        self.with_state(|s| {
            s.namespaces.push(Namespace {
                id,
                name: name.to_string(),
            })
        })
    }

    pub(crate) fn with_project(self, path: &str, empty: bool) -> Self {
        self.with_state(|s| {
            s.projects.insert(path.to_string(), empty);
        })
    }

    pub(crate) fn taking_group(self, name: &str) -> Self {
        self.with_state(|s| {
            let id = s.next_id;
            s.next_id += 1;
            s.hidden_groups.insert(name.to_string(), id);
        })
    }

    /// Simulate a Ctrl+C right after the first group creation
    pub(crate) fn interrupting(mut self, shutdown: &Shutdown) -> Self {
        self.interrupt = Some(shutdown.clone());
        self
    }

    pub(crate) fn failing_group(self, name: &str) -> Self {
        self.with_state(|s| {
            s.failing_groups.insert(name.to_string());
        })
    }

    pub(crate) fn ambiguous_project(self, path: &str) -> Self {
        self.with_state(|s| {
            s.ambiguous_projects.insert(path.to_string());
        })
    }

    pub(crate) fn taking_project(self, path: &str) -> Self {
        self.with_state(|s| {
            s.taken_projects.insert(path.to_string());
        })
    }

    pub(crate) fn failing_project(self, path: &str) -> Self {
        self.with_state(|s| {
            s.failing_projects.insert(path.to_string());
        })
    }

    /// Pretend every project received a push
    pub(crate) fn populate_all(&self) {
        let mut state = self.state.lock().unwrap();
        for empty in state.projects.values_mut() {
            *empty = false;
        }
    }

    pub(crate) fn group_creations(&self) -> Vec<String> {
        self.state.lock().unwrap().group_creations.clone()
    }

    pub(crate) fn project_creations(&self) -> Vec<(String, Option<u64>)> {
        self.state.lock().unwrap().project_creations.clone()
    }

    pub(crate) fn project_paths(&self) -> Vec<String> {
        let mut paths: Vec<_> = self.state.lock().unwrap().projects.keys().cloned().collect();
        paths.sort();
        paths
    }
}

fn fake_error(kind: MoverErrorKind, text: &str) -> MoverError {
    MoverError::new(kind).with_text(text)
}

impl DestinationPlatform for FakeDestination {
    fn get_username(&self) -> PlatformFuture<'_, String> {
        Box::pin(async move { Ok(self.username.clone()) })
    }

    fn get_all_namespaces(&self) -> PlatformFuture<'_, Vec<Namespace>> {
        Box::pin(async move { Ok(self.state.lock().unwrap().namespaces.clone()) })
    }

    fn get_project<'a>(&'a self, path: &'a str) -> PlatformFuture<'a, Project> {
        Box::pin(async move {
            let state = self.state.lock().unwrap();
            if state.failing_projects.contains(path) {
                return Err(fake_error(MoverErrorKind::Api, "502 Bad Gateway"));
            }
            match state.projects.get(path) {
                Some(empty) => Ok(Project {
                    id: 1,
                    path_with_namespace: path.to_string(),
                    empty_repo: *empty,
                }),
                None if state.ambiguous_projects.contains(path) => {
                    Err(fake_error(MoverErrorKind::AmbiguousNotFound, "404"))
                }
                None => Err(fake_error(MoverErrorKind::NotFound, "404 Project Not Found")),
            }
        })
    }

    fn create_project<'a>(
        &'a self,
        name: &'a str,
        namespace_id: Option<u64>,
    ) -> PlatformFuture<'a, Project> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state
                .project_creations
                .push((name.to_string(), namespace_id));
            let namespace = match namespace_id {
                None => self.username.clone(),
                Some(id) => match state.namespaces.iter().find(|n| n.id == id) {
                    Some(n) => n.name.clone(),
                    None => return Err(fake_error(MoverErrorKind::Api, "unknown namespace")),
                },
            };
            let path = format!("{namespace}/{name}");
            if state.taken_projects.contains(&path) || state.projects.contains_key(&path) {
                return Err(fake_error(
                    MoverErrorKind::AlreadyTaken,
                    "has already been taken",
                ));
            }
            state.projects.insert(path.clone(), true);
            Ok(Project {
                id: 2,
                path_with_namespace: path,
                empty_repo: true,
            })
        })
    }

    fn create_group<'a>(&'a self, name: &'a str) -> PlatformFuture<'a, Namespace> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.group_creations.push(name.to_string());
            if state.failing_groups.contains(name) {
                return Err(fake_error(MoverErrorKind::Api, "500"));
            }
            if let Some(id) = state.hidden_groups.remove(name) {
                state.namespaces.push(Namespace {
                    id,
                    name: name.to_string(),
                });
                return Err(fake_error(
                    MoverErrorKind::AlreadyTaken,
                    "has already been taken",
                ));
            }
            if state.namespaces.iter().any(|n| n.name == name) {
                return Err(fake_error(
                    MoverErrorKind::AlreadyTaken,
                    "has already been taken",
                ));
            }
            let namespace = Namespace {
                id: state.next_id,
                name: name.to_string(),
            };
            state.next_id += 1;
            state.namespaces.push(namespace.clone());
            if let Some(shutdown) = &self.interrupt {
                shutdown.request();
            }
            Ok(namespace)
        })
    }

    fn push_url(&self, namespace: &str, project: &str) -> Result<String, MoverError> {
        Ok(format!("https://dst.example/{namespace}/{project}.git"))
    }

    fn get_remote_url(&self) -> &str {
        "dst.example"
    }
}

/// Git transport recording the operations it is asked for
#[derive(Debug, Default)]
pub(crate) struct FakeGit {
    calls: Mutex<Vec<String>>,
    failing_clone: Option<String>,
    failing_push: bool,
    failing_cleanup: bool,
}

impl FakeGit {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fail the clone of `workspace/project`
    pub(crate) fn failing_clone(mut self, path: &str) -> Self {
        self.failing_clone = Some(format!("/{path}.git"));
        self
    }

    pub(crate) fn failing_push(mut self) -> Self {
        self.failing_push = true;
        self
    }

    pub(crate) fn failing_cleanup(mut self) -> Self {
        self.failing_cleanup = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl GitTransport for FakeGit {
    fn clone_mirror<'a>(&'a self, url: &'a str, _path: &'a Path) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            self.record(format!("clone {url}"));
            match &self.failing_clone {
                Some(failing) if url.ends_with(failing.as_str()) => {
                    Err(fake_error(MoverErrorKind::Git, "repository not found"))
                }
                _ => Ok(()),
            }
        })
    }

    fn remove_remote<'a>(&'a self, _path: &'a Path, name: &'a str) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            self.record(format!("remove-remote {name}"));
            Ok(())
        })
    }

    fn add_remote<'a>(
        &'a self,
        _path: &'a Path,
        name: &'a str,
        url: &'a str,
    ) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            self.record(format!("add-remote {name} {url}"));
            Ok(())
        })
    }

    fn push_all<'a>(&'a self, _path: &'a Path, name: &'a str) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            self.record(format!("push {name}"));
            if self.failing_push {
                return Err(fake_error(MoverErrorKind::Git, "rejected"));
            }
            Ok(())
        })
    }

    fn remove_scratch<'a>(&'a self, _path: &'a Path) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            self.record("cleanup".to_string());
            if self.failing_cleanup {
                return Err(fake_error(MoverErrorKind::Io, "directory not empty"));
            }
            Ok(())
        })
    }
}

//! In-memory runtime for tests
//!
//! Simulates just enough of docker to exercise the reconciler, launcher,
//! swap and teardown logic: resources with labels, containers with labels,
//! and `compose up` that creates one container per requested service from
//! the labels found in the compose file.

use super::{ComposeUp, ContainerRuntime, ContainerSummary, LabelFilter, ResourceKind};
use crate::compose::{ComposeConfig, ComposeParser};
use crate::error::{DtopError, Result};
use crate::labels::SERVICE_LABEL;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// A recorded runtime call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Exists(ResourceKind, String),
    Create(ResourceKind, String),
    ListResources(ResourceKind),
    RemoveResource(ResourceKind, String),
    ListContainers,
    Stop(Vec<String>),
    Remove(Vec<String>),
    ComposeUp { services: Vec<String>, build: bool },
}

#[derive(Debug, Clone)]
struct FakeContainer {
    summary: ContainerSummary,
    running: bool,
}

#[derive(Debug, Default)]
struct State {
    networks: Vec<(String, HashMap<String, String>)>,
    volumes: Vec<(String, HashMap<String, String>)>,
    containers: Vec<FakeContainer>,
    calls: Vec<Call>,
    artifacts: Vec<PathBuf>,
    definitions: Vec<ComposeConfig>,
    in_use: Vec<String>,
    fail_compose_up: bool,
    fail_create: bool,
    fail_list_resources: bool,
    next_id: usize,
}

/// In-memory container runtime
#[derive(Debug, Default)]
pub struct FakeRuntime {
    state: Mutex<State>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-existing resource, possibly created by someone else
    pub fn add_resource(&self, kind: ResourceKind, name: &str, labels: &[(&str, &str)]) {
        let labels = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut state = self.state.lock().unwrap();
        match kind {
            ResourceKind::Network => state.networks.push((name.to_string(), labels)),
            ResourceKind::Volume => state.volumes.push((name.to_string(), labels)),
        }
    }

    /// Pre-existing container
    pub fn add_container(&self, name: &str, labels: &[(&str, &str)], running: bool) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.next_container_id();
        state.containers.push(FakeContainer {
            summary: ContainerSummary {
                id: id.clone(),
                name: name.to_string(),
                image: "image".to_string(),
                status: status_text(running),
                ports: String::new(),
                labels: labels
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            },
            running,
        });
        id
    }

    /// Make resource removal fail for this name
    pub fn mark_in_use(&self, name: &str) {
        self.state.lock().unwrap().in_use.push(name.to_string());
    }

    /// Make every `compose up` fail
    pub fn fail_compose_up(&self) {
        self.state.lock().unwrap().fail_compose_up = true;
    }

    /// Make every resource creation fail
    pub fn fail_create(&self) {
        self.state.lock().unwrap().fail_create = true;
    }

    /// Make every network and volume listing fail
    pub fn fail_list_resources(&self) {
        self.state.lock().unwrap().fail_list_resources = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn resource_names(&self, kind: ResourceKind) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .resources(kind)
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn resource_labels(&self, kind: ResourceKind, name: &str) -> Option<HashMap<String, String>> {
        let state = self.state.lock().unwrap();
        state
            .resources(kind)
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, labels)| labels.clone())
    }

    /// Every container, running or not
    pub fn containers(&self) -> Vec<ContainerSummary> {
        let state = self.state.lock().unwrap();
        state.containers.iter().map(|c| c.summary.clone()).collect()
    }

    /// Compose files handed to `compose up`
    pub fn artifacts(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().artifacts.clone()
    }

    /// Last definition handed to `compose up`, as parsed from its file
    pub fn last_definition(&self) -> Option<ComposeConfig> {
        self.state.lock().unwrap().definitions.last().cloned()
    }

    /// Number of calls that change runtime state
    pub fn mutating_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::Create(..)
                        | Call::RemoveResource(..)
                        | Call::Stop(_)
                        | Call::Remove(_)
                        | Call::ComposeUp { .. }
                )
            })
            .count()
    }
}

impl State {
    fn next_container_id(&mut self) -> String {
        self.next_id += 1;
        format!("c{:04}", self.next_id)
    }

    fn resources(&self, kind: ResourceKind) -> &Vec<(String, HashMap<String, String>)> {
        match kind {
            ResourceKind::Network => &self.networks,
            ResourceKind::Volume => &self.volumes,
        }
    }

    fn resources_mut(&mut self, kind: ResourceKind) -> &mut Vec<(String, HashMap<String, String>)> {
        match kind {
            ResourceKind::Network => &mut self.networks,
            ResourceKind::Volume => &mut self.volumes,
        }
    }
}

fn status_text(running: bool) -> String {
    if running {
        "Up 1 second".to_string()
    } else {
        "Exited (0)".to_string()
    }
}

fn failure(command: &str, stderr: &str) -> DtopError {
    DtopError::Runtime {
        command: command.to_string(),
        stderr: stderr.to_string(),
    }
}

impl ContainerRuntime for FakeRuntime {
    async fn resource_exists(&self, kind: ResourceKind, name: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Exists(kind, name.to_string()));
        Ok(state.resources(kind).iter().any(|(n, _)| n == name))
    }

    async fn create_resource(
        &self,
        kind: ResourceKind,
        name: &str,
        labels: &HashMap<String, String>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create(kind, name.to_string()));
        if state.fail_create {
            return Err(failure("create", "simulated failure"));
        }
        if state.resources(kind).iter().any(|(n, _)| n == name) {
            return Err(failure("create", "already exists"));
        }
        state
            .resources_mut(kind)
            .push((name.to_string(), labels.clone()));
        Ok(())
    }

    async fn list_resources(&self, kind: ResourceKind, filter: &LabelFilter) -> Result<Vec<String>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListResources(kind));
        if state.fail_list_resources {
            return Err(failure("ls", "daemon hiccup"));
        }
        Ok(state
            .resources(kind)
            .iter()
            .filter(|(_, labels)| filter.matches(labels))
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn remove_resource(&self, kind: ResourceKind, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::RemoveResource(kind, id.to_string()));
        if state.in_use.iter().any(|n| n == id) {
            return Err(failure("rm", "resource is in use"));
        }
        state.resources_mut(kind).retain(|(n, _)| n != id);
        Ok(())
    }

    async fn list_containers(
        &self,
        filter: &LabelFilter,
        all: bool,
    ) -> Result<Vec<ContainerSummary>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListContainers);
        Ok(state
            .containers
            .iter()
            .filter(|c| all || c.running)
            .filter(|c| filter.matches(&c.summary.labels))
            .map(|c| c.summary.clone())
            .collect())
    }

    async fn stop_containers(&self, ids: &[String]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Stop(ids.to_vec()));
        for c in state.containers.iter_mut().filter(|c| ids.contains(&c.summary.id)) {
            c.running = false;
            c.summary.status = status_text(false);
        }
        Ok(())
    }

    async fn remove_containers(&self, ids: &[String]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Remove(ids.to_vec()));
        if state
            .containers
            .iter()
            .any(|c| ids.contains(&c.summary.id) && c.running)
        {
            return Err(failure("rm", "cannot remove a running container"));
        }
        state.containers.retain(|c| !ids.contains(&c.summary.id));
        Ok(())
    }

    async fn compose_up(&self, request: &ComposeUp) -> Result<()> {
        let definition = ComposeParser::parse_file(&request.file)?;

        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ComposeUp {
            services: request.services.clone(),
            build: request.build,
        });
        state.artifacts.push(request.file.clone());
        state.definitions.push(definition.clone());

        if state.fail_compose_up {
            return Err(failure("compose up", "simulated failure"));
        }

        for service in &request.services {
            let config = definition
                .services
                .get(service)
                .ok_or_else(|| failure("compose up", &format!("no such service: {}", service)))?;

            let mut labels: HashMap<String, String> = config
                .labels
                .as_ref()
                .map(|l| l.to_map().into_iter().collect())
                .unwrap_or_default();
            labels.insert(SERVICE_LABEL.to_string(), service.clone());

            let id = state.next_container_id();
            state.containers.push(FakeContainer {
                summary: ContainerSummary {
                    id: id.clone(),
                    name: format!("{}-{}-{}", request.project_name, service, id),
                    image: format!("{}:latest", service),
                    status: status_text(true),
                    ports: String::new(),
                    labels,
                },
                running: true,
            });
        }

        Ok(())
    }
}

//! Container runtime abstraction
//!
//! Everything Docktapus knows about running containers, networks and
//! volumes comes from the runtime on demand. Nothing is cached between
//! calls; the runtime is the source of truth.

pub mod docker;
#[cfg(test)]
pub mod fake;

pub use docker::DockerCli;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Kind of shared resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Docker network
    Network,
    /// Docker volume
    Volume,
}

impl ResourceKind {
    /// Docker CLI object name
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Network => "network",
            ResourceKind::Volume => "volume",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A container as reported by the runtime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    /// Container ID
    pub id: String,
    /// Container name
    pub name: String,
    /// Image
    pub image: String,
    /// Human readable status
    pub status: String,
    /// Published ports
    pub ports: String,
    /// Labels
    pub labels: HashMap<String, String>,
}

impl ContainerSummary {
    /// Get a label value
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(|s| s.as_str())
    }
}

/// Label selector used when listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFilter {
    /// Label key
    pub key: String,
    /// Required value, or any value when `None`
    pub value: Option<String>,
}

impl LabelFilter {
    /// Match a label with any value
    pub fn has(key: &str) -> Self {
        Self {
            key: key.to_string(),
            value: None,
        }
    }

    /// Match a label with an exact value
    pub fn equals(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: Some(value.to_string()),
        }
    }

    /// Check a label set against this filter
    pub fn matches(&self, labels: &HashMap<String, String>) -> bool {
        match (&self.value, labels.get(&self.key)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => expected == actual,
        }
    }

    /// Render as a `--filter` argument value
    pub fn to_arg(&self) -> String {
        match &self.value {
            Some(value) => format!("label={}={}", self.key, value),
            None => format!("label={}", self.key),
        }
    }
}

/// A `docker compose up` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeUp {
    /// Compose file to bring up
    pub file: PathBuf,
    /// Compose project name
    pub project_name: String,
    /// Directory relative paths in the file resolve against
    pub project_directory: Option<PathBuf>,
    /// Services to start; never empty
    pub services: Vec<String>,
    /// Rebuild images before starting
    pub build: bool,
}

/// Operations Docktapus needs from a container runtime.
///
/// All calls are awaited one at a time; implementations need not be
/// safe for concurrent use.
#[allow(async_fn_in_trait)]
pub trait ContainerRuntime {
    /// Check whether a network or volume with this name exists
    async fn resource_exists(&self, kind: ResourceKind, name: &str) -> Result<bool>;

    /// Create a network or volume carrying the given labels
    async fn create_resource(
        &self,
        kind: ResourceKind,
        name: &str,
        labels: &HashMap<String, String>,
    ) -> Result<()>;

    /// List identifiers of networks or volumes matching a label filter
    async fn list_resources(&self, kind: ResourceKind, filter: &LabelFilter) -> Result<Vec<String>>;

    /// Remove a network or volume
    async fn remove_resource(&self, kind: ResourceKind, id: &str) -> Result<()>;

    /// List containers matching a label filter. Stopped containers are
    /// included only when `all` is set.
    async fn list_containers(&self, filter: &LabelFilter, all: bool)
        -> Result<Vec<ContainerSummary>>;

    /// Stop containers
    async fn stop_containers(&self, ids: &[String]) -> Result<()>;

    /// Remove stopped containers
    async fn remove_containers(&self, ids: &[String]) -> Result<()>;

    /// Bring up the named services of a compose file, detached
    async fn compose_up(&self, request: &ComposeUp) -> Result<()>;
}

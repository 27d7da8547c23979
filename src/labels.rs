//! Label model
//!
//! Every container and shared resource Docktapus manages carries labels
//! that describe who owns it and which environment it runs as:
//!
//! | key                          | value               | written by            |
//! |------------------------------|---------------------|-----------------------|
//! | `dtop.project`               | owning project name | reconciler, injection |
//! | `dtop.env`                   | `prod` or `dev`     | injection at launch   |
//! | `com.docker.compose.service` | compose service     | docker compose itself |
//!
//! The running state of a project is always read back from these labels;
//! there is no local record of what was started.

use crate::compose::{ComposeConfig, LabelsConfig};
use crate::error::{DtopError, Result};
use crate::runtime::{ContainerRuntime, ContainerSummary, LabelFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Owning project
pub const PROJECT_LABEL: &str = "dtop.project";
/// Environment (`prod` or `dev`)
pub const ENV_LABEL: &str = "dtop.env";
/// Service name, set by docker compose
pub const SERVICE_LABEL: &str = "com.docker.compose.service";

/// Which definition a service runs from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Prod,
    Dev,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Prod => "prod",
            Environment::Dev => "dev",
        }
    }

    /// The environment a swap moves to
    pub fn other(&self) -> Environment {
        match self {
            Environment::Prod => Environment::Dev,
            Environment::Dev => Environment::Prod,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = DtopError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "prod" => Ok(Environment::Prod),
            "dev" => Ok(Environment::Dev),
            other => Err(DtopError::InvalidConfig(format!(
                "Unknown environment '{}'",
                other
            ))),
        }
    }
}

/// Labels marking a resource as owned by a project
pub fn ownership_labels(project_name: &str) -> HashMap<String, String> {
    let mut labels = HashMap::new();
    labels.insert(PROJECT_LABEL.to_string(), project_name.to_string());
    labels
}

/// Return a copy of the definition with ownership and environment labels
/// set on every service.
///
/// Existing labels are normalized to a flat map whatever form they were
/// written in. Other labels are kept; the two owned keys are overwritten.
pub fn inject(config: &ComposeConfig, env: Environment, project_name: &str) -> ComposeConfig {
    let mut labelled = config.clone();

    for service in labelled.services.values_mut() {
        let mut labels = service
            .labels
            .as_ref()
            .map(LabelsConfig::to_map)
            .unwrap_or_default();

        labels.insert(ENV_LABEL.to_string(), env.as_str().to_string());
        labels.insert(PROJECT_LABEL.to_string(), project_name.to_string());

        service.labels = Some(LabelsConfig::from(labels));
    }

    labelled
}

/// All containers of a project, running or stopped, optionally narrowed to
/// one service.
pub async fn containers_for<R: ContainerRuntime>(
    runtime: &R,
    project_name: &str,
    service_name: Option<&str>,
) -> Result<Vec<ContainerSummary>> {
    let filter = LabelFilter::equals(PROJECT_LABEL, project_name);
    let containers = runtime.list_containers(&filter, true).await?;

    Ok(match service_name {
        Some(service) => containers
            .into_iter()
            .filter(|c| c.label(SERVICE_LABEL) == Some(service))
            .collect(),
        None => containers,
    })
}

/// Every managed container on the host, across all projects
pub async fn all_managed<R: ContainerRuntime>(runtime: &R) -> Result<Vec<ContainerSummary>> {
    runtime
        .list_containers(&LabelFilter::has(PROJECT_LABEL), true)
        .await
}

/// Environment a service is currently running as, if it is running.
///
/// Only running containers with a usable environment label count. More
/// than one of them for the service is an error, whatever their labels.
pub async fn environment_of<R: ContainerRuntime>(
    runtime: &R,
    project_name: &str,
    service_name: &str,
) -> Result<Option<Environment>> {
    let filter = LabelFilter::equals(PROJECT_LABEL, project_name);
    let running = runtime.list_containers(&filter, false).await?;

    let mut found: Vec<Environment> = Vec::new();
    for container in running
        .iter()
        .filter(|c| c.label(SERVICE_LABEL) == Some(service_name))
    {
        match container.label(ENV_LABEL).map(Environment::from_str) {
            Some(Ok(env)) => found.push(env),
            _ => tracing::debug!(
                "Ignoring container {} without a usable {} label",
                container.id,
                ENV_LABEL
            ),
        }
    }

    if found.len() > 1 {
        return Err(DtopError::DuplicateService {
            service: service_name.to_string(),
            environments: found
                .iter()
                .map(|e| e.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    Ok(found.first().copied())
}

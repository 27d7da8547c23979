//! Project teardown

use crate::error::Result;
use crate::labels::{containers_for, PROJECT_LABEL};
use crate::runtime::{ContainerRuntime, LabelFilter, ResourceKind};

/// Whether to remove a kind of project resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Removal {
    Yes,
    No,
    /// Ask interactively
    #[default]
    Ask,
}

impl Removal {
    /// From a specific flag and the `--all` shortcut; neither means ask
    pub fn from_flags(flag: bool, all: bool) -> Self {
        if flag || all {
            Removal::Yes
        } else {
            Removal::Ask
        }
    }
}

/// Which resources to remove besides containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TeardownOptions {
    pub networks: Removal,
    pub volumes: Removal,
}

/// What a teardown did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownSummary {
    /// Containers stopped and removed
    pub containers: usize,
    /// Networks removed, `None` when network removal was not requested
    pub networks: Option<Vec<String>>,
    /// Volumes removed, `None` when volume removal was not requested
    pub volumes: Option<Vec<String>>,
    /// Resources that could not be removed
    pub failed: Vec<String>,
}

impl TeardownSummary {
    /// Nothing was running for the project
    pub fn is_noop(&self) -> bool {
        self.containers == 0
    }

    /// Short description, e.g. "Containers, networks removed"
    pub fn describe(&self) -> String {
        let mut removed = vec!["Containers"];
        if self.networks.is_some() {
            removed.push("networks");
        }
        if self.volumes.is_some() {
            removed.push("volumes");
        }
        format!("{} removed", removed.join(", "))
    }
}

/// Stops a project and cleans up what was created for it
pub struct TeardownDriver<'a, R: ContainerRuntime> {
    runtime: &'a R,
    project_name: String,
}

impl<'a, R: ContainerRuntime> TeardownDriver<'a, R> {
    /// Create a teardown driver for a project
    pub fn new(runtime: &'a R, project_name: &str) -> Self {
        Self {
            runtime,
            project_name: project_name.to_string(),
        }
    }

    /// Stop and remove every container of the project, in any environment,
    /// then optionally its networks and volumes.
    ///
    /// When no containers are found nothing else happens. `confirm` is only
    /// consulted for [`Removal::Ask`]. Failing to list or remove networks
    /// and volumes is logged and recorded in the summary, never returned.
    pub async fn teardown<F>(&self, options: TeardownOptions, mut confirm: F) -> Result<TeardownSummary>
    where
        F: FnMut(&str) -> Result<bool>,
    {
        let ids: Vec<String> = containers_for(self.runtime, &self.project_name, None)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

        if ids.is_empty() {
            tracing::info!("No containers found for project '{}'", self.project_name);
            return Ok(TeardownSummary::default());
        }

        tracing::info!(
            "Stopping {} container(s) for project '{}'...",
            ids.len(),
            self.project_name
        );
        self.runtime.stop_containers(&ids).await?;
        self.runtime.remove_containers(&ids).await?;

        let mut summary = TeardownSummary {
            containers: ids.len(),
            ..Default::default()
        };

        if Self::wanted(options.networks, "Remove project networks?", &mut confirm)? {
            summary.networks = Some(self.cleanup(ResourceKind::Network, &mut summary.failed).await);
        }

        if Self::wanted(options.volumes, "Remove project volumes?", &mut confirm)? {
            summary.volumes = Some(self.cleanup(ResourceKind::Volume, &mut summary.failed).await);
        }

        Ok(summary)
    }

    fn wanted<F>(removal: Removal, prompt: &str, confirm: &mut F) -> Result<bool>
    where
        F: FnMut(&str) -> Result<bool>,
    {
        match removal {
            Removal::Yes => Ok(true),
            Removal::No => Ok(false),
            Removal::Ask => confirm(prompt),
        }
    }

    /// Remove every resource of this kind owned by the project.
    ///
    /// Best effort: neither a failed listing nor a failed removal aborts.
    async fn cleanup(&self, kind: ResourceKind, failed: &mut Vec<String>) -> Vec<String> {
        let filter = LabelFilter::equals(PROJECT_LABEL, &self.project_name);
        let mut removed = Vec::new();

        let owned = match self.runtime.list_resources(kind, &filter).await {
            Ok(owned) => owned,
            Err(e) => {
                tracing::warn!("Could not list {}s of '{}': {}", kind, self.project_name, e);
                failed.push(format!("{}s (listing failed)", kind));
                return removed;
            }
        };

        for id in owned {
            match self.runtime.remove_resource(kind, &id).await {
                Ok(()) => removed.push(id),
                Err(e) => {
                    tracing::warn!("Could not remove {} {}: {}", kind, id, e);
                    failed.push(id);
                }
            }
        }

        removed
    }
}

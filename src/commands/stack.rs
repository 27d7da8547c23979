//! Runtime commands: `up`, `down`, `swap` and `ls`

use crate::error::{DtopError, Result};
use crate::labels::{all_managed, containers_for, Environment, ENV_LABEL, PROJECT_LABEL, SERVICE_LABEL};
use crate::launch::LaunchDriver;
use crate::plan::{plan, DevSelection, LaunchPlan};
use crate::reconcile::ResourceReconciler;
use crate::registry::Project;
use crate::runtime::{ContainerRuntime, ContainerSummary};
use crate::swap::{SwapEngine, SwapOutcome};
use crate::teardown::{TeardownDriver, TeardownOptions, TeardownSummary};
use std::collections::BTreeMap;

/// Bring a project up, `selection` choosing which services run from dev.
///
/// Prod goes first: its resources are reconciled and its services started,
/// then the same for dev. Every requested dev service must exist in the
/// dev definition.
pub async fn up<R: ContainerRuntime>(
    runtime: &R,
    name: &str,
    project: &Project,
    selection: &DevSelection,
    build: bool,
) -> Result<LaunchPlan> {
    let dev = project.definition(Environment::Dev)?;
    let prod = project.definition(Environment::Prod)?;

    if let DevSelection::Services(names) = selection {
        if let Some(unknown) = names.iter().find(|n| !dev.has_service(n)) {
            return Err(DtopError::NotADevService(unknown.clone()));
        }
    }

    let launch = plan(&dev, &prod, selection);
    let reconciler = ResourceReconciler::new(runtime, name);

    for (env, definition, services) in [
        (Environment::Prod, &prod, &launch.prod),
        (Environment::Dev, &dev, &launch.dev),
    ] {
        if services.is_empty() {
            continue;
        }

        tracing::info!("Preparing {} resources for '{}'", env, name);
        let reconciled = reconciler.reconcile(definition).await?;

        LaunchDriver::new(runtime, name)
            .working_dir(project.definition_dir(env))
            .launch(&reconciled, services, env, build)
            .await?;
    }

    Ok(launch)
}

/// Move one service of a project to its other environment
pub async fn swap<R: ContainerRuntime>(
    runtime: &R,
    name: &str,
    project: &Project,
    service: &str,
    build: bool,
) -> Result<SwapOutcome> {
    let dev = project.definition(Environment::Dev)?;
    let prod = project.definition(Environment::Prod)?;

    SwapEngine::new(runtime, name)
        .working_dirs(
            project.definition_dir(Environment::Dev),
            project.definition_dir(Environment::Prod),
        )
        .swap(&dev, &prod, service, build)
        .await
}

/// Stop a project, removing networks and volumes as `options` and `confirm` decide
pub async fn down<R, F>(
    runtime: &R,
    name: &str,
    options: TeardownOptions,
    confirm: F,
) -> Result<TeardownSummary>
where
    R: ContainerRuntime,
    F: FnMut(&str) -> Result<bool>,
{
    TeardownDriver::new(runtime, name)
        .teardown(options, confirm)
        .await
}

/// One row of `ls`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRow {
    pub id: String,
    pub service: String,
    pub name: String,
    pub image: String,
    pub status: String,
    pub ports: String,
    pub env: String,
}

impl From<ContainerSummary> for ContainerRow {
    fn from(c: ContainerSummary) -> Self {
        let label = |key: &str| c.label(key).unwrap_or("-").to_string();
        Self {
            id: c.id.chars().take(12).collect(),
            service: label(SERVICE_LABEL),
            env: label(ENV_LABEL),
            name: c.name,
            image: c.image,
            status: c.status,
            ports: c.ports,
        }
    }
}

/// Containers of one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectListing {
    pub project: String,
    pub containers: Vec<ContainerRow>,
}

/// Managed containers grouped by project, projects and containers sorted by name
pub async fn ls<R: ContainerRuntime>(runtime: &R, name: Option<&str>) -> Result<Vec<ProjectListing>> {
    let containers = match name {
        Some(name) => containers_for(runtime, name, None).await?,
        None => all_managed(runtime).await?,
    };

    let mut grouped: BTreeMap<String, Vec<ContainerRow>> = BTreeMap::new();
    for container in containers {
        let project = container.label(PROJECT_LABEL).unwrap_or("-").to_string();
        grouped.entry(project).or_default().push(container.into());
    }

    Ok(grouped
        .into_iter()
        .map(|(project, mut containers)| {
            containers.sort_by(|a, b| a.name.cmp(&b.name));
            ProjectListing {
                project,
                containers,
            }
        })
        .collect())
}

const HEADERS: [&str; 7] = ["ID", "SERVICE", "NAME", "IMAGE", "STATUS", "PORTS", "ENV"];

/// Render a listing as an aligned text table
pub fn render_table(listing: &ProjectListing) -> String {
    let rows: Vec<[&str; 7]> = listing
        .containers
        .iter()
        .map(|c| {
            [
                c.id.as_str(),
                c.service.as_str(),
                c.name.as_str(),
                c.image.as_str(),
                c.status.as_str(),
                c.ports.as_str(),
                c.env.as_str(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[&str; 7]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(&HEADERS)];
    out.extend(rows.iter().map(line));
    out.join("\n")
}

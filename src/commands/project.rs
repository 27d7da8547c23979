//! Registry commands: `init` and `update`
//!
//! These only touch the registry file, never the container runtime.

use crate::error::{DtopError, Result};
use crate::registry::{expand_home, resolve_compose_path, Project, ProjectRegistry};
use std::path::{Path, PathBuf};

/// Register a project from the current directory.
///
/// Both compose files must exist. An existing project is only replaced
/// with `force`.
pub fn init(
    registry: &mut ProjectRegistry,
    name: &str,
    dev: &Path,
    prod: &Path,
    force: bool,
    cwd: &Path,
) -> Result<Project> {
    if name.trim().is_empty() {
        return Err(DtopError::InvalidConfig("project name is empty".to_string()));
    }

    let dev = resolve_compose_path(dev, cwd)?;
    let prod = resolve_compose_path(prod, cwd)?;

    if registry.contains(name) && !force {
        return Err(DtopError::ProjectExists(name.to_string()));
    }

    let project = Project::new(cwd.to_path_buf(), dev, prod);
    registry.put(name, project.clone());
    registry.save()?;

    tracing::info!("Registered project '{}' in {}", name, registry.path().display());
    Ok(project)
}

/// Fields of a registered project to change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectUpdate {
    pub root: Option<PathBuf>,
    pub dev: Option<PathBuf>,
    pub prod: Option<PathBuf>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        self.root.is_none() && self.dev.is_none() && self.prod.is_none()
    }
}

/// Change the given fields of a registered project.
///
/// Returns the names of the fields that changed. New compose paths must
/// exist; nothing is written if any of them is missing.
pub fn update(
    registry: &mut ProjectRegistry,
    name: &str,
    changes: &ProjectUpdate,
    cwd: &Path,
) -> Result<Vec<&'static str>> {
    let mut project = registry.require(name)?.clone();
    let mut changed = Vec::new();

    if let Some(root) = &changes.root {
        let root = expand_home(root);
        project.root = if root.is_absolute() { root } else { cwd.join(root) };
        changed.push("root");
    }
    if let Some(dev) = &changes.dev {
        project.compose.dev = resolve_compose_path(dev, cwd)?;
        changed.push("dev");
    }
    if let Some(prod) = &changes.prod {
        project.compose.prod = resolve_compose_path(prod, cwd)?;
        changed.push("prod");
    }

    if !changed.is_empty() {
        registry.put(name, project);
        registry.save()?;
        tracing::info!("Updated {} of project '{}'", changed.join(", "), name);
    }

    Ok(changed)
}

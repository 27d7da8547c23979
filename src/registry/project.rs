//! Registered project records

use crate::compose::{ComposeConfig, ComposeParser};
use crate::error::{DtopError, Result};
use crate::labels::Environment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Paths of the two definitions of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposePaths {
    pub dev: PathBuf,
    pub prod: PathBuf,
}

/// A project as stored in the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Directory the project was registered from
    pub root: PathBuf,
    pub compose: ComposePaths,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// New record stamped with the current time
    pub fn new(root: PathBuf, dev: PathBuf, prod: PathBuf) -> Self {
        Self {
            root,
            compose: ComposePaths { dev, prod },
            created_at: Utc::now(),
        }
    }

    /// Path of the definition for an environment
    pub fn compose_path(&self, env: Environment) -> &Path {
        match env {
            Environment::Dev => &self.compose.dev,
            Environment::Prod => &self.compose.prod,
        }
    }

    /// Parse the definition for an environment
    pub fn definition(&self, env: Environment) -> Result<ComposeConfig> {
        ComposeParser::parse_file(self.compose_path(env))
    }

    /// Directory relative paths of a definition resolve against
    pub fn definition_dir(&self, env: Environment) -> Option<PathBuf> {
        self.compose_path(env)
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }
}

/// Resolve a user supplied compose path to an absolute path of an existing file
pub fn resolve_compose_path(path: &Path, base: &Path) -> Result<PathBuf> {
    let expanded = expand_home(path);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    };

    if !absolute.is_file() {
        return Err(DtopError::ComposeFileNotFound(
            absolute.display().to_string(),
        ));
    }

    Ok(absolute.canonicalize()?)
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

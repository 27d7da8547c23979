//! Project registry
//!
//! A single YAML file (`~/.dtop.yml` unless `--config` points elsewhere)
//! mapping project names to their root directory and the paths of their
//! dev and prod definitions.

pub mod project;

pub use project::{expand_home, resolve_compose_path, ComposePaths, Project};

use crate::compose::config::null_as_default;
use crate::error::{DtopError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use std::fs;
use std::path::{Path, PathBuf};

/// Default registry file name in the home directory
pub const DEFAULT_REGISTRY_FILE: &str = ".dtop.yml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default, deserialize_with = "null_as_default")]
    projects: IndexMap<String, Project>,
    #[serde(flatten)]
    extra: Mapping,
}

/// Registered projects, backed by a YAML file
#[derive(Debug)]
pub struct ProjectRegistry {
    path: PathBuf,
    file: RegistryFile,
}

impl ProjectRegistry {
    /// `~/.dtop.yml`
    pub fn default_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_REGISTRY_FILE))
            .ok_or_else(|| DtopError::Registry("cannot determine home directory".to_string()))
    }

    /// The explicit path when it names an existing file, otherwise the default
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            let path = expand_home(path);
            if path.is_file() {
                return Ok(path);
            }
            tracing::warn!(
                "Config file {} not found, falling back to default",
                path.display()
            );
        }

        let path = Self::default_path()?;
        tracing::debug!("Using registry {}", path.display());
        Ok(path)
    }

    /// Load the registry; a missing file is an empty registry
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let contents = if path.exists() {
            fs::read_to_string(&path)?
        } else {
            String::new()
        };

        let file = if contents.trim().is_empty() {
            RegistryFile::default()
        } else {
            serde_yaml::from_str::<Option<RegistryFile>>(&contents)
                .map_err(|e| DtopError::Registry(format!("{}: {}", path.display(), e)))?
                .unwrap_or_default()
        };

        Ok(Self { path, file })
    }

    /// Write the registry back to its file, creating parent directories
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_yaml::to_string(&self.file)?;
        fs::write(&self.path, contents)?;
        tracing::debug!("Saved registry {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, name: &str) -> Option<&Project> {
        self.file.projects.get(name)
    }

    /// Look up a project, failing with `ProjectNotFound`
    pub fn require(&self, name: &str) -> Result<&Project> {
        self.get(name)
            .ok_or_else(|| DtopError::ProjectNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Project> {
        self.file.projects.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.file.projects.contains_key(name)
    }

    /// Insert or replace a project, keeping its position when replaced
    pub fn put(&mut self, name: &str, project: Project) {
        self.file.projects.insert(name.to_string(), project);
    }

    /// Registered project names in declaration order
    pub fn names(&self) -> Vec<String> {
        self.file.projects.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(root: &str) -> Project {
        Project::new(
            PathBuf::from(root),
            PathBuf::from(format!("{}/docker-compose.dev.yml", root)),
            PathBuf::from(format!("{}/docker-compose.yml", root)),
        )
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let registry = ProjectRegistry::load(dir.path().join("registry.yml")).unwrap();

        assert!(registry.names().is_empty());
        assert!(matches!(
            registry.require("shop"),
            Err(DtopError::ProjectNotFound(_))
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("registry.yml");

        let mut registry = ProjectRegistry::load(&path).unwrap();
        registry.put("shop", project("/srv/shop"));
        registry.put("blog", project("/srv/blog"));
        registry.save().unwrap();

        let reloaded = ProjectRegistry::load(&path).unwrap();
        assert_eq!(reloaded.names(), vec!["shop", "blog"]);
        assert_eq!(reloaded.get("shop"), registry.get("shop"));
        assert_eq!(
            reloaded.require("blog").unwrap().compose.prod,
            PathBuf::from("/srv/blog/docker-compose.yml")
        );
    }

    #[test]
    fn test_reads_documented_format_and_keeps_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.yml");
        fs::write(
            &path,
            r#"
projects:
  shop:
    root: /srv/shop
    compose:
      dev: /srv/shop/docker-compose.dev.yml
      prod: /srv/shop/docker-compose.yml
    created_at: 2026-01-01T00:00:00+00:00
defaults:
  editor: vim
"#,
        )
        .unwrap();

        let registry = ProjectRegistry::load(&path).unwrap();
        let shop = registry.require("shop").unwrap();
        assert_eq!(shop.root, PathBuf::from("/srv/shop"));
        assert_eq!(shop.created_at.to_rfc3339(), "2026-01-01T00:00:00+00:00");

        registry.save().unwrap();
        let saved = fs::read_to_string(&path).unwrap();
        assert!(saved.contains("defaults:"));
        assert!(saved.contains("editor: vim"));
    }

    #[test]
    fn test_empty_file_and_null_projects() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty.yml");
        let null = dir.path().join("null.yml");
        fs::write(&empty, "").unwrap();
        fs::write(&null, "projects:\n").unwrap();

        assert!(ProjectRegistry::load(&empty).unwrap().names().is_empty());
        assert!(ProjectRegistry::load(&null).unwrap().names().is_empty());
    }

    #[test]
    fn test_malformed_registry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.yml");
        fs::write(&path, "projects: [1, 2").unwrap();

        assert!(matches!(
            ProjectRegistry::load(&path),
            Err(DtopError::Registry(_))
        ));
    }

    #[test]
    fn test_put_replaces_in_place() {
        let dir = TempDir::new().unwrap();
        let mut registry = ProjectRegistry::load(dir.path().join("r.yml")).unwrap();
        registry.put("shop", project("/srv/shop"));
        registry.put("blog", project("/srv/blog"));
        registry.put("shop", project("/opt/shop"));

        assert_eq!(registry.names(), vec!["shop", "blog"]);
        assert_eq!(registry.require("shop").unwrap().root, PathBuf::from("/opt/shop"));
    }

    #[test]
    fn test_resolve_path_prefers_existing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yml");
        fs::write(&path, "projects: {}\n").unwrap();

        assert_eq!(ProjectRegistry::resolve_path(Some(path.as_path())).unwrap(), path);

        let missing = dir.path().join("missing.yml");
        let fallback = ProjectRegistry::resolve_path(Some(missing.as_path())).unwrap();
        assert_eq!(fallback, ProjectRegistry::default_path().unwrap());
        assert!(fallback.ends_with(DEFAULT_REGISTRY_FILE));
        assert_ne!(fallback, missing);
    }
}

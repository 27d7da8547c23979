//! Launching services from a labelled definition

use crate::compose::{ComposeConfig, ComposeParser};
use crate::error::Result;
use crate::labels::{inject, Environment};
use crate::runtime::{ComposeUp, ContainerRuntime};
use std::io::Write;
use std::path::PathBuf;

/// Brings up services of one definition under one environment label
pub struct LaunchDriver<'a, R: ContainerRuntime> {
    runtime: &'a R,
    project_name: String,
    working_dir: Option<PathBuf>,
}

impl<'a, R: ContainerRuntime> LaunchDriver<'a, R> {
    /// Create a launcher for a project
    pub fn new(runtime: &'a R, project_name: &str) -> Self {
        Self {
            runtime,
            project_name: project_name.to_string(),
            working_dir: None,
        }
    }

    /// Resolve relative paths in definitions against this directory
    pub fn working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    /// Label the definition for `env`, write it to a temporary compose file
    /// and bring up exactly `services` from it.
    ///
    /// An empty service list starts nothing. The temporary file is removed
    /// whether or not compose succeeds.
    pub async fn launch(
        &self,
        definition: &ComposeConfig,
        services: &[String],
        env: Environment,
        build: bool,
    ) -> Result<()> {
        if services.is_empty() {
            tracing::debug!("No {} services to start", env);
            return Ok(());
        }

        let labelled = inject(definition, env, &self.project_name);
        let yaml = ComposeParser::to_yaml(&labelled)?;

        let mut artifact = tempfile::Builder::new()
            .prefix("dtop-")
            .suffix(".yml")
            .tempfile()?;
        artifact.write_all(yaml.as_bytes())?;
        artifact.flush()?;

        let request = ComposeUp {
            file: artifact.path().to_path_buf(),
            project_name: self.project_name.clone(),
            project_directory: self.working_dir.clone(),
            services: services.to_vec(),
            build,
        };

        tracing::info!("Starting {} services: {}", env, services.join(", "));
        let outcome = self.runtime.compose_up(&request).await;

        if let Err(e) = artifact.close() {
            tracing::warn!("Failed to remove {}: {}", request.file.display(), e);
        }

        outcome
    }
}

//! Moving a single service between prod and dev
//!
//! A swap reads the service's current environment back from container
//! labels, checks the other definition has the service, stops and removes
//! its containers, then starts it from the other definition. Sibling
//! services are never touched.
//!
//! There is no rollback: if the start fails after the stop succeeded the
//! service is left down and the swap has to be retried.

use crate::compose::ComposeConfig;
use crate::error::{DtopError, Result};
use crate::labels::{containers_for, environment_of, Environment};
use crate::launch::LaunchDriver;
use crate::reconcile::externalize;
use crate::runtime::ContainerRuntime;
use std::path::PathBuf;

/// Observed state of one service of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    NotRunning,
    RunningProd,
    RunningDev,
}

impl ServiceState {
    /// Environment the service runs as, if running
    pub fn environment(&self) -> Option<Environment> {
        match self {
            ServiceState::NotRunning => None,
            ServiceState::RunningProd => Some(Environment::Prod),
            ServiceState::RunningDev => Some(Environment::Dev),
        }
    }
}

impl From<Option<Environment>> for ServiceState {
    fn from(env: Option<Environment>) -> Self {
        match env {
            None => ServiceState::NotRunning,
            Some(Environment::Prod) => ServiceState::RunningProd,
            Some(Environment::Dev) => ServiceState::RunningDev,
        }
    }
}

/// Result of a completed swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    pub service: String,
    pub from: Environment,
    pub to: Environment,
    /// Containers stopped and removed
    pub stopped: usize,
}

/// Swaps services of one project between environments
pub struct SwapEngine<'a, R: ContainerRuntime> {
    runtime: &'a R,
    project_name: String,
    dev_dir: Option<PathBuf>,
    prod_dir: Option<PathBuf>,
}

impl<'a, R: ContainerRuntime> SwapEngine<'a, R> {
    /// Create a swap engine for a project
    pub fn new(runtime: &'a R, project_name: &str) -> Self {
        Self {
            runtime,
            project_name: project_name.to_string(),
            dev_dir: None,
            prod_dir: None,
        }
    }

    /// Directories relative paths of each definition resolve against
    pub fn working_dirs(mut self, dev: Option<PathBuf>, prod: Option<PathBuf>) -> Self {
        self.dev_dir = dev;
        self.prod_dir = prod;
        self
    }

    /// Current state of a service
    pub async fn state(&self, service: &str) -> Result<ServiceState> {
        let env = environment_of(self.runtime, &self.project_name, service).await?;
        Ok(ServiceState::from(env))
    }

    /// Move `service` to the environment it is not running in.
    ///
    /// Every check happens before anything is stopped, so a rejected swap
    /// leaves the running service alone.
    pub async fn swap(
        &self,
        dev: &ComposeConfig,
        prod: &ComposeConfig,
        service: &str,
        build: bool,
    ) -> Result<SwapOutcome> {
        if !dev.has_service(service) && !prod.has_service(service) {
            return Err(DtopError::ServiceNotFound(service.to_string()));
        }

        let current = self
            .state(service)
            .await?
            .environment()
            .ok_or_else(|| DtopError::ServiceNotRunning {
                project: self.project_name.clone(),
                service: service.to_string(),
            })?;

        let target = current.other();
        let (target_definition, target_dir) = match target {
            Environment::Dev => (dev, &self.dev_dir),
            Environment::Prod => (prod, &self.prod_dir),
        };
        let minimal =
            target_definition
                .only_service(service)
                .ok_or_else(|| DtopError::NoTargetDefinition {
                    service: service.to_string(),
                    environment: target.to_string(),
                })?;
        // Shared resources already exist from `up`; join them, never create.
        let minimal = externalize(&minimal);

        tracing::info!("Swapping '{}' from {} → {}", service, current, target);

        tracing::info!("  Stopping {} '{}'...", current, service);
        let stopped = self.stop_service(service).await?;

        tracing::info!("  Starting {} '{}'...", target, service);
        LaunchDriver::new(self.runtime, &self.project_name)
            .working_dir(target_dir.clone())
            .launch(&minimal, &[service.to_string()], target, build)
            .await?;

        Ok(SwapOutcome {
            service: service.to_string(),
            from: current,
            to: target,
            stopped,
        })
    }

    /// Stop and remove every container of a service, in any environment
    async fn stop_service(&self, service: &str) -> Result<usize> {
        let ids: Vec<String> = containers_for(self.runtime, &self.project_name, Some(service))
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

        if !ids.is_empty() {
            self.runtime.stop_containers(&ids).await?;
            self.runtime.remove_containers(&ids).await?;
        }

        Ok(ids.len())
    }
}

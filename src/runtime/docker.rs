//! Docker CLI runtime adapter

use super::{ComposeUp, ContainerRuntime, ContainerSummary, LabelFilter, ResourceKind};
use crate::error::{DtopError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::process::{Output, Stdio};
use tokio::process::Command;

/// Environment variable overriding the docker binary
pub const DOCKER_BIN_ENV: &str = "DTOP_DOCKER";

/// Runtime backed by the `docker` command line
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerCli {
    /// Use `$DTOP_DOCKER`, falling back to `docker` on the PATH
    pub fn new() -> Self {
        let binary = std::env::var(DOCKER_BIN_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "docker".to_string());
        Self { binary }
    }

    /// Use an explicit binary
    pub fn with_binary(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }

    async fn output(&self, args: &[String]) -> Result<Output> {
        tracing::debug!("Running {} {}", self.binary, args.join(" "));

        Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DtopError::Runtime {
                command: self.describe(args),
                stderr: e.to_string(),
            })
    }

    /// Run and fail on a non-zero exit, returning stdout
    async fn run(&self, args: &[String]) -> Result<String> {
        let output = self.output(args).await?;

        if !output.status.success() {
            return Err(DtopError::Runtime {
                command: self.describe(args),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn describe(&self, args: &[String]) -> String {
        format!("{} {}", self.binary, args.join(" "))
    }
}

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl ContainerRuntime for DockerCli {
    async fn resource_exists(&self, kind: ResourceKind, name: &str) -> Result<bool> {
        let output = self
            .output(&args(&[kind.as_str(), "inspect", name]))
            .await?;
        Ok(output.status.success())
    }

    async fn create_resource(
        &self,
        kind: ResourceKind,
        name: &str,
        labels: &HashMap<String, String>,
    ) -> Result<()> {
        let mut cmd = args(&[kind.as_str(), "create"]);
        if kind == ResourceKind::Network {
            cmd.extend(args(&["--driver", "bridge"]));
        }
        for (key, value) in labels {
            cmd.push("--label".to_string());
            cmd.push(format!("{}={}", key, value));
        }
        cmd.push(name.to_string());

        self.run(&cmd).await.map(|_| ())
    }

    async fn list_resources(&self, kind: ResourceKind, filter: &LabelFilter) -> Result<Vec<String>> {
        let format = match kind {
            ResourceKind::Network => "{{.ID}}",
            ResourceKind::Volume => "{{.Name}}",
        };
        let filter = filter.to_arg();
        let stdout = self
            .run(&args(&[kind.as_str(), "ls", "--filter", filter.as_str(), "--format", format]))
            .await?;

        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    async fn remove_resource(&self, kind: ResourceKind, id: &str) -> Result<()> {
        self.run(&args(&[kind.as_str(), "rm", id])).await.map(|_| ())
    }

    async fn list_containers(
        &self,
        filter: &LabelFilter,
        all: bool,
    ) -> Result<Vec<ContainerSummary>> {
        let mut cmd = args(&["ps"]);
        if all {
            cmd.push("-a".to_string());
        }
        let filter = filter.to_arg();
        cmd.extend(args(&["--filter", filter.as_str(), "--format", "{{json .}}"]));

        let stdout = self.run(&cmd).await?;
        parse_ps_output(&stdout)
    }

    async fn stop_containers(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut cmd = args(&["stop"]);
        cmd.extend(ids.iter().cloned());
        self.run(&cmd).await.map(|_| ())
    }

    async fn remove_containers(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut cmd = args(&["rm"]);
        cmd.extend(ids.iter().cloned());
        self.run(&cmd).await.map(|_| ())
    }

    async fn compose_up(&self, request: &ComposeUp) -> Result<()> {
        let file = request.file.to_string_lossy().into_owned();
        let mut cmd = args(&["compose", "-p", request.project_name.as_str(), "-f", file.as_str()]);
        if let Some(dir) = &request.project_directory {
            cmd.push("--project-directory".to_string());
            cmd.push(dir.to_string_lossy().into_owned());
        }
        cmd.extend(args(&["up", "-d"]));
        if request.build {
            cmd.push("--build".to_string());
        }
        cmd.extend(request.services.iter().cloned());

        tracing::info!("  → {}", self.describe(&cmd));

        // Compose progress goes straight to the terminal
        let status = Command::new(&self.binary)
            .args(&cmd)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| DtopError::Runtime {
                command: self.describe(&cmd),
                stderr: e.to_string(),
            })?;

        if !status.success() {
            return Err(DtopError::Runtime {
                command: self.describe(&cmd),
                stderr: format!("exited with {}", status),
            });
        }

        Ok(())
    }
}

/// One line of `docker ps --format '{{json .}}'`
#[derive(Debug, Deserialize)]
struct PsLine {
    #[serde(rename = "ID", default)]
    id: String,
    #[serde(rename = "Names", default)]
    names: String,
    #[serde(rename = "Image", default)]
    image: String,
    #[serde(rename = "Status", default)]
    status: String,
    #[serde(rename = "Ports", default)]
    ports: String,
    #[serde(rename = "Labels", default)]
    labels: String,
}

fn parse_ps_output(stdout: &str) -> Result<Vec<ContainerSummary>> {
    let mut containers = Vec::new();

    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let ps: PsLine = serde_json::from_str(line)?;
        containers.push(ContainerSummary {
            id: ps.id,
            name: ps.names,
            image: ps.image,
            status: ps.status,
            ports: ps.ports,
            labels: parse_labels(&ps.labels),
        });
    }

    Ok(containers)
}

/// Parse docker's comma separated `key=value` label string.
///
/// Docker does not escape commas inside values, so a segment without `=`
/// is a continuation of the previous value (e.g. the compose
/// `config_files` label listing several files).
fn parse_labels(raw: &str) -> HashMap<String, String> {
    let mut labels: Vec<(String, String)> = Vec::new();

    for part in raw.split(',').filter(|part| !part.trim().is_empty()) {
        if let Some((key, value)) = part.split_once('=') {
            labels.push((key.trim().to_string(), value.to_string()));
        } else if let Some((_, value)) = labels.last_mut() {
            value.push(',');
            value.push_str(part);
        } else {
            labels.push((part.trim().to_string(), String::new()));
        }
    }

    labels.into_iter().collect()
}

//! Error types for Docktapus

use thiserror::Error;

/// Result type for Docktapus operations
pub type Result<T> = std::result::Result<T, DtopError>;

/// Docktapus error types
#[derive(Error, Debug)]
pub enum DtopError {
    #[error("Project '{0}' not found in registry")]
    ProjectNotFound(String),

    #[error("Project '{0}' already exists! Use --force to overwrite")]
    ProjectExists(String),

    #[error("Service '{0}' not found in dev or prod compose files")]
    ServiceNotFound(String),

    #[error("Service '{0}' is not defined in the dev compose file")]
    NotADevService(String),

    #[error("Service '{service}' is not currently running in project '{project}'")]
    ServiceNotRunning { project: String, service: String },

    #[error("Service '{service}' has no {environment} definition to swap to")]
    NoTargetDefinition { service: String, environment: String },

    #[error("Service '{service}' has more than one running container ({environments})")]
    DuplicateService { service: String, environments: String },

    #[error("Compose file not found: {0}")]
    ComposeFileNotFound(String),

    #[error("Compose file parse error: {0}")]
    ComposeParse(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Runtime command `{command}` failed: {stderr}")]
    Runtime { command: String, stderr: String },

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(String),
}

impl From<serde_yaml::Error> for DtopError {
    fn from(e: serde_yaml::Error) -> Self {
        DtopError::Yaml(e.to_string())
    }
}

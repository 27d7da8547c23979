//! Docker Compose definitions
//!
//! Loading, rendering and manipulating the dev and prod compose files of a
//! project.

pub mod config;
pub mod parser;

pub use config::{ComposeConfig, ExternalConfig, LabelsConfig, ResourceConfig, ServiceConfig};
pub use parser::ComposeParser;

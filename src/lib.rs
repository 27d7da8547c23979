//! Docktapus - run each service of a compose project from prod or dev
//!
//! A project has two Docker Compose definitions, prod and dev, that share
//! networks and volumes. Docktapus brings the project up with any subset of
//! services taken from dev and the rest from prod, and swaps single
//! services between the two while the others keep running. It supports:
//!
//! - A registry of projects and their compose files
//! - Shared network and volume reconciliation
//! - Labelling of everything it starts, read back to know what runs where
//! - Per-service swaps and project teardown

pub mod commands;
pub mod compose;
pub mod error;
pub mod labels;
pub mod launch;
pub mod plan;
pub mod reconcile;
pub mod registry;
pub mod runtime;
pub mod swap;
pub mod teardown;

pub use error::{DtopError, Result};

//! Command implementations behind the `dtop` CLI
//!
//! Each command takes the runtime and registry data it needs as arguments
//! and returns a result for the caller to print; none of them prints.

pub mod project;
pub mod stack;

pub use project::{init, update, ProjectUpdate};
pub use stack::{down, ls, render_table, swap, up, ContainerRow, ProjectListing};

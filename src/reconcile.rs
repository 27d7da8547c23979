//! Shared resource reconciliation
//!
//! The dev and prod definitions of a project share the same networks and
//! volumes. Rather than letting compose create them per definition, they
//! are created once up front (or adopted when they already exist) and the
//! definition is rewritten to reference them as external.

use crate::compose::{ComposeConfig, ResourceConfig};
use crate::error::Result;
use crate::labels::ownership_labels;
use crate::runtime::{ContainerRuntime, ResourceKind};
use indexmap::IndexMap;

/// Ensures the networks and volumes of a definition exist
pub struct ResourceReconciler<'a, R: ContainerRuntime> {
    runtime: &'a R,
    project_name: String,
}

impl<'a, R: ContainerRuntime> ResourceReconciler<'a, R> {
    /// Create a reconciler for a project
    pub fn new(runtime: &'a R, project_name: &str) -> Self {
        Self {
            runtime,
            project_name: project_name.to_string(),
        }
    }

    /// Return a copy of the definition whose networks and volumes all point
    /// at existing, external resources.
    ///
    /// Resources that already exist are joined untouched. Missing ones are
    /// created with the project's ownership label; a failed creation aborts.
    pub async fn reconcile(&self, definition: &ComposeConfig) -> Result<ComposeConfig> {
        self.ensure(ResourceKind::Network, &definition.networks)
            .await?;
        self.ensure(ResourceKind::Volume, &definition.volumes)
            .await?;

        Ok(externalize(definition))
    }

    async fn ensure(
        &self,
        kind: ResourceKind,
        entries: &IndexMap<String, Option<ResourceConfig>>,
    ) -> Result<()> {
        for (logical, config) in entries {
            let physical = physical_name(logical, config.as_ref());

            if self.runtime.resource_exists(kind, &physical).await? {
                tracing::info!("  ↳ {} '{}' already exists, joining", kind, physical);
            } else {
                tracing::info!("  ↳ creating {} '{}'", kind, physical);
                self.runtime
                    .create_resource(kind, &physical, &ownership_labels(&self.project_name))
                    .await?;
            }
        }

        Ok(())
    }
}

/// Copy of the definition with every network and volume rewritten to
/// `{ name: <physical>, external: true }`. Touches no runtime.
pub fn externalize(definition: &ComposeConfig) -> ComposeConfig {
    let mut rewritten = definition.clone();
    rewritten.networks = external_refs(&definition.networks);
    rewritten.volumes = external_refs(&definition.volumes);
    rewritten
}

fn external_refs(
    entries: &IndexMap<String, Option<ResourceConfig>>,
) -> IndexMap<String, Option<ResourceConfig>> {
    entries
        .iter()
        .map(|(logical, config)| {
            let physical = physical_name(logical, config.as_ref());
            (logical.clone(), Some(ResourceConfig::external(&physical)))
        })
        .collect()
}

/// Physical resource name: the explicit `name` if set, else the logical key
pub fn physical_name(logical: &str, config: Option<&ResourceConfig>) -> String {
    config
        .and_then(|c| c.name.as_deref())
        .filter(|name| !name.is_empty())
        .unwrap_or(logical)
        .to_string()
}

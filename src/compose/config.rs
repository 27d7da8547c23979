//! Docker Compose configuration types
//!
//! Only the parts of a compose file that Docktapus reasons about are typed:
//! services (with their labels), networks and volumes. Everything else is
//! carried through verbatim so the file handed back to `docker compose` is
//! the user's definition plus our edits, and nothing more.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};

/// Docker Compose file configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Services, in declaration order
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub services: IndexMap<String, ServiceConfig>,
    /// Networks
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub networks: IndexMap<String, Option<ResourceConfig>>,
    /// Volumes
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub volumes: IndexMap<String, Option<ResourceConfig>>,
    /// Any other top-level keys (version, name, secrets, configs, x-*)
    #[serde(flatten)]
    pub extra: Mapping,
}

impl ComposeConfig {
    /// Service names in declaration order
    pub fn service_names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    /// Check whether a service is defined
    pub fn has_service(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Copy of this definition reduced to a single service.
    ///
    /// All non-service top-level keys are kept unchanged. Returns `None`
    /// when the service is not defined.
    pub fn only_service(&self, name: &str) -> Option<ComposeConfig> {
        let service = self.services.get(name)?.clone();

        let mut services = IndexMap::new();
        services.insert(name.to_string(), service);

        Some(ComposeConfig {
            services,
            networks: self.networks.clone(),
            volumes: self.volumes.clone(),
            extra: self.extra.clone(),
        })
    }
}

/// Service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<LabelsConfig>,
    /// Everything else (image, build, ports, ...)
    #[serde(flatten)]
    pub rest: Mapping,
}

impl ServiceConfig {
    /// Create a service running the given image
    pub fn image(image: &str) -> Self {
        let mut rest = Mapping::new();
        rest.insert(Value::from("image"), Value::from(image));
        Self { labels: None, rest }
    }
}

/// Labels configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelsConfig {
    /// Array of "key=value" strings
    List(Vec<String>),
    /// Map of key to value
    Map(IndexMap<String, Value>),
}

impl LabelsConfig {
    /// Flatten either representation into an ordered key/value map.
    ///
    /// List entries without `=` become a key with an empty value; non-string
    /// scalar values are rendered as text.
    pub fn to_map(&self) -> IndexMap<String, String> {
        match self {
            LabelsConfig::List(items) => items
                .iter()
                .map(|item| match item.split_once('=') {
                    Some((key, value)) => (key.to_string(), value.to_string()),
                    None => (item.clone(), String::new()),
                })
                .collect(),
            LabelsConfig::Map(map) => map
                .iter()
                .map(|(key, value)| (key.clone(), scalar_to_string(value)))
                .collect(),
        }
    }
}

impl From<IndexMap<String, String>> for LabelsConfig {
    fn from(map: IndexMap<String, String>) -> Self {
        LabelsConfig::Map(map.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
    }
}

/// Top-level network or volume configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Explicit physical name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// External resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<ExternalConfig>,
    /// Driver, driver_opts, labels, ...
    #[serde(flatten)]
    pub rest: Mapping,
}

impl ResourceConfig {
    /// Reference to a resource managed outside of compose
    pub fn external(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            external: Some(ExternalConfig::Bool(true)),
            rest: Mapping::new(),
        }
    }
}

/// External resource configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalConfig {
    /// Boolean
    Bool(bool),
    /// With name (legacy syntax)
    Named { name: String },
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

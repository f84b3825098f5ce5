//! Per-service deployment descriptors (`deploy.yml`)
//!
//! Only the keys the generator consumes are modeled; everything else in a
//! descriptor is ignored. Parsing happens in two steps so that services
//! which do not opt into proxying are never held to the typed schema:
//!
//! 1. the file is parsed as generic YAML and `proxy.enabled` is inspected
//! 2. opted-in services are deserialized into [`ServiceDescriptor`]

use crate::error::{GenerateError, Result};
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use std::path::Path;

/// Container port used when `runtime.container_port` is absent
pub const DEFAULT_CONTAINER_PORT: u16 = 8080;

/// Catch-all nginx `server_name`
pub const DEFAULT_DOMAIN: &str = "_";

/// Root location
pub const DEFAULT_PATH: &str = "/";

/// Typed view of a service descriptor
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceDescriptor {
    #[serde(default)]
    pub service: ServiceSection,

    #[serde(default)]
    pub proxy: ProxySection,

    #[serde(default)]
    pub runtime: RuntimeSection,

    #[serde(default)]
    pub nginx: NginxSection,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceSection {
    /// Service identifier, also the default upstream host
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProxySection {
    /// Whether the service is exposed through the proxy
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub enabled: bool,

    /// Public domain (default: "_")
    pub domain: Option<String>,

    /// Location path (default: "/")
    pub path: Option<String>,

    /// Strip the matched path before forwarding
    #[serde(default)]
    pub strip_prefix: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeSection {
    #[serde(default = "default_container_port")]
    pub container_port: u16,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            container_port: default_container_port(),
        }
    }
}

fn default_container_port() -> u16 {
    DEFAULT_CONTAINER_PORT
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct NginxSection {
    /// Explicit backends; when non-empty they replace the service route
    #[serde(default)]
    pub backends: Vec<BackendEntry>,
}

/// One explicit backend under `nginx.backends`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BackendEntry {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub path: Option<String>,
    /// Full `host:port`; defaults to `<name>:<container_port>`
    pub upstream: Option<String>,
}

impl ServiceDescriptor {
    /// Parse descriptor text, returning `None` for services that do not opt in
    pub fn parse(path: &Path, content: &str) -> Result<Option<Self>> {
        let value: Value =
            serde_yaml::from_str(content).map_err(|source| GenerateError::DescriptorParse {
                path: path.to_path_buf(),
                source,
            })?;

        if !proxy_enabled(path, &value)? {
            return Ok(None);
        }

        let descriptor: ServiceDescriptor =
            serde_yaml::from_value(value).map_err(|e| GenerateError::DescriptorShape {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(Some(descriptor))
    }

    /// Read and parse a descriptor file
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content =
            std::fs::read_to_string(path).map_err(|source| GenerateError::ReadDescriptor {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(path, &content)
    }

    pub fn has_backends(&self) -> bool {
        !self.nginx.backends.is_empty()
    }

    pub fn container_port(&self) -> u16 {
        self.runtime.container_port
    }

    /// Declared service name, if present and non-empty
    pub fn service_name(&self) -> Option<&str> {
        self.service.name.as_deref().filter(|n| !n.trim().is_empty())
    }

    /// Name used in logs and errors, falling back to the directory name
    pub fn label<'a>(&'a self, dir_name: &'a str) -> &'a str {
        self.service_name().unwrap_or(dir_name)
    }

    /// Check the fields that have no default
    pub fn validate(&self, dir_name: &str) -> Result<()> {
        if !self.has_backends() {
            if self.service_name().is_none() {
                return Err(GenerateError::MissingField {
                    service: dir_name.to_string(),
                    field: "service.name".to_string(),
                });
            }
            return Ok(());
        }

        for (i, backend) in self.nginx.backends.iter().enumerate() {
            let named = backend
                .name
                .as_deref()
                .is_some_and(|n| !n.trim().is_empty());
            if !named {
                return Err(GenerateError::MissingField {
                    service: self.label(dir_name).to_string(),
                    field: format!("nginx.backends[{}].name", i),
                });
            }
        }

        Ok(())
    }
}

/// Truthiness of a descriptor value
///
/// YAML 1.1 boolean words (`yes`, `on`, `off`, ...) are parsed as plain
/// strings by serde_yaml, so they are matched here case-insensitively.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "" | "no" | "off" | "false"
        ),
        Value::Sequence(seq) => !seq.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}

fn deserialize_truthy<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| is_truthy(&v))
}

/// A truthy `proxy.enabled` opts in; absent or falsy opts out
fn proxy_enabled(path: &Path, value: &Value) -> Result<bool> {
    match value {
        Value::Null => Ok(false),
        Value::Mapping(root) => Ok(root
            .get("proxy")
            .and_then(|proxy| proxy.get("enabled"))
            .is_some_and(is_truthy)),
        _ => Err(GenerateError::DescriptorShape {
            path: path.to_path_buf(),
            message: "top-level value must be a mapping".to_string(),
        }),
    }
}

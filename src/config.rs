use crate::error::GenerateError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Global configuration for the generator
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GeneratorConfig {
    /// Where descriptors are read from and the config is written to
    #[serde(default)]
    pub paths: PathsConfig,

    /// Global nginx settings
    #[serde(default)]
    pub nginx: NginxConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    /// Directory with one subdirectory per service (default: services)
    #[serde(default = "default_services_dir")]
    pub services_dir: PathBuf,

    /// Descriptor file name inside each service directory (default: deploy.yml)
    #[serde(default = "default_descriptor_file")]
    pub descriptor_file: String,

    /// Generated config path (default: services/nginx/nginx.conf)
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            services_dir: default_services_dir(),
            descriptor_file: default_descriptor_file(),
            output: default_output(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NginxConfig {
    /// Port every server block listens on (default: 80)
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// DNS resolver used for runtime upstream resolution.
    /// Defaults to Docker's embedded DNS.
    #[serde(default = "default_resolver")]
    pub resolver: String,

    /// events.worker_connections (default: 1024)
    #[serde(default = "default_worker_connections")]
    pub worker_connections: u32,

    /// Request body limit per server block (default: 50M)
    #[serde(default = "default_client_max_body_size")]
    pub client_max_body_size: String,
}

impl Default for NginxConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            resolver: default_resolver(),
            worker_connections: default_worker_connections(),
            client_max_body_size: default_client_max_body_size(),
        }
    }
}

fn default_services_dir() -> PathBuf {
    PathBuf::from("services")
}

fn default_descriptor_file() -> String {
    "deploy.yml".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("services/nginx/nginx.conf")
}

fn default_listen_port() -> u16 {
    80
}

fn default_resolver() -> String {
    "127.0.0.11".to_string()
}

fn default_worker_connections() -> u32 {
    1024
}

fn default_client_max_body_size() -> String {
    "50M".to_string()
}

impl GeneratorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GeneratorConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration
    pub fn validate(&self) -> Result<(), GenerateError> {
        let mut errors = Vec::new();

        if self.paths.services_dir.as_os_str().is_empty() {
            errors.push("paths.services_dir must not be empty".to_string());
        }
        if self.paths.descriptor_file.trim().is_empty() {
            errors.push("paths.descriptor_file must not be empty".to_string());
        }
        if self.paths.output.as_os_str().is_empty() {
            errors.push("paths.output must not be empty".to_string());
        }
        if self.nginx.listen_port == 0 {
            errors.push("nginx.listen_port must be non-zero".to_string());
        }
        if self.nginx.resolver.trim().is_empty() {
            errors.push("nginx.resolver must not be empty".to_string());
        }
        if self.nginx.client_max_body_size.trim().is_empty() {
            errors.push("nginx.client_max_body_size must not be empty".to_string());
        }
        if self.nginx.worker_connections == 0 {
            errors.push("nginx.worker_connections must be non-zero".to_string());
        }

        if !errors.is_empty() {
            return Err(GenerateError::Config(errors.join("; ")));
        }

        Ok(())
    }
}

//! Service registry loader
//!
//! Scans the services directory and returns every service whose descriptor
//! opts into proxying, in the order the file system lists them.

use crate::descriptor::ServiceDescriptor;
use crate::error::{GenerateError, Result};
use std::path::Path;
use tracing::{debug, info};

/// A proxied service and its descriptor
#[derive(Debug, Clone)]
pub struct LoadedService {
    /// `service.name`, or the directory name when only backends are declared
    pub name: String,
    /// Name of the service's directory
    pub dir_name: String,
    pub descriptor: ServiceDescriptor,
}

impl LoadedService {
    /// Build from an in-memory descriptor, validating required fields
    pub fn new(dir_name: &str, descriptor: ServiceDescriptor) -> Result<Self> {
        descriptor.validate(dir_name)?;
        Ok(Self {
            name: descriptor.label(dir_name).to_string(),
            dir_name: dir_name.to_string(),
            descriptor,
        })
    }
}

/// Load all proxied services under `services_dir`
///
/// Non-directories, directories without a descriptor and services that do
/// not set a truthy `proxy.enabled` are skipped. Any unreadable or malformed
/// descriptor aborts the whole load.
pub fn load_services(services_dir: &Path, descriptor_file: &str) -> Result<Vec<LoadedService>> {
    let read_dir_err = |source| GenerateError::ReadDir {
        path: services_dir.to_path_buf(),
        source,
    };

    let mut services = Vec::new();

    for entry in std::fs::read_dir(services_dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let service_path = entry.path();

        if !service_path.is_dir() {
            continue;
        }

        let descriptor_path = service_path.join(descriptor_file);
        if !descriptor_path.exists() {
            debug!(dir = %service_path.display(), "No descriptor, skipping");
            continue;
        }

        let dir_name = entry.file_name().to_string_lossy().into_owned();

        let Some(descriptor) = ServiceDescriptor::load(&descriptor_path)? else {
            debug!(dir = %dir_name, "Proxy not enabled, skipping");
            continue;
        };

        let service = LoadedService::new(&dir_name, descriptor)?;
        info!(
            service = %service.name,
            dir = %dir_name,
            backends = service.descriptor.nginx.backends.len(),
            "Service included"
        );
        services.push(service);
    }

    Ok(services)
}

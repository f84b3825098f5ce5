//! One generation run: load, resolve, render, write
//!
//! The document is fully rendered before anything touches the output path,
//! and the write itself goes through a temp file that is persisted over the
//! target, so a failed run leaves the previous config in place.

use crate::config::GeneratorConfig;
use crate::error::{GenerateError, Result};
use crate::nginx;
use crate::registry::{self, LoadedService};
use crate::routes;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// No service opted into proxying; nothing was written
    NoServices,
    /// The config was written to `path`
    Written {
        path: PathBuf,
        document: String,
        services: usize,
        domains: usize,
        routes: usize,
    },
}

/// A rendered document and what went into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub document: String,
    pub domains: usize,
    pub routes: usize,
}

/// Render the document for already-loaded services
///
/// Pure: touches no files. Returns `None` when `services` is empty.
pub fn render(config: &GeneratorConfig, services: &[LoadedService]) -> Option<Rendered> {
    if services.is_empty() {
        return None;
    }

    let groups = routes::group_by_domain(services);
    Some(Rendered {
        document: nginx::render(&config.nginx, &config.paths.descriptor_file, &groups),
        domains: groups.len(),
        routes: groups.iter().map(|g| g.routes.len()).sum(),
    })
}

/// Run a full generation against the file system
pub fn generate(config: &GeneratorConfig) -> Result<Generation> {
    config.validate()?;

    let services = registry::load_services(&config.paths.services_dir, &config.paths.descriptor_file)?;
    let Some(rendered) = render(config, &services) else {
        info!(dir = %config.paths.services_dir.display(), "No services with proxy enabled");
        return Ok(Generation::NoServices);
    };

    write_atomic(&config.paths.output, &rendered.document)?;

    info!(
        path = %config.paths.output.display(),
        services = services.len(),
        domains = rendered.domains,
        routes = rendered.routes,
        "Generated nginx configuration"
    );

    Ok(Generation::Written {
        path: config.paths.output.clone(),
        document: rendered.document,
        services: services.len(),
        domains: rendered.domains,
        routes: rendered.routes,
    })
}

/// Replace `path` with `content` without exposing a partially written file
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let write_err = |source| GenerateError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, GeneratorConfig) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GeneratorConfig::default();
        config.paths.services_dir = dir.path().join("services");
        config.paths.output = dir.path().join("services").join("nginx").join("nginx.conf");
        fs::create_dir_all(dir.path().join("services").join("nginx")).unwrap();
        (dir, config)
    }

    fn write_service(config: &GeneratorConfig, dir: &str, descriptor: &str) {
        let service_dir = config.paths.services_dir.join(dir);
        fs::create_dir_all(&service_dir).unwrap();
        fs::write(service_dir.join("deploy.yml"), descriptor).unwrap();
    }

    #[test]
    fn test_render_empty_is_none() {
        assert!(render(&GeneratorConfig::default(), &[]).is_none());
    }

    #[test]
    fn test_render_counts_domains_and_routes() {
        let (_dir, config) = setup();
        write_service(&config, "api", "service:\n  name: api\nproxy:\n  enabled: true\n  domain: api.test\n");
        write_service(
            &config,
            "shop",
            "service:\n  name: shop\nproxy:\n  enabled: true\nnginx:\n  backends:\n    - name: shop-a\n    - name: shop-b\n      domain: api.test\n",
        );
        let services =
            registry::load_services(&config.paths.services_dir, &config.paths.descriptor_file).unwrap();

        let rendered = render(&config, &services).unwrap();

        assert_eq!(rendered.domains, 2);
        assert_eq!(rendered.routes, 3);
        assert!(rendered.document.contains("server_name api.test;"));
        // rendering alone writes nothing
        assert!(!config.paths.output.exists());
    }

    #[test]
    fn test_generate_writes_file() {
        let (_dir, config) = setup();
        write_service(&config, "api", "service:\n  name: api\nproxy:\n  enabled: true\n");

        let result = generate(&config).unwrap();

        match result {
            Generation::Written { path, document, services, domains, routes } => {
                assert_eq!(path, config.paths.output);
                assert_eq!(fs::read_to_string(&path).unwrap(), document);
                assert_eq!(services, 1);
                assert_eq!(domains, 1);
                assert_eq!(routes, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_no_services_leaves_output_untouched() {
        let (_dir, config) = setup();
        fs::write(&config.paths.output, "previous").unwrap();
        write_service(&config, "worker", "service:\n  name: worker\n");

        assert_eq!(generate(&config).unwrap(), Generation::NoServices);
        assert_eq!(fs::read_to_string(&config.paths.output).unwrap(), "previous");
    }

    #[test]
    fn test_fatal_error_leaves_output_untouched() {
        let (_dir, config) = setup();
        fs::write(&config.paths.output, "previous").unwrap();
        write_service(&config, "api", "service:\n  name: api\nproxy:\n  enabled: true\n");
        write_service(&config, "broken", "proxy:\n  enabled: true\n  domain: [\n");

        assert!(generate(&config).is_err());
        assert_eq!(fs::read_to_string(&config.paths.output).unwrap(), "previous");
    }

    #[test]
    fn test_missing_output_dir_is_write_error() {
        let (dir, mut config) = setup();
        config.paths.output = dir.path().join("missing").join("nginx.conf");
        write_service(&config, "api", "service:\n  name: api\nproxy:\n  enabled: true\n");

        let err = generate(&config).unwrap_err();
        assert!(matches!(err, GenerateError::Write { .. }));
    }

    #[test]
    fn test_invalid_config_is_rejected_before_scanning() {
        let (_dir, mut config) = setup();
        config.nginx.resolver = String::new();

        let err = generate(&config).unwrap_err();
        assert!(matches!(err, GenerateError::Config(_)));
    }
}

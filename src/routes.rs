//! Route resolution and per-domain grouping

use crate::descriptor::{DEFAULT_DOMAIN, DEFAULT_PATH};
use crate::registry::LoadedService;

/// One emission-ready location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Owning service or backend name
    pub name: String,
    /// `host:port` the location forwards to
    pub upstream: String,
    pub path: String,
    pub strip_prefix: bool,
}

impl Route {
    /// Whether the matched path is rewritten to `/` before forwarding
    pub fn rewrites_path(&self) -> bool {
        self.strip_prefix && self.path != DEFAULT_PATH
    }
}

/// Routes sharing a `server_name`, in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainGroup {
    pub domain: String,
    pub routes: Vec<Route>,
}

/// Resolve a service into its routes, paired with their domains
///
/// Explicit backends replace the service-level route entirely; none of the
/// `proxy.*` fields leak into backend routes.
pub fn resolve_service(service: &LoadedService) -> Vec<(String, Route)> {
    let descriptor = &service.descriptor;
    let port = descriptor.container_port();

    if descriptor.has_backends() {
        return descriptor
            .nginx
            .backends
            .iter()
            .map(|backend| {
                let name = backend.name.clone().unwrap_or_default();
                let upstream = backend
                    .upstream
                    .clone()
                    .unwrap_or_else(|| format!("{}:{}", name, port));
                let domain = backend.domain.as_deref().unwrap_or(DEFAULT_DOMAIN);
                let route = Route {
                    upstream,
                    path: backend.path.as_deref().unwrap_or(DEFAULT_PATH).to_string(),
                    strip_prefix: false,
                    name,
                };
                (domain.to_string(), route)
            })
            .collect();
    }

    let proxy = &descriptor.proxy;
    let domain = proxy.domain.as_deref().unwrap_or(DEFAULT_DOMAIN);
    let route = Route {
        name: service.name.clone(),
        upstream: format!("{}:{}", service.name, port),
        path: proxy.path.as_deref().unwrap_or(DEFAULT_PATH).to_string(),
        strip_prefix: proxy.strip_prefix,
    };

    vec![(domain.to_string(), route)]
}

/// Group every service's routes by domain
///
/// Domains appear in the order first seen; routes keep discovery order
/// within a domain. Duplicate domain+path pairs are kept as-is.
pub fn group_by_domain(services: &[LoadedService]) -> Vec<DomainGroup> {
    let mut groups: Vec<DomainGroup> = Vec::new();

    for service in services {
        for (domain, route) in resolve_service(service) {
            match groups.iter_mut().find(|g| g.domain == domain) {
                Some(group) => group.routes.push(route),
                None => groups.push(DomainGroup {
                    domain,
                    routes: vec![route],
                }),
            }
        }
    }

    groups
}

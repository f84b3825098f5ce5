//! nginx configuration emitter
//!
//! Produces the complete `nginx.conf` text from resolved domain groups.
//! Upstreams are always proxied through a variable so nginx resolves the
//! hostname per request via `resolver` instead of once at load time;
//! backend containers may not exist yet when the config is loaded.

use crate::config::NginxConfig;
use crate::routes::{DomainGroup, Route};

/// connect/send/read timeout applied to every location
pub const PROXY_TIMEOUT_SECS: u64 = 60;

/// Fixed health check location served by the proxy itself
pub const HEALTH_PATH: &str = "/health";

/// Name of the nginx variable holding a route's upstream
///
/// nginx variable names only allow `[A-Za-z0-9_]`.
pub fn upstream_variable(route_name: &str) -> String {
    let ident: String = route_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!("upstream_{}", ident)
}

/// Render the full configuration document
pub fn render(config: &NginxConfig, descriptor_file: &str, groups: &[DomainGroup]) -> String {
    let mut out = render_globals(config, descriptor_file);
    out.push_str(&render_health_server(config));

    for group in groups {
        out.push_str(&render_server(config, group));
    }

    out.push_str("}\n");
    out
}

fn render_globals(config: &NginxConfig, descriptor_file: &str) -> String {
    format!(
        r#"# Auto-generated Nginx configuration
# Generated from service {descriptor_file} files

events {{
    worker_connections {worker_connections};
}}

http {{
    include /etc/nginx/mime.types;
    default_type application/octet-stream;

    log_format main '$remote_addr - $remote_user [$time_local] "$request" '
                    '$status $body_bytes_sent "$http_referer" '
                    '"$http_user_agent" "$http_x_forwarded_for"';

    access_log /var/log/nginx/access.log main;
    error_log /var/log/nginx/error.log warn;

    sendfile on;
    tcp_nopush on;
    keepalive_timeout 65;
    gzip on;

    # Runtime DNS resolution for upstream hostnames
    resolver {resolver} valid=10s;
    resolver_timeout 5s;
"#,
        descriptor_file = descriptor_file,
        worker_connections = config.worker_connections,
        resolver = config.resolver,
    )
}

fn render_health_server(config: &NginxConfig) -> String {
    format!(
        r#"
    # Health check endpoint
    server {{
        listen {port};
        server_name _;

        location {path} {{
            access_log off;
            return 200 "healthy\n";
            add_header Content-Type text/plain;
        }}
    }}
"#,
        port = config.listen_port,
        path = HEALTH_PATH,
    )
}

fn render_server(config: &NginxConfig, group: &DomainGroup) -> String {
    let mut block = format!(
        r#"
    server {{
        listen {port};
        server_name {domain};

        client_max_body_size {body_size};
"#,
        port = config.listen_port,
        domain = group.domain,
        body_size = config.client_max_body_size,
    );

    for route in &group.routes {
        block.push_str(&render_location(route));
    }

    block.push_str("    }\n");
    block
}

fn render_location(route: &Route) -> String {
    let var = upstream_variable(&route.name);
    let suffix = if route.rewrites_path() { "/" } else { "" };

    format!(
        r#"
        location {path} {{
            # Variable forces per-request DNS resolution
            set ${var} {upstream};
            proxy_pass http://${var}{suffix};
            proxy_set_header Host $host;
            proxy_set_header X-Real-IP $remote_addr;
            proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
            proxy_set_header X-Forwarded-Proto $scheme;
            proxy_http_version 1.1;
            proxy_set_header Connection "";

            proxy_connect_timeout {timeout}s;
            proxy_send_timeout {timeout}s;
            proxy_read_timeout {timeout}s;
        }}
"#,
        path = route.path,
        var = var,
        upstream = route.upstream,
        suffix = suffix,
        timeout = PROXY_TIMEOUT_SECS,
    )
}

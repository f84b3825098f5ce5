use anyhow::Context;
use routegen::{generate, GeneratorConfig, Generation};
use std::path::PathBuf;
use tracing::{debug, error};

fn main() {
    // Logs go to stderr; stdout carries the status line and the document
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("routegen=info".parse().expect("valid log directive")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            let config = GeneratorConfig::load(&path).map_err(|e| {
                error!(path = %path.display(), error = %e, "Failed to load configuration");
                e.context(format!("Failed to load configuration from {}", path.display()))
            })?;
            debug!(path = %path.display(), "Configuration loaded");
            config
        }
        None => GeneratorConfig::default(),
    };

    let generation = generate(&config).map_err(|e| {
        error!(code = e.code(), error = %e, "Generation failed");
        e
    });

    match generation.context("Failed to generate nginx configuration")? {
        Generation::NoServices => {
            println!("No services with proxy enabled found");
        }
        Generation::Written { path, document, .. } => {
            println!("✅ Generated nginx configuration: {}", path.display());
            println!("\n{}", document);
        }
    }

    Ok(())
}

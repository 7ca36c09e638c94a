//! CLI for `route-docs-openapi`.
//!
//! # Subcommands
//!
//! ```text
//! # Render the document for a manifest
//! route-docs-openapi render \
//!   --manifest api/actions.yaml \
//!   --config api/document.yaml \
//!   --output target/openapi.json
//!
//! # Only validate the manifest (patterns, methods, route collisions)
//! route-docs-openapi check --manifest api/actions.yaml
//! ```

#![forbid(unsafe_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use route_docs_openapi::{DocumentConfig, Manifest, SpecBuilder};
use tracing_subscriber::EnvFilter;

/// `OpenAPI` document renderer for route-docs action manifests.
#[derive(Parser)]
#[command(name = "route-docs-openapi", version, about)]
enum Cli {
    /// Render the `OpenAPI` JSON document for a manifest.
    Render(RenderArgs),

    /// Validate a manifest without rendering.
    Check(CheckArgs),
}

#[derive(Parser)]
struct RenderArgs {
    /// Path to the action manifest YAML.
    #[arg(short, long)]
    manifest: PathBuf,

    /// Path to a document config YAML (title, version, servers, ...).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON. Overrides `pretty` from the config file.
    #[arg(long)]
    pretty: bool,
}

#[derive(Parser)]
struct CheckArgs {
    /// Path to the action manifest YAML.
    #[arg(short, long)]
    manifest: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse() {
        Cli::Render(args) => run_render(&args),
        Cli::Check(args) => run_check(&args),
    }
}

fn load_manifest(path: &Path) -> anyhow::Result<Manifest> {
    Manifest::load(path).with_context(|| format!("Failed to load manifest: {}", path.display()))
}

fn run_render(args: &RenderArgs) -> anyhow::Result<()> {
    let manifest = load_manifest(&args.manifest)?;

    let mut config = match &args.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading document config");
            DocumentConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?
        }
        None => DocumentConfig::default(),
    };
    if args.pretty {
        config.pretty = true;
    }

    let snapshot = manifest
        .snapshot()
        .with_context(|| format!("Invalid manifest: {}", args.manifest.display()))?;
    let body = SpecBuilder::new(config)
        .render(&snapshot)
        .context("Failed to render document")?;

    match &args.output {
        Some(path) => {
            fs::write(path, &body)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), actions = snapshot.len(), "document written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&body).context("Failed to write to stdout")?;
            stdout.write_all(b"\n").context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn run_check(args: &CheckArgs) -> anyhow::Result<()> {
    let manifest = load_manifest(&args.manifest)?;
    let registry = manifest
        .to_registry()
        .with_context(|| format!("Invalid manifest: {}", args.manifest.display()))?;
    SpecBuilder::default()
        .build(&registry.snapshot())
        .with_context(|| format!("Manifest does not render: {}", args.manifest.display()))?;
    tracing::info!(actions = registry.len(), "manifest is valid");
    Ok(())
}

//! Entity Lens CLI
//!
//! Thin command-line front end over the library: parse a directory of
//! entity descriptors, resolve a schema from an OpenAPI document, validate
//! a document against its meta-schema, or report a document's version.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use entity_lens::openapi::{build_example, version_info, ComponentGraph};
use entity_lens::{
    loader, BatchOutcome, BatchParser, GraphProjector, LensConfig, SpecDocument, SpecValidatorCache, ValidatorCache,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "entity-lens")]
#[command(about = "Inspect entity descriptors and OpenAPI schemas")]
struct Cli {
    /// Explicit config file (entity-lens.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse every descriptor in a directory and print the entity graph
    Entities {
        /// Directory containing .json / .js descriptors
        dir: PathBuf,
        /// Validate descriptors against the TypeORM/Sequelize schemas
        #[arg(long)]
        validate: bool,
    },

    /// Resolve one named schema from an OpenAPI/Swagger document
    Resolve {
        /// Spec file (.json, .yaml, .yml)
        spec: PathBuf,
        /// Schema name under components.schemas / definitions
        schema: String,
        /// Print an example value instead of the resolved schema
        #[arg(long)]
        example: bool,
    },

    /// Validate a spec against the OpenAPI / Swagger meta-schema for its version
    Validate {
        spec: PathBuf,
    },

    /// Print version detection results for a spec
    Version {
        spec: PathBuf,
    },

    /// Print endpoints grouped by tag
    Endpoints {
        spec: PathBuf,
    },

    /// Print domain models, referenced schemas and reference cycles
    Components {
        spec: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_ref().map(|p| p.to_string_lossy().into_owned());
    let config = LensConfig::load_from(config_path.as_deref()).context("Failed to load configuration")?;

    let output = match cli.command {
        Commands::Entities { dir, validate } => {
            let documents = loader::load_documents(&dir, &config.parse)?;

            let cache = ValidatorCache::new();
            let parser = if validate || config.parse.validate_descriptors {
                BatchParser::with_validation(&cache)
            } else {
                BatchParser::new()
            };
            let batch = parser.parse(&documents);

            match batch.outcome() {
                BatchOutcome::Empty => eprintln!("No descriptor files found in {}", dir.display()),
                BatchOutcome::AllFailed(n) => eprintln!("All {} descriptor files failed to parse", n),
                BatchOutcome::Parsed { entities, failures } => {
                    eprintln!("Parsed {} entities ({} failed documents)", entities, failures)
                }
            }

            let graph = GraphProjector::new(&config.layout).project(&batch.entities, &batch.relations);
            json!({
                "entities": batch.entities,
                "relations": batch.relations,
                "nodes": graph.nodes,
                "edges": graph.edges,
                "failures": batch.failures,
                "diagnostics": batch.diagnostics,
                "fingerprint": batch.fingerprint,
            })
        }

        Commands::Resolve { spec, schema, example } => {
            let doc = SpecDocument::from_path(&spec)?;
            let Some(resolved) = doc.resolve_named(&schema) else {
                bail!("Schema '{}' not found in {}", schema, spec.display());
            };

            if example {
                build_example(&resolved).unwrap_or(serde_json::Value::Null)
            } else {
                resolved
            }
        }

        Commands::Validate { spec } => {
            let doc = SpecDocument::from_path(&spec)?;
            let report = SpecValidatorCache::new().validate_spec(doc.raw());
            if !report.valid {
                eprintln!("{} failed validation with {} errors", spec.display(), report.errors.len());
            }
            serde_json::to_value(report)?
        }

        Commands::Version { spec } => {
            let doc = SpecDocument::from_path(&spec)?;
            serde_json::to_value(version_info(doc.raw(), &config.openapi.supported_versions))?
        }

        Commands::Endpoints { spec } => {
            let doc = SpecDocument::from_path(&spec)?;
            serde_json::to_value(doc.group_by_tags())?
        }

        Commands::Components { spec } => {
            let doc = SpecDocument::from_path(&spec)?;
            let empty = serde_json::Map::new();
            let graph = ComponentGraph::build(doc.schemas().unwrap_or(&empty));

            let domain: Vec<&str> = doc.domain_models().into_iter().map(|(name, _)| name).collect();
            json!({
                "domainModels": domain,
                "referenced": graph.referenced_schemas(),
                "cycles": graph.cycles(),
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

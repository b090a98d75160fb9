//! `modstore` probe binary.
//!
//! # Responsibility
//! - Finalize one module configuration file and print what registration
//!   would see: (optionally version-mapped) collections and the operation
//!   table with synthesized create args.
//! - List the placeholders each operation expects in its context.
//! - Optionally render one named operation against a JSON context.

use clap::Parser;
use log::{error, info};
use modstore_core::{
    format_placeholder, init_logging, map_collection_versions, placeholders, render_operation,
    CollectionVersionMapEntry, CurrentVersionPolicy, LoggingConfig, ResolvedModuleConfig,
    StorageModuleConfig,
};
use serde_json::{json, Map, Value};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "modstore",
    about = "Finalize a storage module configuration and print its registration output",
    version
)]
struct Cli {
    /// Path to the module configuration JSON
    config: PathBuf,

    /// JSON array of `{ moduleVersion, applicationVersion }` entries
    #[arg(long)]
    mappings: Option<PathBuf>,

    /// Require an exact mapping for every current collection version
    #[arg(long)]
    strict: bool,

    /// Operation to render against `--context`
    #[arg(long)]
    render: Option<String>,

    /// Invocation context for `--render`
    #[arg(long, default_value = "{}")]
    context: String,

    /// Log level written to stderr
    #[arg(long, default_value_t = modstore_core::default_log_level().to_string())]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(&LoggingConfig::stderr(cli.log_level.as_str())) {
        eprintln!("modstore: {err}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(output) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string())
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_run module=cli status=error error={}", err);
            eprintln!("modstore: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<Value, Box<dyn Error>> {
    let config = StorageModuleConfig::from_json_file(&cli.config)?;
    let resolved = ResolvedModuleConfig::finalize(config)?;

    let collections = match &cli.mappings {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
            let mappings: Vec<CollectionVersionMapEntry> = serde_json::from_str(&raw)
                .map_err(|err| format!("failed to parse `{}`: {err}", path.display()))?;
            let policy = if cli.strict {
                CurrentVersionPolicy::Strict
            } else {
                CurrentVersionPolicy::FloorWhenHistoryEmpty
            };
            map_collection_versions(resolved.collections(), &mappings, policy)?
        }
        None => resolved.collections().clone(),
    };

    let mut output = json!({
        "collections": collections,
        "operations": resolved.operations(),
        "placeholders": operation_placeholders(&resolved),
    });

    if let Some(name) = &cli.render {
        let definition = resolved
            .operation(name)
            .ok_or_else(|| format!("unknown operation `{name}`"))?;
        let context: Value = serde_json::from_str(&cli.context)
            .map_err(|err| format!("invalid --context JSON: {err}"))?;
        output["rendered"] = Value::Array(render_operation(definition, &context).into_call());
    }

    info!(
        "event=cli_run module=cli status=ok config={} collections={} operations={}",
        cli.config.display(),
        collections.len(),
        resolved.operations().len()
    );
    Ok(output)
}

/// Placeholder leaves per operation, in template order.
fn operation_placeholders(resolved: &ResolvedModuleConfig) -> Map<String, Value> {
    resolved
        .operations()
        .iter()
        .map(|(name, operation)| {
            let leaves = operation
                .args
                .as_ref()
                .map(|args| {
                    placeholders(args)
                        .into_iter()
                        .map(|leaf| Value::String(format_placeholder(leaf.path, leaf.value_type)))
                        .collect()
                })
                .unwrap_or_default();
            (name.clone(), Value::Array(leaves))
        })
        .collect()
}

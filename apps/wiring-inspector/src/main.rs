mod demo;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use http::Method;
use resource_wiring::{
    DynamicRegistry, ProviderHub, RegistryConfig, RouteResolver, ServiceTracker,
};
use resource_wiring_sdk::RouteTable;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;
use std::sync::Arc;

/// Wiring Inspector - resolve resource routes from dynamically registered providers
#[derive(Parser)]
#[command(name = "wiring-inspector")]
#[command(about = "Wiring Inspector - resolve resource routes from dynamically registered providers")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print effective registry configuration (JSON) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered providers
    List,
    /// Resolve the routes of NESTED under NAME
    Routes {
        name: String,
        nested: String,
        /// Invoke the handler for this HTTP method after resolving
        #[arg(long)]
        call: Option<String>,
        /// Parent id passed to the invoked handler
        #[arg(long)]
        id: Option<String>,
    },
    /// Resolve the routes of a top-level collection
    Collection { name: String },
    /// Resolve the routes of a single item
    Item { name: String },
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config
        && !path.is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    init_logging(cli.verbose);

    // defaults -> YAML (if provided) -> env (RESOURCE_WIRING__*)
    let config = RegistryConfig::load(cli.config.as_deref())?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let command = cli.command.unwrap_or(Commands::List);
    if matches!(command, Commands::Check) {
        println!("Configuration is valid");
        return Ok(());
    }

    let registry = Arc::new(DynamicRegistry::with_config(config));
    let cancel = CancellationToken::new();
    let (tracker, task) = ServiceTracker::open(Arc::clone(&registry), cancel.clone());
    demo::publish(&tracker).await?;
    tracker.sync().await?;
    info!(keys = registry.len(), "Demo providers published");

    let hub = Arc::new(ProviderHub::new());
    demo::register_request_values(&hub);
    let resolver = RouteResolver::from_registry(Arc::clone(&registry), hub);

    let output = execute(&command, &registry, &resolver);

    cancel.cancel();
    task.await?;
    info!("Wiring inspector stopped");

    println!("{}", serde_json::to_string_pretty(&output?)?);
    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn execute(
    command: &Commands,
    registry: &DynamicRegistry,
    resolver: &RouteResolver,
) -> Result<Value> {
    match command {
        Commands::List => Ok(list(registry)),
        Commands::Routes {
            name,
            nested,
            call,
            id,
        } => {
            let table = resolver
                .nested_collection_routes(name, nested)?
                .ok_or_else(|| anyhow!("no routes for '{nested}' under '{name}'"))?;
            let mut out = table_json(&table);
            if let Some(call) = call {
                out["result"] = invoke(&table, call, id.as_deref())?;
            }
            Ok(out)
        }
        Commands::Collection { name } => resolver
            .collection_routes(name)?
            .map(|t| table_json(&t))
            .ok_or_else(|| anyhow!("no collection routes for '{name}'")),
        Commands::Item { name } => resolver
            .item_routes(name)?
            .map(|t| table_json(&t))
            .ok_or_else(|| anyhow!("no item routes for '{name}'")),
        Commands::Check => Ok(json!({ "valid": true })),
    }
}

fn list(registry: &DynamicRegistry) -> Value {
    let entries: Vec<Value> = registry
        .keys()
        .into_iter()
        .filter_map(|k| {
            let d = registry.lookup(k.kind, &k.key)?;
            Some(json!({
                "kind": k.kind.as_str(),
                "key": k.key.as_str(),
                "provider": d.provider_name(),
                "provider_id": d.provider_id().to_string(),
            }))
        })
        .collect();
    Value::Array(entries)
}

fn table_json(table: &RouteTable) -> Value {
    let operations: Vec<Value> = table
        .operations()
        .iter()
        .map(|op| {
            json!({
                "method": op.method.as_str(),
                "name": op.name,
                "path": op.path,
                "collection": op.collection,
            })
        })
        .collect();

    json!({
        "name": table.name(),
        "model_type": table.model_type().name(),
        "identifier_type": table.identifier_type().map(|t| t.name().to_owned()),
        "parent": table.parent().map(|p| json!({
            "name": p.name,
            "identifier_type": p.identifier_type.name(),
        })),
        "operations": operations,
    })
}

fn invoke(table: &RouteTable, method: &str, id: Option<&str>) -> Result<Value> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid HTTP method '{method}'"))?;
    let path = table
        .operations()
        .iter()
        .find(|op| op.method == method)
        .map(|op| op.path.clone())
        .ok_or_else(|| anyhow!("no {method} handler for '{}'", table.name()))?;

    let request = http::Request::builder()
        .method(method.clone())
        .uri(path.replace("{id}", id.unwrap_or("_")))
        .body(())?
        .into_parts()
        .0;
    let body = json!({});

    table
        .invoke(&method, &request, id, Some(&body))
        .ok_or_else(|| anyhow!("no {method} handler for '{}'", table.name()))?
}

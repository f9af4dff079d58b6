use clap::Parser;
use colored::*;
use eyre::{Context, Result, bail};
use log::info;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;
use wacloud::tools::ToolOutcome;
use wacloud::{GraphClient, ToolCall, ToolRegistry};

fn setup_logging(config: &Config, verbose: bool) -> Result<()> {
    let level = if verbose {
        "debug".to_string()
    } else {
        config.log_level.clone().unwrap_or_else(|| "info".to_string())
    };

    // RUST_LOG wins over the configured level
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));

    if let Some(log_file) = &config.log_file {
        if let Some(dir) = log_file.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).context("Failed to create log directory")?;
        }
        let target = Box::new(
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .context("Failed to open log file")?,
        );
        builder.target(env_logger::Target::Pipe(target));
    } else {
        builder.target(env_logger::Target::Stderr);
    }

    builder.init();
    Ok(())
}

fn handle_list_command(registry: &ToolRegistry, filter: Option<&str>) {
    let definitions: Vec<_> = registry
        .definitions()
        .into_iter()
        .filter(|d| filter.is_none_or(|f| d.name.contains(f)))
        .collect();

    let width = definitions.iter().map(|d| d.name.len()).max().unwrap_or(0);
    for def in &definitions {
        println!("{:width$}  {}", def.name.green(), def.description, width = width);
    }
    println!("{} {}", definitions.len().to_string().cyan(), "tools".cyan());
}

fn handle_schema_command(registry: &ToolRegistry, name: Option<&str>) -> Result<()> {
    let schema = match name {
        Some(name) => match registry.definitions_for(&[name]).first() {
            Some(def) => def.to_function_schema(),
            None => bail!("Unknown tool: {}", name),
        },
        None => Value::Array(
            registry
                .definitions()
                .iter()
                .map(|d| d.to_function_schema())
                .collect(),
        ),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn read_arguments(args: Option<&str>, args_file: Option<&Path>) -> Result<Value> {
    let text = match (args, args_file) {
        (Some(text), _) => text.to_string(),
        (None, Some(path)) => {
            fs::read_to_string(path).context(format!("Failed to read arguments from {}", path.display()))?
        }
        (None, None) => return Ok(json!({})),
    };
    serde_json::from_str(&text).context("Arguments are not valid JSON")
}

async fn handle_call_command(
    registry: &ToolRegistry,
    config: &Config,
    name: &str,
    arguments: Value,
    output: Option<&Path>,
) -> Result<()> {
    if !registry.has_tool(name) {
        bail!("Unknown tool: {}", name);
    }
    let client = GraphClient::from_config(&config.api).context("Failed to create API client")?;

    info!("Calling {}", name);
    let outcome = registry.execute(&ToolCall::new(name, arguments), &client).await;

    if let ToolOutcome::Failure(failure) = &outcome {
        eprintln!("{} {}", "Error:".red(), failure.error);
    }

    if let (ToolOutcome::Success(response), Some(path)) = (&outcome, output)
        && let Some(bytes) = response.media_bytes()
    {
        fs::write(path, bytes).context(format!("Failed to write {}", path.display()))?;
        eprintln!("{} {} bytes to {}", "Saved".green(), bytes.len(), path.display());
        let saved = json!({ "savedTo": path.display().to_string(), "bytes": bytes.len() });
        println!("{}", serde_json::to_string_pretty(&saved)?);
        return Ok(());
    }

    let failed = !outcome.is_success();
    println!("{}", serde_json::to_string_pretty(&outcome.into_json())?);
    if failed {
        bail!("{} failed", name);
    }
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    let registry = ToolRegistry::standard();

    if cli.is_verbose() {
        eprintln!("{} {} tools loaded", "Verbose:".yellow(), registry.len());
    }

    match &cli.command {
        Commands::List { filter } => {
            handle_list_command(&registry, filter.as_deref());
            Ok(())
        }
        Commands::Schema { name } => handle_schema_command(&registry, name.as_deref()),
        Commands::Call {
            name,
            args,
            args_file,
            output,
        } => {
            let arguments = read_arguments(args.as_deref(), args_file.as_deref())?;
            handle_call_command(&registry, config, name, arguments, output.as_deref()).await
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(&config, cli.is_verbose()).context("Failed to setup logging")?;
    config.log_load_notes();

    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, &config).await
}

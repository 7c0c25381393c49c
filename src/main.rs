// src/main.rs
// CLI entry point for the SOAP interop harness

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use soap_interop::config::HarnessConfig;
use soap_interop::http::create_shared_client;
use soap_interop::scenario::report::{OutputFormat, get_reporter};
use soap_interop::scenario::{
    RunSummary, RunnerConfig, Scenario, ScenarioRunner, filter_by_name, filter_by_tags, interop_catalog,
};
use soap_interop::{server, wsdl};

#[derive(Parser)]
#[command(name = "soap-interop")]
#[command(about = "Round-trip interoperability harness for SOAP services")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.soap-interop/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interop scenario catalog
    Run {
        /// Filter by tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,

        /// Filter by name pattern
        #[arg(long)]
        name: Option<String>,

        /// Stop on first failure
        #[arg(long)]
        fail_fast: bool,

        /// Run scenarios concurrently
        #[arg(long)]
        parallel: bool,

        /// Maximum concurrent scenarios (0 = unlimited)
        #[arg(long)]
        max_parallel: Option<usize>,

        /// Compare temporal values exactly
        #[arg(long)]
        strict_temporal: bool,

        /// Output format: console or json
        #[arg(long, default_value = "console")]
        format: String,

        /// Service endpoint (overrides config)
        #[arg(long)]
        endpoint: Option<String>,

        /// Never start the configured server command
        #[arg(long)]
        no_start: bool,
    },

    /// List scenarios in the catalog
    List {
        /// Filter by tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,
    },

    /// Fetch a live endpoint's WSDL and report catalog coverage
    Probe {
        /// Service endpoint (overrides config)
        #[arg(long, env = "SOAP_INTEROP_ENDPOINT")]
        endpoint: Option<String>,

        /// Never start the configured server command
        #[arg(long)]
        no_start: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let config = HarnessConfig::load(cli.config.as_deref());

    match cli.command {
        Commands::Run {
            tags,
            name,
            fail_fast,
            parallel,
            max_parallel,
            strict_temporal,
            format,
            endpoint,
            no_start,
        } => {
            let config = override_endpoint(config, endpoint, no_start);
            let runner_config = RunnerConfig {
                max_depth: config.max_depth,
                strict_temporal: strict_temporal || config.strict_temporal,
                fail_fast,
                verbose: cli.verbose,
                parallel,
                max_parallel: max_parallel.unwrap_or(config.max_parallel),
            };
            let format = OutputFormat::from_str(&format)
                .with_context(|| format!("unknown output format '{}'", format))?;
            run_catalog(&config, runner_config, tags, name, format).await
        }
        Commands::List { tags } => {
            list_scenarios(tags);
            Ok(())
        }
        Commands::Probe { endpoint, no_start } => {
            let config = override_endpoint(config, endpoint, no_start);
            probe_endpoint(&config).await
        }
    }
}

fn override_endpoint(mut config: HarnessConfig, endpoint: Option<String>, no_start: bool) -> HarnessConfig {
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }
    if no_start {
        config.server_command = None;
    }
    config
}

fn split_tags(tags: Option<&str>) -> Vec<String> {
    tags.map(|t| t.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

fn selected(tags: Option<&str>, name: Option<&str>) -> Vec<Scenario> {
    let mut scenarios = filter_by_tags(interop_catalog(), &split_tags(tags));
    if let Some(pattern) = name {
        scenarios = filter_by_name(scenarios, pattern);
    }
    scenarios
}

async fn run_catalog(
    harness: &HarnessConfig,
    config: RunnerConfig,
    tags: Option<String>,
    name: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let scenarios = selected(tags.as_deref(), name.as_deref());
    if scenarios.is_empty() {
        println!("No scenarios match the specified filters");
        return Ok(());
    }

    info!("Found {} scenario(s)", scenarios.len());
    let (managed, client) = server::connect(harness).await?;
    info!(endpoint = client.endpoint(), "Running against live service");

    let verbose = config.verbose;
    let runner = ScenarioRunner::new(Arc::new(client), config);
    let results = runner.run_scenarios(&scenarios).await;
    managed.shutdown().await?;

    print!("{}", get_reporter(format).report(&results, verbose));
    let summary = RunSummary::from_results(&results);
    if format == OutputFormat::Console {
        summary.print();
    } else {
        println!();
    }

    if !summary.success() {
        std::process::exit(1);
    }
    Ok(())
}

fn list_scenarios(tags: Option<String>) {
    let scenarios = selected(tags.as_deref(), None);
    println!("Found {} scenario(s):", scenarios.len());
    println!();
    for scenario in &scenarios {
        let marker = if scenario.is_skipped() { " [skipped]" } else { "" };
        println!("  {} -> {}{}", scenario.name, scenario.operation, marker);
        if !scenario.description.is_empty() {
            println!("    {}", scenario.description);
        }
        if !scenario.tags.is_empty() {
            println!("    Tags: {}", scenario.tags.join(", "));
        }
    }
}

async fn probe_endpoint(config: &HarnessConfig) -> Result<()> {
    let http = create_shared_client(config.request_timeout);
    let managed = server::ensure_running(&http, config).await?;
    let probed = wsdl::probe(&http, &managed.wsdl_url).await;
    managed.shutdown().await?;
    let inventory = probed?;

    let catalog = interop_catalog();
    let operations: BTreeSet<&str> = catalog.iter().map(|s| s.operation.as_str()).collect();
    let coverage = inventory.coverage(operations);

    println!("Service:    {}", inventory.service_name.as_deref().unwrap_or("(unnamed)"));
    println!("Namespace:  {}", inventory.target_namespace);
    if let Some(address) = &inventory.address {
        println!("Address:    {}", address);
    }
    println!("Operations: {}", inventory.operations.len());
    println!("Types:      {}", inventory.types.len());
    println!("Covered:    {}/{}", coverage.covered.len(), inventory.operations.len());
    for op in &coverage.uncovered {
        println!("  [UNCOVERED] {}", op);
    }
    for op in &coverage.unpublished {
        println!("  [UNPUBLISHED] {}", op);
    }
    Ok(())
}

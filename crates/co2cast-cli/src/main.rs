mod interactive;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use co2cast_core::{present, submit_once, Co2castConfig, FeatureVector, Outcome, ResultView, Variant};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use interactive::Session;

#[derive(Parser)]
#[command(name = "co2cast")]
#[command(about = "co2cast - CO₂ emission predictions from development indicators", long_about = None)]
struct Cli {
    /// Which predictor to use (per-capita, total)
    #[arg(long, global = true)]
    variant: Option<Variant>,

    /// Model artifact path or URL
    #[arg(long, global = true)]
    model: Option<String>,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for downloaded artifacts
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the input features and their safe ranges
    Features,

    /// Run one prediction
    Predict {
        /// Feature value, repeatable (e.g. --set gdp=1200)
        #[arg(short, long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show configuration and model status
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct PredictOutput<'a> {
    #[serde(flatten)]
    view: &'a ResultView,
    #[serde(skip_serializing_if = "Option::is_none")]
    inputs: Option<&'a FeatureVector>,
}

/// `key=value` with both sides trimmed; the key must be non-empty.
pub(crate) fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// `RUST_LOG` directives when they parse, `info` otherwise.
fn env_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// File, then environment, then flags.
fn resolve_config(cli: &Cli) -> Result<Co2castConfig> {
    let base = match &cli.config {
        Some(path) => Co2castConfig::from_file(path)?,
        None => Co2castConfig::default(),
    };
    let mut config = base.with_env(|key| std::env::var(key).ok())?;

    if let Some(variant) = cli.variant {
        config.variant = variant;
    }
    if let Some(model) = &cli.model {
        config.model.source = Some(model.clone());
    }
    if let Some(dir) = &cli.cache_dir {
        config.model.cache_dir = Some(dir.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.command {
        Some(Commands::Features) => cmd_features(&config)?,
        Some(Commands::Predict { set, output }) => cmd_predict(&config, set, output).await?,
        Some(Commands::Status) => cmd_status(&config).await?,
        None => run_interactive(&config).await?,
    }

    Ok(())
}

async fn run_interactive(config: &Co2castConfig) -> Result<()> {
    let schema = config.variant.schema()?;
    let status = co2cast_gateway::open_gateway(config).await;

    let mut session = Session::new(config.variant.profile(), schema, &status)?;
    session.run(&mut io::stdin().lock(), &mut io::stdout())
}

fn cmd_features(config: &Co2castConfig) -> Result<()> {
    let schema = config.variant.schema()?;
    let profile = config.variant.profile();

    println!();
    println!("{} ({})", profile.title, config.variant);
    println!("{:-<90}", "");
    println!("  {:<4} {:<22} {:<16} {}", "#", "Key", "Default", "Safe range");
    println!("{:-<90}", "");
    for (i, spec) in schema.specs().iter().enumerate() {
        println!(
            "  {:<4} {:<22} {:<16} {}",
            i + 1,
            spec.key,
            co2cast_core::collector::format_plain(spec.default),
            spec.range_hint()
        );
    }
    println!();
    println!("  Use: predict --set <key>=<value> (e.g., `predict --set gdp=1200`)");
    println!();

    Ok(())
}

async fn cmd_predict(config: &Co2castConfig, set: Vec<(String, String)>, output: OutputFormat) -> Result<()> {
    let schema = config.variant.schema()?;
    let status = co2cast_gateway::open_gateway(config).await;

    let outcome = submit_once(&status, schema.clone(), set);
    let view = present(&outcome, config.variant.profile(), &schema);

    match output {
        OutputFormat::Json => {
            let inputs = match &outcome {
                Outcome::Succeeded { vector, .. } => Some(vector),
                Outcome::Failed(_) => None,
            };
            let out = PredictOutput { view: &view, inputs };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text if view.is_success() => {
            println!();
            print!("{}", view.render_text());
            println!();
        }
        OutputFormat::Text => {}
    }

    if let Outcome::Failed(e) = outcome {
        return Err(e.into());
    }
    Ok(())
}

async fn cmd_status(config: &Co2castConfig) -> Result<()> {
    println!("System Status:");
    println!("{:-<40}", "");
    println!("  Variant:     {}", config.variant);
    println!("  Model:       {}", config.model_source());
    println!("  Cache dir:   {}", config.cache_dir().display());

    let status = co2cast_gateway::open_gateway(config).await;
    match status.gateway() {
        Ok(gateway) => println!("  Gateway:     ready ({})", gateway.model().describe()),
        Err(e) => println!("  Gateway:     unavailable ({})", e),
    }

    Ok(())
}

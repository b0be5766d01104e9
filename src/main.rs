//! Drift - pointer telemetry pipeline
//!
//! Replays captured traces, scores feature vectors, and manages configuration.

use drift_telemetry::app::cli::{Cli, Commands, ConfigAction};
use drift_telemetry::app::config::Config;
use drift_telemetry::app::replay::{parse_trace, replay};
use drift_telemetry::drill::{DrillEvent, TargetDrill};
use drift_telemetry::features::fallback::{rule_based_probability, RiskBand, RiskIndicators};
use drift_telemetry::features::vector::{FeatureMode, FeatureSet, FeatureVector};
use drift_telemetry::pipeline::Finalizer;
use drift_telemetry::transport::{BlobStore, FsBlobStore, HttpInferenceClient, Scorer};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    match cli.command {
        Commands::Replay {
            input,
            no_persist,
            output,
        } => {
            run_replay(&input, no_persist, output, &config).await?;
        }
        Commands::Predict { input } => {
            run_predict(&input, &config).await?;
        }
        Commands::Drill { input } => {
            run_drill(&input, &config)?;
        }
        Commands::Init { force } => {
            run_init(force, &config)?;
        }
        Commands::Config { action } => {
            run_config(action, &config, cli.config.as_deref())?;
        }
    }

    Ok(())
}

fn scorer(config: &Config) -> anyhow::Result<Scorer> {
    let client = HttpInferenceClient::new(&config.transport)?;
    Ok(Scorer::new(Arc::new(client), config.fallback.clone()))
}

async fn run_replay(
    input: &Path,
    no_persist: bool,
    output: Option<PathBuf>,
    config: &Config,
) -> anyhow::Result<()> {
    let file = std::fs::File::open(input)
        .map_err(|e| anyhow::anyhow!("Cannot open trace {}: {}", input.display(), e))?;
    let events = parse_trace(std::io::BufReader::new(file))?;
    info!("Replaying {} events from {}", events.len(), input.display());

    let store: Option<Arc<dyn BlobStore>> = if no_persist {
        None
    } else {
        let dir = output.unwrap_or_else(|| config.export.resolved_output_dir());
        Some(Arc::new(FsBlobStore::new(dir)))
    };
    let finalizer = Arc::new(Finalizer::new(scorer(config)?, store, config.export.write_csv));

    let report = replay(&events, config, finalizer).await?;

    println!(
        "Pointer events: {} ({} accepted, {} while idle)",
        report.pointer_events, report.accepted_samples, report.ignored_while_idle
    );
    for session in &report.sessions {
        let outcome = &session.outcome;
        let status = if session.applied { "current" } else { "stale" };
        println!("\nSession {} [{}]", outcome.session_id, status);

        match &outcome.features {
            Some(set) => println!("  Features: {}", describe_mode(set.mode)),
            None => println!("  Features: no data"),
        }
        match &outcome.prediction {
            Some(p) => println!("  Prediction: {:.3} ({}, {:?})", p.probability, p.band, p.source),
            None => println!("  Prediction: no data"),
        }
        if let Some(persisted) = &outcome.persisted {
            println!("  Export: {}", persisted.json);
            if let Some(csv) = &persisted.csv {
                println!("  CSV: {}", csv);
            }
        }
        if let Some(err) = &outcome.persist_error {
            println!("  Export failed: {}", err);
        }
    }

    Ok(())
}

fn describe_mode(mode: FeatureMode) -> &'static str {
    match mode {
        FeatureMode::Trials => "trial-based",
        FeatureMode::SessionFallback => "session fallback (degraded)",
    }
}

async fn run_predict(input: &Path, config: &Config) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(input)?;
    let vector: FeatureVector = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid feature file {}: {}", input.display(), e))?;

    let set = FeatureSet {
        mode: FeatureMode::Trials,
        vector,
    };
    let indicators = RiskIndicators::from_features(&set, None);
    let prediction = scorer(config)?.score_or_fallback(&set, &indicators).await;

    println!("{}", serde_json::to_string_pretty(&prediction)?);
    Ok(())
}

fn run_drill(input: &Path, config: &Config) -> anyhow::Result<()> {
    let file = std::fs::File::open(input)?;
    let mut drill = TargetDrill::new();

    for (index, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: DrillEvent = serde_json::from_str(&line)
            .map_err(|e| anyhow::anyhow!("Line {}: {}", index + 1, e))?;
        drill.apply(event);
    }

    let Some(summary) = drill.summary() else {
        println!("Not enough drill data (need movement, two clicks, and a completed target)");
        return Ok(());
    };

    let probability = rule_based_probability(&summary.indicators(), &config.fallback);
    println!("Clicks: {}", summary.total_clicks);
    println!("Avg time between clicks: {:.2}s", summary.mean_click_latency_ms / 1000.0);
    println!("Click accuracy: {:.0}%", summary.mean_click_accuracy);
    println!("Max velocity: {:.0} px/s", summary.max_velocity);
    println!("Max acceleration: {:.0} px/s²", summary.max_acceleration);
    println!("Avg path deviation: {:.1}%", summary.mean_path_deviation);
    println!("Rule-based estimate: {:.2} ({})", probability, RiskBand::of(probability));

    Ok(())
}

fn run_init(force: bool, config: &Config) -> anyhow::Result<()> {
    let config_path = Config::default_path();

    if config_path.exists() && !force {
        println!("Config already exists at {:?}", config_path);
        println!("Use --force to overwrite");
        return Ok(());
    }

    config.save_default()?;
    info!("Created config at {:?}", config_path);

    let export_dir = config.export.resolved_output_dir();
    std::fs::create_dir_all(&export_dir)?;

    println!("Initialized drift:");
    println!("  Config: {:?}", config_path);
    println!("  Exports: {:?}", export_dir);

    Ok(())
}

fn run_config(action: ConfigAction, config: &Config, explicit_path: Option<&Path>) -> anyhow::Result<()> {
    let path = explicit_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path);

    match action {
        ConfigAction::Show => {
            println!("Configuration ({:?}):\n", path);
            println!("{}", config.to_toml()?);
        }
        ConfigAction::Get { key } => {
            let toml_str = config.to_toml()?;
            match find_toml_value(&toml_str, &key) {
                Some(v) => println!("{} = {}", key, v),
                None => anyhow::bail!("Configuration key '{}' not found", key),
            }
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
    }

    Ok(())
}

/// Simple TOML value lookup by dotted key
fn find_toml_value<'a>(toml_str: &'a str, key: &str) -> Option<&'a str> {
    let (section_name, leaf_key) = match key.split_once('.') {
        Some((section, leaf)) => (section, leaf),
        None => ("", key),
    };
    let mut in_section = section_name.is_empty();

    for line in toml_str.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            in_section = &trimmed[1..trimmed.len() - 1] == section_name;
            continue;
        }

        if in_section {
            if let Some((line_key, value)) = trimmed.split_once('=') {
                if line_key.trim() == leaf_key {
                    return Some(value.trim());
                }
            }
        }
    }

    None
}

use anyhow::{Context, Result};
use clap::Parser;
use revenue_forecast::config::PipelineConfig;
use revenue_forecast::pipeline::ForecastPipeline;
use revenue_forecast::sources::CsvSource;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::Cli;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(horizon) = cli.horizon {
        config.horizon = horizon;
    }
    if let Some(coverage) = cli.coverage {
        config.model.interval_coverage = coverage;
    }

    let catalog = config.catalog();
    if cli.list_metrics {
        for entry in catalog.entries() {
            println!(
                "{}\t{}\t{}",
                entry.display_name, entry.primary_field, entry.legacy_field
            );
        }
        return Ok(());
    }

    let metric = catalog.lookup(&cli.metric)?;
    let primary_path = cli.primary.as_deref().context("--primary is required")?;
    let legacy_path = cli.legacy.as_deref().context("--legacy is required")?;
    let primary = CsvSource::new(&config.primary.name, primary_path, &config.primary.date_field);
    let legacy = CsvSource::new(&config.legacy.name, legacy_path, &config.legacy.date_field);

    let pipeline = ForecastPipeline::from_config(&config)?;
    let output = pipeline
        .run_sources(
            &primary,
            &config.primary.range(),
            &legacy,
            &config.legacy.range(),
            metric,
        )
        .with_context(|| format!("forecasting {}", metric.display_name))?;

    info!(
        rows = output.table.len(),
        skipped = output.report.primary_skipped + output.report.legacy_skipped,
        overlap = output.report.overlap,
        "forecast ready"
    );

    let rendered = cli::render(&output.table, cli.format)?;
    write_output(cli.output.as_deref(), &rendered)
}

fn write_output(path: Option<&Path>, rendered: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("writing {}", path.display())),
        None => {
            print!("{}", rendered);
            Ok(())
        }
    }
}

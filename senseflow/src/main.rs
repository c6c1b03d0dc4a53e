// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use anyhow::Context;
use clap::Parser;
use senseflow::{Pipeline, PipelineConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Simulated sensor pipeline with batch averaging.
#[derive(Parser)]
#[command(name = "senseflow", about = "Simulated sensor pipeline with batch averaging", version)]
struct Args {
    /// JSON configuration file. Built-in defaults when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for the averages CSV, overriding the configuration.
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Stop after this many seconds instead of waiting for Ctrl+C.
    #[arg(long, value_name = "SECS")]
    run_for: Option<u64>,

    /// Log readings and averages through tracing instead of printing them.
    #[arg(long)]
    no_console: bool,
}

fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &args.output_dir {
        config.output_dir.clone_from(dir);
    }
    config.validate()?;
    Ok(config)
}

async fn wait_for_shutdown(run_for: Option<u64>) -> anyhow::Result<()> {
    match run_for {
        Some(secs) => {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => signal.context("listening for Ctrl+C")?,
                () = tokio::time::sleep(Duration::from_secs(secs)) => {
                    info!("run time of {secs}s elapsed");
                }
            }
        }
        None => tokio::signal::ctrl_c()
            .await
            .context("listening for Ctrl+C")?,
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting the tokio runtime")?;
    let outcome = runtime.block_on(run(args));
    senseflow::shutdown_runtime(runtime);
    outcome
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let sink = senseflow::default_sink(&config, !args.no_console)
        .with_context(|| format!("opening {}", config.csv_path().display()))?;

    let mut pipeline = Pipeline::new(&config, sink)?;
    let cancel = pipeline.cancel_token();
    pipeline.start()?;
    info!(
        "writing averages to {}; press Ctrl+C to stop",
        config.csv_path().display()
    );

    tokio::select! {
        outcome = wait_for_shutdown(args.run_for) => outcome?,
        () = cancel.cancelled() => info!("pipeline cancelled itself"),
    }

    info!("shutting down");
    let report = pipeline.stop().await?;
    for producer in &report.producers {
        info!(source = %producer.source, produced = producer.produced, "producer finished");
    }
    info!(
        consumed = report.consumer.consumed,
        aggregates = report.consumer.aggregates_emitted,
        sink_failures = report.consumer.sink_failures,
        "pipeline finished"
    );
    Ok(())
}

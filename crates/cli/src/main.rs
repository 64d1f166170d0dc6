//! power-hour: builds a power hour mix from an index of video links.

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use powerhour_core::{
    load_config, load_default_config, validate_config, Config, FfmpegConverter, PipelineError,
    PowerHourPipeline, SoundStretchAnalyzer, YtDlpFetcher,
};

use cli::Cli;

type Pipeline =
    PowerHourPipeline<YtDlpFetcher, FfmpegConverter, SoundStretchAnalyzer, FfmpegConverter>;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        if let Some(output) = e
            .downcast_ref::<PipelineError>()
            .and_then(PipelineError::captured_output)
        {
            eprintln!("{}", output.trim_end());
        }
        std::process::exit(1);
    }
}

fn init_tracing(cli: &Cli) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_filter().into());
    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match cli.config {
        Some(ref path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => load_default_config().context("Failed to load configuration")?,
    };
    cli.apply(&mut config);
    validate_config(&config).context("Configuration validation failed")?;

    let pipeline = build_pipeline(&config);

    if cli.check {
        pipeline
            .check_tools()
            .await
            .context("External tool check failed")?;
        info!("All external tools are usable");
        return Ok(());
    }

    let index = config.paths.index.clone();
    let summary = tokio::select! {
        result = pipeline.run(&index) => result?,
        _ = shutdown_signal() => {
            anyhow::bail!("Interrupted, in-flight tools were stopped");
        }
    };

    info!(
        entries = summary.entries,
        fetched = summary.fetch.completed,
        cut = summary.segment.completed,
        "Wrote {}",
        summary.output.output_path.display()
    );
    Ok(())
}

fn build_pipeline(config: &Config) -> Pipeline {
    let converter = Arc::new(FfmpegConverter::new(config.converter_config()));
    PowerHourPipeline::new(
        config.processor_config(),
        Arc::new(YtDlpFetcher::new(config.fetcher_config())),
        Arc::clone(&converter),
        Arc::new(SoundStretchAnalyzer::new(config.tempo_config())),
        converter,
    )
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

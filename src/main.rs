//! `pagerframe` binary: reassemble frame lines from stdin or a file into the
//! line and CSV logs.

use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use pagerframe::{
    Engine,
    EngineConfig,
    EngineError,
    FileSinkWriter,
    InputSource,
    RunSummary,
    cli::Cli,
};
use tokio::{
    fs::File,
    io::{AsyncBufRead, BufReader},
    runtime::Builder,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match EngineConfig::from_cli(&cli, Utc::now()) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            return ExitCode::from(2);
        }
    };

    let runtime = match Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(error = %err, "failed to start runtime");
            return ExitCode::FAILURE;
        }
    };
    let outcome = runtime.block_on(run(&config));
    // A blocked stdin read would otherwise hold the runtime open.
    runtime.shutdown_background();

    match outcome {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "reassembly failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &EngineConfig) -> Result<RunSummary, EngineError> {
    info!(
        policy = %config.retention,
        transform = %config.transform,
        input = %config.input,
        line_log = %config.outputs.line_log.display(),
        tabular_log = %config.outputs.tabular_log.display(),
        "starting reassembly"
    );

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    let input: Box<dyn AsyncBufRead + Unpin + Send> = match &config.input {
        InputSource::Stdin => Box::new(BufReader::new(tokio::io::stdin())),
        InputSource::File(path) => Box::new(BufReader::new(
            File::open(path).await.map_err(EngineError::Input)?,
        )),
    };
    let sink = FileSinkWriter::open(&config.outputs).await?;
    let mut engine = Engine::from_config(config, sink);
    engine.run(input, &shutdown).await
}

/// Completes on Ctrl-C or, on Unix, SIGTERM. Never completes if no signal
/// can be observed.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    () = wait_for_ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                wait_for_ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        wait_for_ctrl_c().await;
    }
}

async fn wait_for_ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl-C; running until end of input");
        std::future::pending::<()>().await;
    }
}

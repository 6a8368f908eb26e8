mod cli;
mod engine;
mod error;

use crate::{cli::Args, engine::TestSourceEngine, error::AppError};
use clap::Parser;
use recorder_core::{MediaEngine, RecordingSession, SessionConfig, ShutdownReason};
use std::process;
use tracing::{Level, error, info};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match run(args).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}

async fn run(args: Args) -> error::Result<i32> {
    let session = RecordingSession::new(SessionConfig {
        base_dir: args.output_dir,
        fragment_duration_secs: args.fragment_duration,
        timescale: args.timescale,
    })?;
    let dispatcher = session.dispatcher().clone();

    // Running must be entered before the engine's first fragment request,
    // otherwise the request would be answered as a late one.
    dispatcher.start();

    let mut engine = TestSourceEngine::new(args.fragments);
    engine.start(session.engine_settings(), dispatcher.clone())?;
    info!("now recording");

    let interrupt = dispatcher.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received");
            interrupt.force_stop();
        }
    });

    let reason = dispatcher.await_completion().await;
    engine.join().await;
    info!(fragments = dispatcher.fragments_named(), "session finished");

    match reason {
        Some(ShutdownReason::EndOfStream) => Ok(0),
        Some(ShutdownReason::Error(message)) => Err(AppError::Stream(message)),
        None => Ok(130),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

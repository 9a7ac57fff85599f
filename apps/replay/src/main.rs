mod config;
mod host;
mod session;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use dashboard_core::{actions, Store, UpdateOrchestrator, ViewportDebouncer};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::load_settings,
    host::{JsonLineSink, LoggingHost, SyntheticProcessor},
    session::{Session, Step},
};
use shared::protocol::Action;

/// Replays a recorded dashboard session through the store and update cycle,
/// printing audio-engine commands as JSON lines.
#[derive(Parser, Debug)]
struct Args {
    /// Session file (JSON).
    #[arg(long)]
    session: PathBuf,
    /// Settings file; defaults to ./replay.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the final state as JSON after the last step.
    #[arg(long)]
    dump_state: bool,
    #[arg(long)]
    debounce_ms: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(ms) = args.debounce_ms {
        settings.viewport_debounce_ms = ms;
    }
    settings.dump_state |= args.dump_state;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let session = Session::load(&args.session)?;
    info!(
        session = %args.session.display(),
        steps = session.steps.len(),
        debounce_ms = settings.viewport_debounce_ms,
        "replaying session"
    );

    let mut store = Store::new();
    store.subscribe(UpdateOrchestrator::new(
        LoggingHost,
        SyntheticProcessor,
        JsonLineSink::new(io::stdout()),
    ));
    if let Some(snapshot) = session.initial_state {
        store.dispatch(actions::rehydrate(snapshot));
    }

    let (mut debouncer, mut settled) =
        ViewportDebouncer::channel(Duration::from_millis(settings.viewport_debounce_ms));

    for (index, step) in session.steps.into_iter().enumerate() {
        match step {
            Step::Action(action) => store.dispatch(action),
            Step::Intent(intent) => {
                if store.run(&intent) == 0 {
                    warn!(step = index, intent = intent.name(), "intent dispatched nothing");
                }
            }
            Step::ViewportRange { min, max } => debouncer.schedule(min, max),
            Step::WaitMs(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
        }
        drain(&mut store, &mut settled);
    }

    if debouncer.is_pending() {
        if let Some(action) = settled.recv().await {
            store.dispatch(action);
        }
    }
    drain(&mut store, &mut settled);

    let state = store.get_state();
    info!(
        markers = state.markers.len(),
        regions = state.regions.len(),
        "session finished"
    );
    if settings.dump_state {
        println!("{}", state.to_json()?);
    }
    Ok(())
}

fn drain(store: &mut Store, settled: &mut UnboundedReceiver<Action>) {
    while let Ok(action) = settled.try_recv() {
        store.dispatch(action);
    }
}

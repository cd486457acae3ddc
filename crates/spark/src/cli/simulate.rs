//! Simulation command handler.

use super::commands::SimulateArgs;
use super::config::sources;
use spark::{
    BatchConfig, CallConfig, OutputError, ResilientCaller, ShotBatch, Simulation, SparkResult,
    scale_delays,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Run a synthetic batch and print its summary as JSON.
pub async fn run_simulate(args: SimulateArgs) -> SparkResult<()> {
    let sources = sources(args.file);
    let call = CallConfig::load_from(&sources)?;
    let batch_config = BatchConfig::load_from(&sources)?;
    let (call, batch_config) = scale_delays(&call, &batch_config, args.delay_scale)?;
    let mock = *call.mock_mode() || args.mock;
    let call = call.with_mock_mode(mock);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling batch");
            trigger.cancel();
        }
    });

    let simulation = Simulation {
        shots: args.shots,
        fail_first: args.fail_first,
        kind: args.kind,
    };
    info!(?simulation, mock = *call.mock_mode(), "Starting simulation");

    let caller = ResilientCaller::new(call);
    let batch = ShotBatch::new(&caller, batch_config).with_cancellation(cancel);
    let outcome = simulation.run(&batch).await;
    if *outcome.cancelled() {
        warn!(
            completed = *outcome.summary().completed(),
            "Batch cancelled, printing partial results"
        );
    }

    let json = if args.reports {
        serde_json::to_string_pretty(&outcome)
    } else {
        serde_json::to_string_pretty(outcome.summary())
    }
    .map_err(|e| OutputError::new(format!("Failed to serialize summary: {}", e)))?;
    println!("{}", json);

    Ok(())
}

#![allow(clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod console;
mod flight_control;
mod keychain;
mod logger;
mod vehicle;

use crate::console::{Cli, Command, Shell};
use crate::flight_control::{StatusReporter, Supervisor, TakeoffProfile};
use crate::keychain::Keychain;
use crate::vehicle::{BridgeClient, SimEvent, SimVar, VehicleInterface};
use clap::Parser;
use std::{env, sync::Arc};

const DEFAULT_BRIDGE_URL: &str = "http://localhost:5000";

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    let cli = Cli::parse();
    let base_url_var = env::var("AUTOFLIGHT_BRIDGE_URL");
    let base_url = cli
        .bridge
        .as_deref()
        .unwrap_or_else(|| base_url_var.as_ref().map_or(DEFAULT_BRIDGE_URL, |v| v.as_str()));
    let supervisor = init(base_url).await;

    match cli.command {
        Command::Shell => {
            if let Err(e) = Shell::new(&supervisor).run().await {
                error!("Shell stopped: {e}");
            }
        }
        Command::Task(cmd) => {
            if !console::launch(&supervisor, cmd).await {
                std::process::exit(2);
            }
            let outcome = tokio::select! {
                outcome = supervisor.wait() => outcome,
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupted, stopping");
                    supervisor.stop().await;
                    None
                }
            };
            if outcome.is_some_and(|o| o.is_failed()) {
                std::process::exit(1);
            }
        }
    }
}

async fn init(url: &str) -> Supervisor {
    let client = BridgeClient::new(url)
        .unwrap_or_else(|e| fatal!("Could not set up the simulator bridge client: {e}"));
    preflight(&client).await;
    let keychain = Keychain::new(Arc::new(client), StatusReporter::new(), TakeoffProfile::default());
    Supervisor::new(keychain)
}

/// Checks that the bridge answers and the autopilot can be engaged. Problems
/// are only reported; the operator may start the simulator afterwards.
async fn preflight(client: &BridgeClient) {
    let lat = client.get(SimVar::PlaneLatitude).await;
    let lon = client.get(SimVar::PlaneLongitude).await;
    match lat.zip(lon) {
        Some((lat, lon)) => info!("Simulator bridge at {} reports LAT {lat:.4} LON {lon:.4}", client.url()),
        None => warn!("No position from the simulator bridge at {}, is the simulator running?", client.url()),
    }
    if !client.find(SimEvent::ApMaster).await {
        warn!("AP_MASTER is not bound, autopilot targets will have no effect");
    }
}

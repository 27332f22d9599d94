//! The simulator side of the engine: the `VehicleInterface` seam every task
//! talks through, the typed simulator name tables, and the HTTP bridge client
//! that implements the interface against a running simulator.

mod bridge_client;
mod bridge_request;
mod bridge_response;
#[cfg(test)]
pub(crate) mod mock_vehicle;
mod sim_names;

use async_trait::async_trait;

pub(crate) use bridge_client::BridgeClient;
pub(crate) use bridge_response::VehicleError;
pub(crate) use sim_names::{SimEvent, SimVar};

/// Outcome of a named-event dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dispatch {
    /// The simulator accepted the event.
    Sent,
    /// The simulator has no binding for the event. Callers skip the action.
    Unbound,
}

/// Pull-only access to the simulated vehicle.
///
/// Reads never fail: a variable that cannot be delivered right now is reported
/// as `None` and the caller decides whether to retry. Writes and event
/// dispatches return a `VehicleError` when the transport itself is broken.
#[async_trait]
pub(crate) trait VehicleInterface: Send + Sync {
    /// Reads a named simulation variable.
    async fn get(&self, var: SimVar) -> Option<f64>;

    /// Writes a named simulation variable.
    async fn set(&self, var: SimVar, value: f64) -> Result<(), VehicleError>;

    /// Checks whether a named event is bound in the simulator.
    async fn find(&self, event: SimEvent) -> bool;

    /// Finds and invokes a named event with zero or one numeric argument.
    async fn trigger(&self, event: SimEvent, arg: Option<i32>) -> Result<Dispatch, VehicleError>;
}

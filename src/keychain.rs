use crate::flight_control::{StatusReporter, TakeoffProfile};
use crate::vehicle::VehicleInterface;
use std::sync::Arc;

/// The session handed to every guidance task: the vehicle handle, the status
/// sink and the takeoff tuning.
///
/// Tasks receive their own clone at creation; nothing in here is mutated
/// after startup.
#[derive(Clone)]
pub struct Keychain {
    /// The simulator binding shared by all tasks.
    vehicle: Arc<dyn VehicleInterface>,
    /// Sink for operator-facing progress messages.
    status: StatusReporter,
    /// Constants of the automatic takeoff.
    takeoff: TakeoffProfile,
}

impl Keychain {
    pub(crate) fn new(vehicle: Arc<dyn VehicleInterface>, status: StatusReporter, takeoff: TakeoffProfile) -> Self {
        Self { vehicle, status, takeoff }
    }

    /// Provides a cloned reference to the vehicle interface.
    pub(crate) fn vehicle(&self) -> Arc<dyn VehicleInterface> { Arc::clone(&self.vehicle) }

    /// Provides the status reporter.
    pub fn status(&self) -> &StatusReporter { &self.status }

    /// Provides the takeoff profile.
    pub fn takeoff(&self) -> &TakeoffProfile { &self.takeoff }
}

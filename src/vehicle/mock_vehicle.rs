//! Scripted in-memory vehicle used by the engine tests.
//!
//! Every read, write and dispatched event is appended to an access log so
//! tests can assert on command ordering. An optional kinematic stepper moves
//! the aircraft along the last heading bug on every latitude read and climbs
//! or descends with the last commanded vertical speed on every altitude read.

use super::{Dispatch, SimEvent, SimVar, VehicleError, VehicleInterface};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Access {
    Read(SimVar),
    Write(SimVar, f64),
    Event(SimEvent, Option<i32>),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Kinematics {
    /// Horizontal distance flown per latitude read.
    pub(crate) step_nm: f64,
    /// Altitude change per altitude read, as a fraction of the commanded fpm.
    pub(crate) climb_factor: f64,
}

#[derive(Default)]
struct MockState {
    vars: HashMap<SimVar, f64>,
    scripted: HashMap<SimVar, VecDeque<Option<f64>>>,
    unbound: HashSet<SimEvent>,
    failing: HashSet<SimVar>,
    log: Vec<Access>,
    kinematics: Option<Kinematics>,
    vs_fpm: f64,
    heading_bug: Option<f64>,
}

#[derive(Default)]
pub(crate) struct MockVehicle {
    state: Mutex<MockState>,
}

impl MockVehicle {
    pub(crate) fn at(lat: f64, lon: f64, alt: f64) -> Self {
        let mock = MockVehicle::default();
        {
            let mut state = mock.state.lock().unwrap();
            state.vars.insert(SimVar::PlaneLatitude, lat);
            state.vars.insert(SimVar::PlaneLongitude, lon);
            state.vars.insert(SimVar::PlaneAltitude, alt);
        }
        mock
    }

    pub(crate) fn with_kinematics(self, step_nm: f64, climb_factor: f64) -> Self {
        self.state.lock().unwrap().kinematics = Some(Kinematics { step_nm, climb_factor });
        self
    }

    /// Queues values returned by successive reads of `var` before falling
    /// back to the stored value. `None` simulates an unavailable read.
    pub(crate) fn script(self, var: SimVar, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        self.state.lock().unwrap().scripted.entry(var).or_default().extend(values);
        self
    }

    pub(crate) fn unbind(self, event: SimEvent) -> Self {
        self.state.lock().unwrap().unbound.insert(event);
        self
    }

    pub(crate) fn fail_writes_to(self, var: SimVar) -> Self {
        self.state.lock().unwrap().failing.insert(var);
        self
    }

    pub(crate) fn put(&self, var: SimVar, value: f64) {
        self.state.lock().unwrap().vars.insert(var, value);
    }

    pub(crate) fn value(&self, var: SimVar) -> Option<f64> {
        self.state.lock().unwrap().vars.get(&var).copied()
    }

    pub(crate) fn log(&self) -> Vec<Access> { self.state.lock().unwrap().log.clone() }

    pub(crate) fn log_len(&self) -> usize { self.state.lock().unwrap().log.len() }

    /// All events in the access log, dropping reads and variable writes.
    pub(crate) fn events(&self) -> Vec<(SimEvent, Option<i32>)> {
        self.log()
            .into_iter()
            .filter_map(|a| match a {
                Access::Event(e, arg) => Some((e, arg)),
                _ => None,
            })
            .collect()
    }
}

impl MockState {
    fn step(&mut self, var: SimVar) {
        let Some(kin) = self.kinematics else { return };
        match var {
            SimVar::PlaneLatitude => {
                let Some(hdg) = self.heading_bug else { return };
                let lat = self.vars.get(&SimVar::PlaneLatitude).copied().unwrap_or(0.0);
                let lon = self.vars.get(&SimVar::PlaneLongitude).copied().unwrap_or(0.0);
                let deg = kin.step_nm / 60.0;
                let hdg_rad = hdg.to_radians();
                let new_lat = lat + deg * hdg_rad.cos();
                let new_lon = lon + deg * hdg_rad.sin() / lat.to_radians().cos();
                self.vars.insert(SimVar::PlaneLatitude, new_lat);
                self.vars.insert(SimVar::PlaneLongitude, new_lon);
            }
            SimVar::PlaneAltitude => {
                let alt = self.vars.get(&SimVar::PlaneAltitude).copied().unwrap_or(0.0);
                self.vars.insert(SimVar::PlaneAltitude, alt + self.vs_fpm * kin.climb_factor);
            }
            _ => {}
        }
    }
}

#[async_trait]
impl VehicleInterface for MockVehicle {
    async fn get(&self, var: SimVar) -> Option<f64> {
        let mut state = self.state.lock().unwrap();
        state.log.push(Access::Read(var));
        if let Some(v) = state.scripted.get_mut(&var).and_then(VecDeque::pop_front) {
            return v;
        }
        state.step(var);
        state.vars.get(&var).copied()
    }

    async fn set(&self, var: SimVar, value: f64) -> Result<(), VehicleError> {
        let mut state = self.state.lock().unwrap();
        if state.failing.contains(&var) {
            return Err(VehicleError::NoConnection);
        }
        state.log.push(Access::Write(var, value));
        state.vars.insert(var, value);
        Ok(())
    }

    async fn find(&self, event: SimEvent) -> bool {
        !self.state.lock().unwrap().unbound.contains(&event)
    }

    async fn trigger(&self, event: SimEvent, arg: Option<i32>) -> Result<Dispatch, VehicleError> {
        let mut state = self.state.lock().unwrap();
        if state.unbound.contains(&event) {
            return Ok(Dispatch::Unbound);
        }
        state.log.push(Access::Event(event, arg));
        match (event, arg) {
            (SimEvent::ApVsSetEnglish, Some(vs)) => state.vs_fpm = f64::from(vs),
            (SimEvent::HeadingBugSet, Some(hdg)) => state.heading_bug = Some(f64::from(hdg)),
            _ => {}
        }
        Ok(Dispatch::Sent)
    }
}

use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;
use strum_macros::{Display, EnumIter};

/// Stages of the automatic takeoff. Transitions are strictly forward; any
/// failure moves the sequence to `Failed`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, EnumIter)]
pub enum TakeoffState {
    Grounded,
    Accelerating,
    Rotating,
    Climbing,
    LevelOff,
    CruiseHandoff,
    Failed,
}

impl TakeoffState {
    /// The stage following `self` on a successful run.
    pub fn next(self) -> Option<TakeoffState> {
        match self {
            TakeoffState::Grounded => Some(TakeoffState::Accelerating),
            TakeoffState::Accelerating => Some(TakeoffState::Rotating),
            TakeoffState::Rotating => Some(TakeoffState::Climbing),
            TakeoffState::Climbing => Some(TakeoffState::LevelOff),
            TakeoffState::LevelOff => Some(TakeoffState::CruiseHandoff),
            TakeoffState::CruiseHandoff | TakeoffState::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TakeoffState::CruiseHandoff | TakeoffState::Failed)
    }

    /// Polling period of the wait performed while in this stage, if any.
    pub fn poll_interval(self) -> Option<Duration> { POLL_INTERVAL_LOOKUP.get(&self).copied() }
}

static POLL_INTERVAL_LOOKUP: LazyLock<HashMap<TakeoffState, Duration>> = LazyLock::new(|| {
    let mut lookup = HashMap::new();
    let intervals = vec![
        // IAS poll during the ground roll
        (TakeoffState::Accelerating, Duration::from_millis(500)),
        // altitude poll during the initial climb
        (TakeoffState::Climbing, Duration::from_secs(1)),
    ];
    for (state, interval) in intervals {
        lookup.insert(state, interval);
    }
    lookup
});

use strum_macros::{Display, EnumIter, IntoStaticStr};

/// Simulation variables read or written by the engine.
///
/// The `Display`/`&'static str` form is the exact name the simulator expects.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum SimVar {
    PlaneLatitude,
    PlaneLongitude,
    PlaneAltitude,
    AirspeedIndicated,
    PlaneHeadingDegreesTrue,
    PlanePitchDegrees,
    PlaneBankDegrees,
    #[strum(serialize = "GENERAL_ENG_THROTTLE_LEVER_POSITION:1")]
    ThrottleLever,
    FlapsHandlePercent,
    ElevatorTrimPosition,
}

/// Discrete simulator events dispatched by the engine.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum SimEvent {
    ParkingBrakes,
    ApMaster,
    ApMasterOff,
    ApAltVarSetEnglish,
    ApVsSetEnglish,
    ApAltHoldOn,
    ApAltHoldOff,
    ApHdgHoldOn,
    ApHdgHoldOff,
    HeadingBugSet,
    ApSpdVarSet,
    ApAutothrottleArm,
    #[strum(serialize = "THROTTLE_AXIS_SET_EX1")]
    ThrottleAxisSetEx1,
}


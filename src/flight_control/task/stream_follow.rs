use crate::flight_control::flight_computer::{FlightComputer, ft_i32};
use crate::flight_control::guidance_error::GuidanceError;
use crate::flight_control::status::Status;
use crate::vehicle::{SimEvent, SimVar};
use futures::StreamExt;
use futures::stream::BoxStream;
use std::time::Duration;

/// One recorded attitude/position sample. Absent fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StreamFrame {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Feet.
    pub alt: Option<f64>,
    pub heading_deg: Option<f64>,
    pub pitch_deg: Option<f64>,
    pub roll_deg: Option<f64>,
}

/// Frames consumed by the stream follower, in playback order.
pub type FrameStream = BoxStream<'static, StreamFrame>;

const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Writes every frame of `frames` straight into the simulator with the
/// autopilot disengaged.
pub(super) async fn follow_stream(f_comp: &FlightComputer, mut frames: FrameStream) -> Result<(), GuidanceError> {
    f_comp.ev(SimEvent::ApMasterOff, None).await?;
    f_comp.status().report(Status::FollowStarted);

    let mut index = 0;
    while let Some(frame) = frames.next().await {
        if f_comp.is_cancelled() {
            return Err(GuidanceError::Cancelled);
        }
        index += 1;
        write_frame(f_comp, &frame).await?;
        f_comp.status().report(Status::FollowFrame {
            frame: index,
            lat: frame.lat,
            lon: frame.lon,
            alt: frame.alt,
            heading: frame.heading_deg,
        });
        f_comp.sleep(FRAME_INTERVAL).await?;
    }
    f_comp.status().report(Status::FollowComplete);
    Ok(())
}

async fn write_frame(f_comp: &FlightComputer, frame: &StreamFrame) -> Result<(), GuidanceError> {
    if let Some(lat) = frame.lat {
        f_comp.set(SimVar::PlaneLatitude, lat).await?;
    }
    if let Some(lon) = frame.lon {
        f_comp.set(SimVar::PlaneLongitude, lon).await?;
    }
    if let Some(alt) = frame.alt {
        f_comp.set(SimVar::PlaneAltitude, alt).await?;
    }
    if let Some(hdg) = frame.heading_deg {
        f_comp.ev(SimEvent::HeadingBugSet, Some(ft_i32(hdg).rem_euclid(360))).await?;
        f_comp.set(SimVar::PlaneHeadingDegreesTrue, hdg.to_radians()).await?;
    }
    // the simulator takes attitude in radians despite the variable names
    if let Some(pitch) = frame.pitch_deg {
        f_comp.set(SimVar::PlanePitchDegrees, pitch.to_radians()).await?;
    }
    if let Some(roll) = frame.roll_deg {
        f_comp.set(SimVar::PlaneBankDegrees, roll.to_radians()).await?;
    }
    Ok(())
}

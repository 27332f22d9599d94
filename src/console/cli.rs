use super::coordinates::parse_coordinates;
use super::input_file;
use crate::flight_control::{InputError, NavTarget, TeleportRequest, Waypoint};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Automated takeoff and en-route guidance for a simulated aircraft", long_about = None)]
pub struct Cli {
    /// Base URL of the simulator bridge. Overrides `AUTOFLIGHT_BRIDGE_URL`.
    #[arg(long, global = true)]
    pub bridge: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Task(TaskCommand),
    /// Read commands line by line from stdin
    Shell,
}

/// Commands that start a guidance task.
#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Automatic takeoff from the runway to a stabilized climb-out
    Takeoff,
    /// Fly to a single target
    #[command(alias = "goto")]
    FlyTo {
        /// Target as LAT,LON in decimal degrees
        #[arg(allow_hyphen_values = true)]
        coords: String,
        /// Target altitude in feet
        #[arg(long)]
        alt: f64,
        /// Target speed in knots
        #[arg(long, default_value_t = Waypoint::DEFAULT_SPEED_KT)]
        spd: f64,
    },
    /// Move the aircraft onto a target in small position steps
    Teleport {
        /// Target as LAT,LON in decimal degrees
        #[arg(allow_hyphen_values = true)]
        coords: String,
        /// Target altitude in feet
        #[arg(long)]
        alt: f64,
        /// Speed handed to the autopilot afterwards, in knots
        #[arg(long, default_value_t = Waypoint::DEFAULT_SPEED_KT)]
        spd: f64,
        /// Heading to hold instead of the bearing to the target
        #[arg(long)]
        hdg: Option<f64>,
        /// Horizontal step size in metres
        #[arg(long)]
        step_m: Option<f64>,
    },
    /// Fly a JSON list of waypoints in order
    Scenario { file: PathBuf },
    /// Replay a JSON list of recorded frames
    Follow { file: PathBuf },
}

impl TaskCommand {
    /// Validates the command's parameters and loads its input file.
    ///
    /// Nothing is sent to the simulator here; a rejected command never
    /// touches the running task.
    pub async fn into_target(self) -> Result<NavTarget, InputError> {
        match self {
            TaskCommand::Takeoff => Ok(NavTarget::Takeoff),
            TaskCommand::FlyTo { coords, alt, spd } => {
                let (lat, lon) = parse_coordinates(&coords)?;
                Ok(NavTarget::FlyTo(Waypoint::new(lat, lon, alt, Some(spd))?))
            }
            TaskCommand::Teleport { coords, alt, spd, hdg, step_m } => {
                let (lat, lon) = parse_coordinates(&coords)?;
                let target = Waypoint::new(lat, lon, alt, Some(spd))?;
                Ok(NavTarget::Teleport(TeleportRequest::new(target, hdg, step_m)?))
            }
            TaskCommand::Scenario { file } => {
                Ok(NavTarget::Scenario(input_file::load_scenario(&file).await?))
            }
            TaskCommand::Follow { file } => {
                let frames = input_file::load_frames(&file).await?;
                Ok(NavTarget::Follow(futures::stream::iter(frames).boxed()))
            }
        }
    }
}

use super::{NavTarget, Scenario, StreamFrame, TakeoffProfile, TakeoffState, TaskKind, TeleportRequest, run_task};
use crate::flight_control::common::position::Waypoint;
use crate::flight_control::guidance_error::InputError;
use crate::flight_control::status::{Status, StatusReporter};
use crate::keychain::Keychain;
use crate::vehicle::mock_vehicle::{Access, MockVehicle};
use crate::vehicle::{SimEvent, SimVar};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

const LAT0: f64 = 40.0;
const LON0: f64 = 29.0;

/// One nautical mile north of `LAT0`, `n` times.
fn nm_north(n: f64) -> f64 { LAT0 + n / 60.0 }

fn keychain(mock: &Arc<MockVehicle>, profile: TakeoffProfile) -> Keychain {
    Keychain::new(mock.clone(), StatusReporter::with_capacity(4096), profile)
}

fn drain(rx: &mut broadcast::Receiver<Status>) -> Vec<Status> {
    let mut out = Vec::new();
    while let Ok(status) = rx.try_recv() {
        out.push(status);
    }
    out
}

async fn run(target: NavTarget, mock: &Arc<MockVehicle>, profile: TakeoffProfile) -> Vec<Status> {
    let keychain = keychain(mock, profile);
    let mut rx = keychain.status().subscribe();
    run_task(target, keychain, CancellationToken::new()).await;
    drain(&mut rx)
}

fn has_failed(statuses: &[Status]) -> bool {
    statuses.iter().any(|s| matches!(s, Status::Failed { .. } | Status::Cancelled { .. }))
}

#[tokio::test(start_paused = true)]
async fn test_fly_to_arrives_and_zeroes_vs() {
    let mock = Arc::new(MockVehicle::at(LAT0, LON0, 3000.0).with_kinematics(0.2, 0.0));
    let target = Waypoint::new(nm_north(1.0), LON0, 3000.0, Some(110.0)).unwrap();
    let statuses = run(NavTarget::FlyTo(target), &mock, TakeoffProfile::default()).await;

    assert_eq!(statuses.first(), Some(&Status::NavStarted { target }));
    assert_eq!(statuses.last(), Some(&Status::Arrived { leg: None }));
    assert!(!has_failed(&statuses));
    assert!(statuses.iter().any(|s| matches!(s, Status::Progress { leg: None, .. })));
    assert_eq!(mock.events().last(), Some(&(SimEvent::ApVsSetEnglish, Some(0))));
    assert!(mock.events().contains(&(SimEvent::ApSpdVarSet, Some(110))));
}

#[tokio::test(start_paused = true)]
async fn test_setup_is_applied_twice() {
    let mock = Arc::new(MockVehicle::at(LAT0, LON0, 3000.0).with_kinematics(0.2, 0.0));
    let target = Waypoint::new(nm_north(1.0), LON0, 3000.0, None).unwrap();
    run(NavTarget::FlyTo(target), &mock, TakeoffProfile::default()).await;

    let events = mock.events();
    let arms = events.iter().filter(|(e, _)| *e == SimEvent::ApAutothrottleArm).count();
    let throttle = events
        .iter()
        .filter(|e| **e == (SimEvent::ThrottleAxisSetEx1, Some(8192)))
        .count();
    assert_eq!(arms, 2);
    assert_eq!(throttle, 2);
    // flaps and trim are cleaned up by both setups
    let flaps = mock.log().iter().filter(|a| **a == Access::Write(SimVar::FlapsHandlePercent, 0.0)).count();
    assert_eq!(flaps, 2);
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_position_is_skipped() {
    let mock = Arc::new(
        MockVehicle::at(LAT0, LON0, 3000.0)
            .with_kinematics(0.2, 0.0)
            .script(SimVar::PlaneLatitude, [None, None, None, None]),
    );
    let target = Waypoint::new(nm_north(1.0), LON0, 3000.0, None).unwrap();
    let statuses = run(NavTarget::FlyTo(target), &mock, TakeoffProfile::default()).await;

    assert_eq!(statuses.last(), Some(&Status::Arrived { leg: None }));
    assert!(!has_failed(&statuses));
    let events = mock.events();
    let first_hdg = events.iter().position(|(e, _)| *e == SimEvent::HeadingBugSet).unwrap();
    let first_vs = events.iter().position(|(e, _)| *e == SimEvent::ApVsSetEnglish).unwrap();
    // without a position the setup skips the heading bug and holds VS 0
    assert_eq!(events[first_vs], (SimEvent::ApVsSetEnglish, Some(0)));
    assert!(first_vs < first_hdg);
}

#[tokio::test(start_paused = true)]
async fn test_unbound_events_are_skipped() {
    let mock = Arc::new(
        MockVehicle::at(LAT0, LON0, 3000.0)
            .with_kinematics(0.2, 0.0)
            .unbind(SimEvent::ApMaster)
            .unbind(SimEvent::ApAutothrottleArm),
    );
    let target = Waypoint::new(nm_north(1.0), LON0, 3000.0, None).unwrap();
    let statuses = run(NavTarget::FlyTo(target), &mock, TakeoffProfile::default()).await;

    assert_eq!(statuses.last(), Some(&Status::Arrived { leg: None }));
    assert!(statuses.iter().any(|s| matches!(s, Status::Warning(_))));
    assert!(!mock.events().iter().any(|(e, _)| *e == SimEvent::ApAutothrottleArm));
}

#[tokio::test(start_paused = true)]
async fn test_altitude_error_drives_vertical_speed() {
    let mock = Arc::new(MockVehicle::at(LAT0, LON0, 2000.0).with_kinematics(0.2, 0.0));
    let target = Waypoint::new(nm_north(1.0), LON0, 3000.0, None).unwrap();
    run(NavTarget::FlyTo(target), &mock, TakeoffProfile::default()).await;

    let events = mock.events();
    assert!(events.contains(&(SimEvent::ApVsSetEnglish, Some(800))));
    assert!(events.contains(&(SimEvent::ApVsSetEnglish, Some(500))));
    assert!(events.contains(&(SimEvent::ApAltVarSetEnglish, Some(3000))));
    assert!(!events.iter().any(|(e, _)| *e == SimEvent::ApAltHoldOn));
}

#[tokio::test(start_paused = true)]
async fn test_scenario_flies_waypoints_in_order() {
    let mock = Arc::new(MockVehicle::at(LAT0, LON0, 3000.0).with_kinematics(0.2, 0.0));
    let waypoints = (1..=3)
        .map(|i| Waypoint::new(nm_north(f64::from(i)), LON0, 3000.0, None).unwrap())
        .collect();
    let scenario = Scenario::new(waypoints).unwrap();
    assert!((scenario.route_nm() - 2.0).abs() < 0.01);
    let statuses = run(NavTarget::Scenario(scenario), &mock, TakeoffProfile::default()).await;

    assert!(matches!(statuses.first(), Some(Status::ScenarioStarted { waypoints: 3, .. })));
    let milestones: Vec<String> = statuses
        .iter()
        .filter_map(|s| match s {
            Status::WaypointStarted { index, total: 3, .. } => Some(format!("start {index}")),
            Status::Arrived { leg: Some(leg) } => Some(format!("arrive {leg}")),
            Status::ScenarioComplete => Some("complete".to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(
        milestones,
        ["start 1", "arrive 1", "start 2", "arrive 2", "start 3", "arrive 3", "complete"]
    );
    assert_eq!(mock.events().last(), Some(&(SimEvent::ApVsSetEnglish, Some(0))));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_scenario_stops_early() {
    let mock = Arc::new(MockVehicle::at(LAT0, LON0, 3000.0).with_kinematics(0.2, 0.0));
    let waypoints = (1..=3)
        .map(|i| Waypoint::new(nm_north(f64::from(i) * 10.0), LON0, 3000.0, None).unwrap())
        .collect();
    let keychain = keychain(&mock, TakeoffProfile::default());
    let mut rx = keychain.status().subscribe();
    let c_tok = CancellationToken::new();
    let handle = tokio::spawn(run_task(
        NavTarget::Scenario(Scenario::new(waypoints).unwrap()),
        keychain,
        c_tok.clone(),
    ));
    tokio::time::sleep(Duration::from_secs(5)).await;
    c_tok.cancel();
    handle.await.unwrap();

    let statuses = drain(&mut rx);
    assert_eq!(statuses.last(), Some(&Status::Cancelled { task: TaskKind::Scenario }));
    assert!(!statuses.contains(&Status::ScenarioComplete));
    assert!(!statuses.iter().any(|s| matches!(s, Status::WaypointStarted { index: 2, .. })));
    assert_eq!(mock.events().last(), Some(&(SimEvent::ApVsSetEnglish, Some(0))));
}

#[test]
fn test_empty_scenario_is_rejected() {
    assert!(matches!(Scenario::new(Vec::new()), Err(InputError::EmptyScenario)));
}

#[tokio::test(start_paused = true)]
async fn test_takeoff_runs_all_stages() {
    let mock = Arc::new(
        MockVehicle::at(LAT0, LON0, 100.0)
            .with_kinematics(0.0, 0.05)
            .script(SimVar::AirspeedIndicated, [0.0, 20.0, 40.0, 60.0, 70.0].map(Some)),
    );
    let statuses = run(NavTarget::Takeoff, &mock, TakeoffProfile::default()).await;
    assert!(!has_failed(&statuses));

    let stages: Vec<TakeoffState> = statuses
        .iter()
        .filter_map(|s| match s {
            Status::TakeoffStage(state) => Some(*state),
            _ => None,
        })
        .collect();
    assert_eq!(
        stages,
        [
            TakeoffState::Accelerating,
            TakeoffState::Rotating,
            TakeoffState::Climbing,
            TakeoffState::LevelOff,
            TakeoffState::CruiseHandoff,
        ]
    );
    assert!(statuses.contains(&Status::TakeoffStarted));
    assert!(statuses.contains(&Status::ClimbingTo { target_alt_ft: 450.0 }));
    assert!(statuses.contains(&Status::LevelFlight));

    // the autopilot is only engaged once rotation speed has been read
    let log = mock.log();
    let ap_master = log.iter().position(|a| *a == Access::Event(SimEvent::ApMaster, None)).unwrap();
    let ias_reads = log[..ap_master].iter().filter(|a| **a == Access::Read(SimVar::AirspeedIndicated)).count();
    assert_eq!(ias_reads, 5);

    let events = mock.events();
    assert_eq!(events.first(), Some(&(SimEvent::ParkingBrakes, None)));
    assert!(events.contains(&(SimEvent::ApAltVarSetEnglish, Some(450))));
    assert!(events.contains(&(SimEvent::ApVsSetEnglish, Some(1000))));
    assert!(events.contains(&(SimEvent::ApAltHoldOff, None)));
    assert_eq!(events.last(), Some(&(SimEvent::ThrottleAxisSetEx1, Some(6554))));
    assert_eq!(mock.value(SimVar::ThrottleLever), Some(100.0));
    assert_eq!(mock.value(SimVar::FlapsHandlePercent), Some(25.0));
}

#[tokio::test(start_paused = true)]
async fn test_takeoff_rotation_timeout() {
    let mock = Arc::new(MockVehicle::at(LAT0, LON0, 100.0));
    mock.put(SimVar::AirspeedIndicated, 10.0);
    let profile = TakeoffProfile { rotation_timeout: Some(Duration::from_secs(5)), ..TakeoffProfile::default() };
    let statuses = run(NavTarget::Takeoff, &mock, profile).await;

    assert!(statuses.contains(&Status::TakeoffStage(TakeoffState::Failed)));
    assert!(matches!(statuses.last(), Some(Status::Failed { task: TaskKind::Takeoff, .. })));
    assert!(!mock.events().iter().any(|(e, _)| *e == SimEvent::ApMaster));
    assert_eq!(mock.events().last(), Some(&(SimEvent::ApVsSetEnglish, Some(0))));
}

#[tokio::test(start_paused = true)]
async fn test_takeoff_write_failure_fails_sequence() {
    let mock = Arc::new(MockVehicle::at(LAT0, LON0, 100.0).fail_writes_to(SimVar::ThrottleLever));
    let statuses = run(NavTarget::Takeoff, &mock, TakeoffProfile::default()).await;

    assert!(statuses.contains(&Status::TakeoffStage(TakeoffState::Failed)));
    assert!(!statuses.contains(&Status::TakeoffStarted));
    assert!(matches!(statuses.last(), Some(Status::Failed { task: TaskKind::Takeoff, .. })));
}

#[tokio::test(start_paused = true)]
async fn test_teleport_snaps_onto_target() {
    let mock = Arc::new(MockVehicle::at(LAT0, LON0, 1000.0));
    let target = Waypoint::new(LAT0 + 0.0005, LON0, 1200.0, Some(100.0)).unwrap();
    let req = TeleportRequest::new(target, None, None).unwrap();
    let statuses = run(NavTarget::Teleport(req), &mock, TakeoffProfile::default()).await;

    let Some(Status::TeleportStarted { steps, .. }) = statuses.first() else {
        panic!("teleport did not start: {statuses:?}");
    };
    // 0.0005 deg of latitude is roughly 55 m
    assert!((10..=11).contains(steps));
    let step_count = statuses.iter().filter(|s| matches!(s, Status::TeleportStep { .. })).count();
    assert_eq!(step_count, *steps);
    assert!(statuses.contains(&Status::TeleportComplete));

    assert_eq!(mock.value(SimVar::PlaneLatitude), Some(LAT0 + 0.0005));
    assert_eq!(mock.value(SimVar::PlaneLongitude), Some(LON0));
    assert_eq!(mock.value(SimVar::PlaneAltitude), Some(1200.0));
    let events = mock.events();
    assert_eq!(events.first(), Some(&(SimEvent::HeadingBugSet, Some(0))));
    assert!(events.contains(&(SimEvent::ApSpdVarSet, Some(100))));
    assert_eq!(events.last(), Some(&(SimEvent::ThrottleAxisSetEx1, Some(8192))));
}

#[tokio::test(start_paused = true)]
async fn test_teleport_uses_given_heading() {
    let mock = Arc::new(MockVehicle::at(LAT0, LON0, 1000.0));
    let target = Waypoint::new(LAT0 + 0.0001, LON0, 1000.0, None).unwrap();
    let req = TeleportRequest::new(target, Some(270.4), Some(2.0)).unwrap();
    run(NavTarget::Teleport(req), &mock, TakeoffProfile::default()).await;

    assert_eq!(mock.events().first(), Some(&(SimEvent::HeadingBugSet, Some(270))));
}

#[tokio::test(start_paused = true)]
async fn test_teleport_without_sim_data_fails() {
    let mock = Arc::new(MockVehicle::default());
    let target = Waypoint::new(LAT0, LON0, 1000.0, None).unwrap();
    let req = TeleportRequest::new(target, None, None).unwrap();
    let statuses = run(NavTarget::Teleport(req), &mock, TakeoffProfile::default()).await;

    assert!(matches!(statuses.last(), Some(Status::Failed { task: TaskKind::Teleport, .. })));
    assert!(!mock.log().iter().any(|a| matches!(a, Access::Write(..))));
}

fn writes_to(mock: &MockVehicle, var: SimVar) -> Vec<f64> {
    mock.log()
        .into_iter()
        .filter_map(|a| match a {
            Access::Write(v, value) if v == var => Some(value),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_teleport_across_antimeridian_wraps_longitude() {
    let mock = Arc::new(MockVehicle::at(10.0, 179.9995, 1000.0));
    let target = Waypoint::new(10.0, -179.9995, 1000.0, None).unwrap();
    let req = TeleportRequest::new(target, None, None).unwrap();
    let statuses = run(NavTarget::Teleport(req), &mock, TakeoffProfile::default()).await;
    assert!(statuses.contains(&Status::TeleportComplete));

    let lons = writes_to(&mock, SimVar::PlaneLongitude);
    assert!(lons.iter().all(|lon| (-180.0..=180.0).contains(lon)), "{lons:?}");
    // eastbound: the steps cross over to negative longitudes before the snap
    assert!(lons[0] > 179.9995);
    assert!(lons[..lons.len() - 1].iter().any(|lon| *lon < 0.0));
    assert_eq!(lons.last(), Some(&-179.9995));
    for status in &statuses {
        if let Status::TeleportStep { pos, .. } = status {
            assert!((-180.0..=180.0).contains(&pos.lon()));
        }
    }
    assert_eq!(mock.events().first(), Some(&(SimEvent::HeadingBugSet, Some(90))));
}

#[tokio::test(start_paused = true)]
async fn test_teleport_near_pole_stays_in_range() {
    // starting on the pole, the longitude increment must stay finite
    let mock = Arc::new(MockVehicle::at(90.0, 0.0, 1000.0));
    let target = Waypoint::new(89.9995, 45.0, 1000.0, None).unwrap();
    let req = TeleportRequest::new(target, None, None).unwrap();
    run(NavTarget::Teleport(req), &mock, TakeoffProfile::default()).await;

    let lons = writes_to(&mock, SimVar::PlaneLongitude);
    let steps = &lons[..lons.len() - 1];
    assert!(!steps.is_empty());
    assert!(steps.iter().all(|lon| lon.abs() < 1.0), "{steps:?}");
    assert_eq!(lons.last(), Some(&45.0));

    // a step plan over the pole must not push the latitude past it
    let mock = Arc::new(MockVehicle::at(89.9998, 0.0, 1000.0));
    let target = Waypoint::new(89.9998, 180.0, 1000.0, None).unwrap();
    let req = TeleportRequest::new(target, None, None).unwrap();
    run(NavTarget::Teleport(req), &mock, TakeoffProfile::default()).await;
    let lats = writes_to(&mock, SimVar::PlaneLatitude);
    assert!(lats.iter().all(|lat| *lat <= 90.0), "{lats:?}");
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_teleport_does_not_snap() {
    let mock = Arc::new(MockVehicle::at(LAT0, LON0, 1000.0));
    let target = Waypoint::new(LAT0 + 0.01, LON0, 1000.0, None).unwrap();
    let req = TeleportRequest::new(target, None, None).unwrap();
    let keychain = keychain(&mock, TakeoffProfile::default());
    let mut rx = keychain.status().subscribe();
    let c_tok = CancellationToken::new();
    let handle = tokio::spawn(run_task(NavTarget::Teleport(req), keychain, c_tok.clone()));
    tokio::time::sleep(Duration::from_secs(1)).await;
    c_tok.cancel();
    handle.await.unwrap();

    let lats = writes_to(&mock, SimVar::PlaneLatitude);
    assert!(!lats.is_empty());
    assert!(!lats.contains(&(LAT0 + 0.01)));
    assert!(mock.value(SimVar::PlaneLatitude).unwrap() < LAT0 + 0.005);
    assert_eq!(mock.events().last(), Some(&(SimEvent::ApVsSetEnglish, Some(0))));
    assert!(!mock.events().iter().any(|(e, _)| *e == SimEvent::ApMaster));

    let statuses = drain(&mut rx);
    assert!(!statuses.contains(&Status::TeleportComplete));
    assert_eq!(statuses.last(), Some(&Status::Cancelled { task: TaskKind::Teleport }));
}

#[test]
fn test_teleport_request_validation() {
    let target = Waypoint::new(LAT0, LON0, 1000.0, None).unwrap();
    let req = TeleportRequest::new(target, None, None).unwrap();
    assert_eq!(req.step_m(), TeleportRequest::DEFAULT_STEP_M);
    assert!(matches!(TeleportRequest::new(target, Some(360.0), None), Err(InputError::HeadingOutOfRange(_))));
    assert!(matches!(TeleportRequest::new(target, Some(-1.0), None), Err(InputError::HeadingOutOfRange(_))));
    assert!(matches!(TeleportRequest::new(target, None, Some(0.0)), Err(InputError::NotPositive(..))));
    assert!(matches!(TeleportRequest::new(target, None, Some(f64::NAN)), Err(InputError::NotFinite(_))));
}

#[tokio::test(start_paused = true)]
async fn test_stream_frames_written_in_order() {
    let mock = Arc::new(MockVehicle::at(LAT0, LON0, 1000.0));
    let frames = vec![
        StreamFrame { lat: Some(40.1), lon: Some(29.1), alt: Some(1100.0), ..StreamFrame::default() },
        StreamFrame { lat: Some(40.2), heading_deg: Some(90.0), pitch_deg: Some(5.0), ..StreamFrame::default() },
        StreamFrame { lat: Some(40.3), lon: Some(29.3), roll_deg: Some(-10.0), ..StreamFrame::default() },
    ];
    let stream = futures::stream::iter(frames).boxed();
    let statuses = run(NavTarget::Follow(stream), &mock, TakeoffProfile::default()).await;

    assert_eq!(statuses.first(), Some(&Status::FollowStarted));
    assert_eq!(statuses.last(), Some(&Status::FollowComplete));
    let frames: Vec<usize> = statuses
        .iter()
        .filter_map(|s| match s {
            Status::FollowFrame { frame, .. } => Some(*frame),
            _ => None,
        })
        .collect();
    assert_eq!(frames, [1, 2, 3]);

    let log = mock.log();
    assert_eq!(log.first(), Some(&Access::Event(SimEvent::ApMasterOff, None)));
    let lats: Vec<f64> = log
        .iter()
        .filter_map(|a| match a {
            Access::Write(SimVar::PlaneLatitude, v) => Some(*v),
            _ => None,
        })
        .collect();
    assert_eq!(lats, [40.1, 40.2, 40.3]);
    let lon_writes = log.iter().filter(|a| matches!(a, Access::Write(SimVar::PlaneLongitude, _))).count();
    assert_eq!(lon_writes, 2);
    assert!(mock.events().contains(&(SimEvent::HeadingBugSet, Some(90))));
    let hdg = mock.value(SimVar::PlaneHeadingDegreesTrue).unwrap();
    assert!((hdg - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    let bank = mock.value(SimVar::PlaneBankDegrees).unwrap();
    assert!((bank + 10f64.to_radians()).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_follow_stops_mid_stream() {
    let mock = Arc::new(MockVehicle::at(LAT0, LON0, 1000.0));
    let frames = (1..=100).map(|i| StreamFrame { lat: Some(LAT0 + f64::from(i) * 0.001), ..StreamFrame::default() });
    let stream = futures::stream::iter(frames).boxed();
    let keychain = keychain(&mock, TakeoffProfile::default());
    let mut rx = keychain.status().subscribe();
    let c_tok = CancellationToken::new();
    let handle = tokio::spawn(run_task(NavTarget::Follow(stream), keychain, c_tok.clone()));
    tokio::time::sleep(Duration::from_secs(1)).await;
    c_tok.cancel();
    handle.await.unwrap();

    let written = writes_to(&mock, SimVar::PlaneLatitude).len();
    assert!((1..100).contains(&written), "{written} frames written");
    assert_eq!(mock.events().last(), Some(&(SimEvent::ApVsSetEnglish, Some(0))));

    let statuses = drain(&mut rx);
    assert!(!statuses.contains(&Status::FollowComplete));
    assert_eq!(statuses.last(), Some(&Status::Cancelled { task: TaskKind::Follow }));
}

// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Lane pursuit towards the rightmost lane during a highway takeover
//!
//! On engagement the rightmost lane is searched once by following right-neighbour
//! links. Every tick then steers towards a lookahead waypoint with a gain depending on
//! whether the vehicle already is in that lane and centered in it, while the speed
//! decays linearly towards standstill.

use crate::command::ControlCommand;
use crate::decel::{Creep, DecayLaw, DecelProfile};
use crate::error::{Error, Result};
use crate::world::{Telemetry, Waypoint, World};
use std::f64::consts::PI;
use vigil_log::{debug, info};
use vigil_time::Duration;

/// Upper bound on right-neighbour hops when searching the rightmost lane
pub const MAX_LANE_HOPS: usize = 16;

/// Follow right-neighbour links from `start` until no neighbour exists.
///
/// Fails with [`Error::Topology`] if a lane id is revisited or the search exceeds
/// [`MAX_LANE_HOPS`].
pub fn rightmost_lane(world: &dyn World, start: &Waypoint) -> Result<Waypoint> {
    let mut visited = vec![start.lane_id];
    let mut current = *start;
    while let Some(next) = world.right_lane(&current) {
        if visited.contains(&next.lane_id) {
            return Err(Error::Topology(format!(
                "lane {} revisited while searching the rightmost lane from {}",
                next.lane_id, start.lane_id
            )));
        }
        if visited.len() > MAX_LANE_HOPS {
            return Err(Error::Topology(format!(
                "no rightmost lane within {MAX_LANE_HOPS} hops from lane {}",
                start.lane_id
            )));
        }
        visited.push(next.lane_id);
        current = next;
    }
    Ok(current)
}

/// Steering target of one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneTarget {
    pub target_lane_id: i32,
    /// Distance from the center of the current lane in metres
    pub lateral_offset: f64,
    pub gain: f64,
    /// Speed target in km/h
    pub target_speed: f64,
}

/// Lane pursuit tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PursuitProfile {
    /// Fraction of the lane width within which the vehicle counts as centered
    pub centered_tolerance: f64,
    /// Fraction of the lane width within which the short speed horizon applies
    pub settled_tolerance: f64,
    pub hold_gain: f64,
    pub correct_gain: f64,
    pub merge_gain: f64,
    pub hold_lookahead: f64,
    pub merge_lookahead: f64,
    pub settled_horizon: Duration,
    pub merge_horizon: Duration,
    pub steer_limit: f64,
    /// Dead band around the speed target in km/h
    pub speed_band: f64,
    /// Speed gap in km/h mapped to full brake
    pub brake_scale: f64,
    pub catch_up_throttle: f64,
    pub hold_throttle: f64,
}

/// Wrap an angle in radians into `(-PI, PI]`
fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.sin().atan2(angle.cos());
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}

/// Active lane pursuit
#[derive(Debug)]
pub struct LanePursuit {
    profile: PursuitProfile,
    target_lane_id: i32,
    initial_speed: f64,
    last_target: Option<f64>,
}

impl LanePursuit {
    /// Search the rightmost lane from the vehicle's position and start pursuing it
    pub fn engage(
        world: &dyn World,
        telemetry: &Telemetry,
        initial_speed: f64,
        profile: PursuitProfile,
    ) -> Result<Self> {
        let current = world.waypoint(&telemetry.location)?;
        let target = rightmost_lane(world, &current)?;
        info!(
            "Lane pursuit engaged from lane {} towards lane {} at {initial_speed:.1} km/h",
            current.lane_id, target.lane_id
        );
        Ok(Self {
            profile,
            target_lane_id: target.lane_id,
            initial_speed,
            last_target: None,
        })
    }

    pub fn target_lane_id(&self) -> i32 {
        self.target_lane_id
    }

    /// Command `since` after the takeover started
    pub fn step(
        &mut self,
        world: &dyn World,
        telemetry: &Telemetry,
        since: Duration,
    ) -> Result<(ControlCommand, LaneTarget)> {
        let profile = &self.profile;
        let current = world.waypoint(&telemetry.location)?;
        let lateral_offset = telemetry.location.distance_2d(&current.location);
        let in_target = current.lane_id == self.target_lane_id;
        let centered =
            in_target && lateral_offset < profile.centered_tolerance * current.lane_width;

        let (aim, gain) = if centered {
            let ahead = world.next(&current, profile.hold_lookahead).unwrap_or(current);
            (ahead, profile.hold_gain)
        } else {
            let ahead = world.next(&current, profile.merge_lookahead).unwrap_or(current);
            let gain = if in_target {
                profile.correct_gain
            } else {
                profile.merge_gain
            };
            (rightmost_lane(world, &ahead)?, gain)
        };

        let to_aim = aim.location - telemetry.location;
        let bearing = to_aim.y.atan2(to_aim.x);
        let heading_error = wrap_angle(bearing - telemetry.yaw.to_radians());
        let steer = (gain * heading_error).clamp(-profile.steer_limit, profile.steer_limit);

        let settled =
            in_target && lateral_offset < profile.settled_tolerance * current.lane_width;
        let horizon = if settled {
            profile.settled_horizon
        } else {
            profile.merge_horizon
        };
        let target_speed = self.target_speed(horizon, since);

        let speed = telemetry.speed_kmh();
        let profile = &self.profile;
        let command = if speed > target_speed + profile.speed_band {
            let brake = ((speed - target_speed) / profile.brake_scale).min(1.0);
            ControlCommand::brake(steer, brake, speed)
        } else if speed < target_speed - profile.speed_band {
            ControlCommand::drive(steer, profile.catch_up_throttle, speed)
        } else {
            ControlCommand::drive(steer, profile.hold_throttle, speed)
        };

        let lane_target = LaneTarget {
            target_lane_id: self.target_lane_id,
            lateral_offset,
            gain,
            target_speed,
        };
        debug!(
            "Lane {} -> {}, offset {lateral_offset:.2}m, target {target_speed:.1} km/h, {command}",
            current.lane_id, self.target_lane_id
        );
        Ok((command, lane_target))
    }

    /// Linear decay of the engagement speed, never rising within one episode
    fn target_speed(&mut self, horizon: Duration, since: Duration) -> f64 {
        let decay = DecelProfile {
            law: DecayLaw::Linear,
            duration: horizon,
            max_brake: 1.0,
            creep: Creep::Throttle(self.profile.hold_throttle),
        };
        let target = decay.target(self.initial_speed, since);
        let target = self.last_target.map_or(target, |last| target.min(last));
        self.last_target = Some(target);
        target
    }
}

#[cfg(test)]
mod test {
    use super::{rightmost_lane, wrap_angle, LanePursuit, MAX_LANE_HOPS};
    use crate::configuration::profiles::HIGHWAY_PURSUIT;
    use crate::error::{Error, Result};
    use crate::world::{Location, Telemetry, TrafficLightState, Vector3, Waypoint, World};
    use std::f64::consts::PI;
    use vigil_time::Duration;

    /// Straight lanes along x, lane `n` centered at `y = 3.5 * n`, rightmost lane `lanes`
    struct Lanes {
        lanes: i32,
        cyclic: bool,
    }

    impl Lanes {
        fn waypoint_of(&self, lane_id: i32, x: f64) -> Waypoint {
            Waypoint {
                lane_id,
                lane_width: 3.5,
                location: Location::new(x, 3.5 * lane_id as f64, 0.0),
                yaw: 0.0,
            }
        }
    }

    impl World for Lanes {
        fn waypoint(&self, location: &Location) -> Result<Waypoint> {
            let lane = (location.y / 3.5).round().clamp(1.0, self.lanes as f64) as i32;
            Ok(self.waypoint_of(lane, location.x))
        }

        fn right_lane(&self, waypoint: &Waypoint) -> Option<Waypoint> {
            if waypoint.lane_id < self.lanes {
                Some(self.waypoint_of(waypoint.lane_id + 1, waypoint.location.x))
            } else if self.cyclic {
                Some(self.waypoint_of(1, waypoint.location.x))
            } else {
                None
            }
        }

        fn next(&self, waypoint: &Waypoint, distance: f64) -> Option<Waypoint> {
            Some(self.waypoint_of(waypoint.lane_id, waypoint.location.x + distance))
        }

        fn oncoming_location(&self) -> Option<Location> {
            None
        }

        fn set_traffic_lights(&mut self, _: TrafficLightState) -> Result<usize> {
            Ok(0)
        }
    }

    fn telemetry(y: f64, yaw: f64, speed_ms: f64) -> Telemetry {
        Telemetry {
            velocity: Vector3::new(speed_ms, 0.0, 0.0),
            location: Location::new(0.0, y, 0.0),
            yaw,
        }
    }

    #[test]
    fn rightmost_lane_follows_neighbours() {
        let world = Lanes {
            lanes: 4,
            cyclic: false,
        };
        let start = world.waypoint_of(1, 0.0);
        assert_eq!(rightmost_lane(&world, &start).unwrap().lane_id, 4);
    }

    #[test]
    fn cyclic_topology_is_rejected() {
        let world = Lanes {
            lanes: 3,
            cyclic: true,
        };
        let start = world.waypoint_of(2, 0.0);
        assert!(matches!(
            rightmost_lane(&world, &start),
            Err(Error::Topology(_))
        ));
    }

    #[test]
    fn overlong_chain_is_rejected() {
        let world = Lanes {
            lanes: MAX_LANE_HOPS as i32 + 5,
            cyclic: false,
        };
        let start = world.waypoint_of(1, 0.0);
        assert!(matches!(
            rightmost_lane(&world, &start),
            Err(Error::Topology(_))
        ));
    }

    #[test]
    fn heading_error_is_wrapped() {
        assert!((wrap_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-9);
        assert!((wrap_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-9);
        assert!((wrap_angle(-PI).abs() - PI).abs() < 1e-9);
    }

    #[test]
    fn steering_is_bounded_and_points_right() {
        let world = Lanes {
            lanes: 4,
            cyclic: false,
        };
        let start = telemetry(3.5, 0.0, 25.0);
        let mut pursuit = LanePursuit::engage(&world, &start, 90.0, HIGHWAY_PURSUIT).unwrap();
        assert_eq!(pursuit.target_lane_id(), 4);

        for yaw in [-170.0, -45.0, 0.0, 45.0, 170.0] {
            let (command, target) = pursuit
                .step(&world, &telemetry(3.5, yaw, 25.0), Duration::from_secs(1))
                .unwrap();
            assert!(command.steer.abs() <= 0.5);
            assert_eq!(target.gain, 0.4);
        }
        let (command, _) = pursuit
            .step(&world, &start, Duration::from_secs(1))
            .unwrap();
        assert!(command.steer > 0.0);
    }

    #[test]
    fn speed_target_never_rises() {
        let world = Lanes {
            lanes: 2,
            cyclic: false,
        };
        let mut pursuit =
            LanePursuit::engage(&world, &telemetry(3.5, 0.0, 25.0), 90.0, HIGHWAY_PURSUIT)
                .unwrap();

        // Centered in the target lane: short horizon, 90 - 15 * 1
        let (_, settled) = pursuit
            .step(&world, &telemetry(7.0, 0.0, 25.0), Duration::from_secs(1))
            .unwrap();
        assert_eq!(settled.target_lane_id, 2);
        assert_eq!(settled.target_speed, 75.0);

        // Still centered but no longer settled: long horizon, where 90 - 9 * 1.5 = 76.5
        let off_center = 77.2 / 3.6;
        let (command, drifted) = pursuit
            .step(
                &world,
                &telemetry(5.5, 0.0, off_center),
                Duration::from_millis(1500),
            )
            .unwrap();
        assert_eq!(drifted.gain, HIGHWAY_PURSUIT.hold_gain);
        assert_eq!(drifted.target_speed, settled.target_speed);
        // 77.2 km/h is inside the band around 76.5 but above the band around 75
        assert_eq!(command.throttle, 0.0);
        assert!((command.brake - (77.2 - 75.0) / 50.0).abs() < 1e-9);

        let (command, later) = pursuit
            .step(&world, &telemetry(5.5, 0.0, 60.0 / 3.6), Duration::from_secs(3))
            .unwrap();
        assert_eq!(later.target_speed, 63.0);
        assert_eq!(command.throttle, HIGHWAY_PURSUIT.catch_up_throttle);
    }
}

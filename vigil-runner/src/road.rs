// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Dry-run world
//!
//! A straight road along the x axis. Lanes of the ego direction are numbered from the
//! left starting at 1, each one lane width further to the right (+y). A single opposite
//! lane with id -1 lies left of lane 1. Vehicles are kinematic point masses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use vigil::command::ControlCommand;
use vigil::error::{Error, Result};
use vigil::scenario::ScenarioId;
use vigil::world::{Actuator, Location, Telemetry, TrafficLightState, Vector3, Waypoint, World};
use vigil_log::{debug, info};
use vigil_time::Duration;

const LANE_WIDTH: f64 = 3.5;
const OPPOSITE_LANE: i32 = -1;
const TRAFFIC_LIGHTS: usize = 4;
/// Acceleration at full throttle in m/s²
const THROTTLE_ACCEL: f64 = 3.0;
/// Deceleration at full brake in m/s²
const BRAKE_DECEL: f64 = 8.0;
/// Yaw rate at full steering lock in deg/s
const STEER_RATE: f64 = 40.0;

/// Kinematic point mass
#[derive(Debug, Clone)]
struct Body {
    location: Location,
    /// Heading in degrees
    yaw: f64,
    /// Speed in m/s
    speed: f64,
    command: ControlCommand,
}

impl Body {
    fn new(location: Location, yaw: f64, speed: f64) -> Self {
        Self {
            location,
            yaw,
            speed,
            command: ControlCommand::default(),
        }
    }

    fn integrate(&mut self, dt: f64) {
        let accel = THROTTLE_ACCEL * self.command.throttle - BRAKE_DECEL * self.command.brake;
        self.speed = (self.speed + accel * dt).max(0.0);
        self.yaw += self.command.steer * STEER_RATE * dt;
        let yaw = self.yaw.to_radians();
        self.location.x += self.speed * yaw.cos() * dt;
        self.location.y += self.speed * yaw.sin() * dt;
    }

    fn velocity(&self) -> Vector3 {
        let yaw = self.yaw.to_radians();
        Vector3::new(self.speed * yaw.cos(), self.speed * yaw.sin(), 0.0)
    }
}

/// Straight multi-lane road with the ego vehicle, an optional oncoming vehicle and a
/// set of traffic lights
#[derive(Debug)]
pub struct Road {
    lanes: i32,
    ego: Body,
    oncoming: Option<Body>,
    lights: Vec<TrafficLightState>,
    last_tick: Duration,
    camera: Option<Arc<AtomicU64>>,
}

impl Road {
    /// Road layout used for `scenario_id`
    pub fn for_scenario(scenario_id: ScenarioId) -> Self {
        let lanes = match scenario_id.value() {
            2 => 3,
            _ => 2,
        };
        let oncoming = match scenario_id.value() {
            6 => Some(Body::new(
                Location::new(120.0, lane_center(OPPOSITE_LANE), 0.0),
                180.0,
                40.0 / 3.6,
            )),
            _ => None,
        };
        info!(
            "Dry-run road with {lanes} lane(s){}",
            if oncoming.is_some() {
                " and an oncoming vehicle"
            } else {
                ""
            }
        );
        Self {
            lanes,
            ego: Body::new(Location::new(0.0, lane_center(1), 0.0), 0.0, 0.0),
            oncoming,
            lights: vec![TrafficLightState::Green; TRAFFIC_LIGHTS],
            last_tick: Duration::ZERO,
            camera: None,
        }
    }

    /// Count one captured frame per simulation tick into `frames`
    pub fn attach_camera(&mut self, frames: Arc<AtomicU64>) {
        self.camera = Some(frames);
    }

    pub fn traffic_lights(&self) -> &[TrafficLightState] {
        &self.lights
    }

    fn lane_waypoint(&self, lane_id: i32, x: f64) -> Waypoint {
        Waypoint {
            lane_id,
            lane_width: LANE_WIDTH,
            location: Location::new(x, lane_center(lane_id), 0.0),
            yaw: if lane_id == OPPOSITE_LANE { 180.0 } else { 0.0 },
        }
    }
}

fn lane_center(lane_id: i32) -> f64 {
    if lane_id == OPPOSITE_LANE {
        -LANE_WIDTH
    } else {
        LANE_WIDTH * (lane_id - 1) as f64
    }
}

impl World for Road {
    fn waypoint(&self, location: &Location) -> Result<Waypoint> {
        if !location.x.is_finite() || !location.y.is_finite() {
            return Err(Error::Environment(format!(
                "no waypoint near {location:?}"
            )));
        }
        let lane_id = if location.y < -LANE_WIDTH / 2.0 {
            OPPOSITE_LANE
        } else {
            ((location.y / LANE_WIDTH).round() as i32 + 1).clamp(1, self.lanes)
        };
        Ok(self.lane_waypoint(lane_id, location.x))
    }

    fn right_lane(&self, waypoint: &Waypoint) -> Option<Waypoint> {
        (waypoint.lane_id >= 1 && waypoint.lane_id < self.lanes)
            .then(|| self.lane_waypoint(waypoint.lane_id + 1, waypoint.location.x))
    }

    fn next(&self, waypoint: &Waypoint, distance: f64) -> Option<Waypoint> {
        let x = if waypoint.lane_id == OPPOSITE_LANE {
            waypoint.location.x - distance
        } else {
            waypoint.location.x + distance
        };
        Some(self.lane_waypoint(waypoint.lane_id, x))
    }

    fn oncoming_location(&self) -> Option<Location> {
        self.oncoming.as_ref().map(|body| body.location)
    }

    fn set_traffic_lights(&mut self, state: TrafficLightState) -> Result<usize> {
        self.lights.iter_mut().for_each(|light| *light = state);
        debug!("{} traffic light(s) set to {state:?}", self.lights.len());
        Ok(self.lights.len())
    }
}

impl Actuator for Road {
    fn telemetry(&self) -> Result<Telemetry> {
        Ok(Telemetry {
            velocity: self.ego.velocity(),
            location: self.ego.location,
            yaw: self.ego.yaw,
        })
    }

    fn apply_control(&mut self, command: &ControlCommand) -> Result<()> {
        self.ego.command = *command;
        Ok(())
    }

    fn apply_npc_control(&mut self, command: &ControlCommand) -> Result<()> {
        let body = self
            .oncoming
            .as_mut()
            .ok_or_else(|| Error::Environment("no oncoming vehicle to control".into()))?;
        body.command = *command;
        Ok(())
    }

    fn tick(&mut self, elapsed: Duration) -> Result<()> {
        let dt = elapsed.saturating_sub(self.last_tick).as_secs_f64();
        self.last_tick = elapsed;
        self.ego.integrate(dt);
        if let Some(body) = self.oncoming.as_mut() {
            body.integrate(dt);
        }
        if let Some(frames) = &self.camera {
            frames.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if self.oncoming.take().is_some() {
            debug!("Oncoming vehicle destroyed");
        }
        self.camera = None;
        Ok(())
    }
}

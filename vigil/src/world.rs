// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! World and actuator interfaces
//!
//! Vigil does not simulate anything. Telemetry, lane topology, actors and traffic
//! lights are provided by an external simulator behind the [`World`] and [`Actuator`]
//! traits.

use crate::command::ControlCommand;
use crate::error::Result;
use std::ops::Sub;
use vigil_time::Duration;

/// Vector in world coordinates (metres, or metres per second for velocities)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// A position in the world
pub type Location = Vector3;

impl Location {
    /// Euclidean distance between two locations
    pub fn distance(&self, other: &Location) -> f64 {
        (*self - *other).length()
    }

    /// Distance in the ground plane
    pub fn distance_2d(&self, other: &Location) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Ego vehicle state sampled once per tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Telemetry {
    pub velocity: Vector3,
    pub location: Location,
    /// Heading in degrees
    pub yaw: f64,
}

impl Telemetry {
    /// Speed in km/h
    pub fn speed_kmh(&self) -> f64 {
        self.velocity.length() * 3.6
    }
}

/// Point on the center line of a lane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub lane_id: i32,
    pub lane_width: f64,
    pub location: Location,
    /// Lane heading in degrees
    pub yaw: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficLightState {
    Green,
    Yellow,
    Red,
}

/// Read access to map data and control of world-level actors.
pub trait World {
    /// Lane center waypoint closest to `location`
    fn waypoint(&self, location: &Location) -> Result<Waypoint>;

    /// Waypoint in the lane to the right of `waypoint`, if there is one
    fn right_lane(&self, waypoint: &Waypoint) -> Option<Waypoint>;

    /// Waypoint `distance` metres ahead along the lane of `waypoint`
    fn next(&self, waypoint: &Waypoint, distance: f64) -> Option<Waypoint>;

    /// Location of the oncoming actor, if the scenario spawned one
    fn oncoming_location(&self) -> Option<Location>;

    /// Force every traffic light into `state`. Returns the number of lights changed.
    fn set_traffic_lights(&mut self, state: TrafficLightState) -> Result<usize>;
}

/// Control of the ego vehicle and scenario actors.
pub trait Actuator {
    /// Current ego telemetry
    fn telemetry(&self) -> Result<Telemetry>;

    /// Apply a command to the ego vehicle
    fn apply_control(&mut self, command: &ControlCommand) -> Result<()>;

    /// Apply a command to the oncoming actor
    fn apply_npc_control(&mut self, command: &ControlCommand) -> Result<()>;

    /// Advance the simulation to `elapsed`
    fn tick(&mut self, elapsed: Duration) -> Result<()>;

    /// Destroy spawned actors. Called once after the run, failures are not fatal.
    fn release(&mut self) -> Result<()>;
}

// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Vigil drives a simulated vehicle's actuators from elapsed scenario time, a driver
//! alertness classification and a driver acknowledgment signal.
//!
//! # Scenarios and handlers
//!
//! Each [scenario](crate::scenario) is served by one handler. Handlers are built from
//! a small set of controllers: the [critical event](crate::critical) escalation, the
//! [periodic alert](crate::alert) emitter, the [deceleration curve](crate::decel),
//! [lane pursuit](crate::lane_pursuit), [scripted trajectories](crate::scripted) and
//! the [oncoming traffic encounter](crate::encounter).
//!
//! # Ticks
//!
//! The [dispatcher](crate::scenario::Dispatcher) is called once per tick with the
//! elapsed scenario time. It returns a [ControlCommand](crate::command::ControlCommand)
//! together with [annunciator requests](crate::annunciator::Request) as plain data;
//! the [session](crate::session) forwards both to the outside world.
//!
//! # Time
//!
//! Elapsed time is an opaque, monotonically increasing input supplied by a
//! `vigil_time::Clock`. Nothing in this crate reads the host clock for control
//! decisions.

pub mod alert;
pub mod annunciator;
pub mod cleanup;
pub mod command;
pub mod configuration;
pub mod critical;
pub mod decel;
pub mod encounter;
pub mod error;
pub mod lane_pursuit;
pub mod scenario;
pub mod scripted;
pub mod session;
pub mod world;

/// Re-export the public API
pub mod prelude {
    pub use crate::annunciator::{Annunciator, Cue, LightState, Request};
    pub use crate::command::{ControlCommand, DriverClass};
    pub use crate::configuration::session::{Builder as SessionBuilder, SessionConfig};
    pub use crate::error::{Error, Result};
    pub use crate::scenario::{Dispatcher, Resolution, ScenarioId, TickInput, TickOutput};
    pub use crate::session::{
        AckSource, Peripherals, RunSummary, ScheduledAck, Session, TickObserver, TickRecord,
    };
    pub use crate::world::{Actuator, Location, Telemetry, Waypoint, World};
}

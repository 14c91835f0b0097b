// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Unresponsive driver approaching a red light

use super::{Effects, Resolution, ScenarioHandler, TickInput};
use crate::annunciator::{Cue, Narration, Request};
use crate::command::{ControlCommand, DriverClass};
use crate::configuration::profiles::{
    RED_LIGHT_CRITICAL, RED_LIGHT_CRUISE, RED_LIGHT_NARRATION_AFTER, RED_LIGHT_STOP,
};
use crate::critical::{CriticalEvent, Directive, Phase};
use crate::error::Result;
use crate::world::{TrafficLightState, World};
use tracing::instrument;
use vigil_log::info;

/// Runs the critical event regardless of the driver's classification. Traffic lights
/// turn red when the warning starts.
#[derive(Debug)]
pub struct RedLightHandler {
    driver_class: DriverClass,
    event: CriticalEvent,
    narration_played: bool,
    lights_red: bool,
}

impl RedLightHandler {
    pub fn new(driver_class: DriverClass) -> Self {
        Self {
            driver_class,
            event: CriticalEvent::new(RED_LIGHT_CRITICAL),
            narration_played: false,
            lights_red: false,
        }
    }
}

impl ScenarioHandler for RedLightHandler {
    #[instrument(name = "red light", level = "trace", skip_all)]
    fn step(
        &mut self,
        input: &TickInput,
        world: &mut dyn World,
        effects: &mut Effects,
    ) -> Result<ControlCommand> {
        let t = input.elapsed;
        let speed = input.telemetry.speed_kmh();

        if t > RED_LIGHT_NARRATION_AFTER
            && t < RED_LIGHT_CRITICAL.warn_delay
            && !self.narration_played
        {
            self.narration_played = true;
            effects
                .requests
                .push(Request::Play(Cue::Narration(Narration::RedLight)));
        }

        let directive = self
            .event
            .advance(t, input.driver_ack, speed, &mut effects.requests);

        if self.event.state().warning_start.is_some() && !self.lights_red {
            self.lights_red = true;
            let count = world.set_traffic_lights(TrafficLightState::Red)?;
            info!("Set {count} traffic light(s) to red");
        }

        Ok(match directive {
            Directive::Cruise => RED_LIGHT_CRUISE.command(0.0, speed),
            Directive::Takeover {
                since,
                initial_speed,
            } => RED_LIGHT_STOP.command(0.0, speed, initial_speed, since),
        })
    }

    fn resolution(&self) -> Resolution {
        match self.event.phase() {
            Phase::Acknowledged => Resolution::UserCancelled,
            Phase::Takeover => Resolution::AiTakeover,
            _ => Resolution::Driver(self.driver_class),
        }
    }

    fn critical_phase(&self) -> Option<Phase> {
        Some(self.event.phase())
    }
}

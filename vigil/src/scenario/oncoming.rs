// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use super::{Effects, Resolution, ScenarioHandler, TickInput};
use crate::command::ControlCommand;
use crate::configuration::profiles::ONCOMING;
use crate::encounter::Encounter;
use crate::error::{Error, Result};
use crate::world::World;
use tracing::instrument;

/// Oncoming vehicle drifting into the ego lane
#[derive(Debug)]
pub struct OncomingHandler {
    encounter: Encounter,
}

impl OncomingHandler {
    pub fn new() -> Self {
        Self {
            encounter: Encounter::new(ONCOMING),
        }
    }
}

impl Default for OncomingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioHandler for OncomingHandler {
    #[instrument(name = "oncoming", level = "trace", skip_all)]
    fn step(
        &mut self,
        input: &TickInput,
        world: &mut dyn World,
        effects: &mut Effects,
    ) -> Result<ControlCommand> {
        let oncoming = world
            .oncoming_location()
            .ok_or_else(|| Error::Environment("no oncoming actor in the world".into()))?;
        let commands = self.encounter.step(
            input.elapsed,
            &input.telemetry,
            &oncoming,
            &mut effects.requests,
        );
        effects.npc_command = commands.npc;
        Ok(commands.ego)
    }

    fn resolution(&self) -> Resolution {
        Resolution::Unresolved
    }
}

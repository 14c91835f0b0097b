// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use super::{Effects, Resolution, ScenarioHandler, TickInput};
use crate::command::ControlCommand;
use crate::configuration::profiles::{BARRIER_SCRIPT, URBAN_CRUISE, WRONG_LANE_SCRIPT};
use crate::error::Result;
use crate::scripted::ScriptedTrajectory;
use crate::world::World;
use tracing::instrument;

/// Plays a fixed script independent of the driver
#[derive(Debug)]
pub struct ScriptedHandler {
    trajectory: ScriptedTrajectory,
}

impl ScriptedHandler {
    pub fn barrier() -> Self {
        Self {
            trajectory: ScriptedTrajectory::new(&BARRIER_SCRIPT, URBAN_CRUISE),
        }
    }

    pub fn wrong_lane() -> Self {
        Self {
            trajectory: ScriptedTrajectory::new(&WRONG_LANE_SCRIPT, URBAN_CRUISE),
        }
    }
}

impl ScenarioHandler for ScriptedHandler {
    #[instrument(name = "scripted", level = "trace", skip_all)]
    fn step(
        &mut self,
        input: &TickInput,
        _world: &mut dyn World,
        effects: &mut Effects,
    ) -> Result<ControlCommand> {
        Ok(self.trajectory.step(
            input.elapsed,
            input.telemetry.speed_kmh(),
            &mut effects.requests,
        ))
    }

    fn resolution(&self) -> Resolution {
        Resolution::Unresolved
    }
}

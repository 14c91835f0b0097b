// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Scenario catalogue and per-tick dispatch
//!
//! A [`Dispatcher`] is created for one scenario id and then driven once per tick.
//! Unknown ids are rejected before any controller state exists.

mod drowsiness;
mod oncoming;
mod red_light;
mod scripted;

use crate::annunciator::{CueLedger, Request};
use crate::command::{ControlCommand, DriverClass};
use crate::configuration::session::SessionConfig;
use crate::critical::Phase;
use crate::error::{Error, Result};
use crate::lane_pursuit::LaneTarget;
use crate::world::{Telemetry, World};
#[cfg(feature = "recording")]
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::instrument;
use vigil_log::{debug, info, warn};
use vigil_time::Duration;

pub use drowsiness::{DrowsinessHandler, Terrain};
pub use oncoming::OncomingHandler;
pub use red_light::RedLightHandler;
pub use scripted::ScriptedHandler;

/// Scenario identifier
#[cfg_attr(feature = "recording", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScenarioId(u8);

impl ScenarioId {
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scenario{}", self.0)
    }
}

impl From<u8> for ScenarioId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

/// Final outcome of a run
#[cfg_attr(feature = "recording", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// The scenario does not resolve to a state
    Unresolved,
    /// Nothing happened beyond the driver's classification
    Driver(DriverClass),
    CriticalAiTakeover,
    CriticalUserCancelled,
    AiTakeover,
    UserCancelled,
}

impl Resolution {
    /// Suffix of the output folder, if the scenario resolves to a state
    pub fn folder_suffix(&self) -> Option<String> {
        match self {
            Resolution::Unresolved => None,
            Resolution::Driver(class) => Some(class.folder_label()),
            resolution => Some(resolution.to_string()),
        }
    }
}

impl Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Unresolved => f.write_str("unresolved"),
            Resolution::Driver(class) => write!(f, "{class}"),
            Resolution::CriticalAiTakeover => f.write_str("critical_ai_takeover"),
            Resolution::CriticalUserCancelled => f.write_str("critical_user_cancelled"),
            Resolution::AiTakeover => f.write_str("ai_takeover"),
            Resolution::UserCancelled => f.write_str("user_cancelled"),
        }
    }
}

/// Inputs of one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Elapsed scenario time
    pub elapsed: Duration,
    /// Driver acknowledgment observed during this tick
    pub driver_ack: bool,
    pub telemetry: Telemetry,
}

/// Side outputs of a handler step, as data
#[derive(Debug, Default)]
pub struct Effects {
    pub requests: Vec<Request>,
    pub npc_command: Option<ControlCommand>,
}

/// Outputs of one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutput {
    pub command: ControlCommand,
    pub npc_command: Option<ControlCommand>,
    pub requests: Vec<Request>,
    pub resolution: Resolution,
}

/// Per-scenario control logic
pub trait ScenarioHandler {
    /// Compute the command of one tick
    fn step(
        &mut self,
        input: &TickInput,
        world: &mut dyn World,
        effects: &mut Effects,
    ) -> Result<ControlCommand>;

    /// Resolution reached so far
    fn resolution(&self) -> Resolution;

    /// Phase of the critical event, for handlers running one
    fn critical_phase(&self) -> Option<Phase> {
        None
    }

    /// Steering target of the latest tick, for handlers pulling over
    fn lane_target(&self) -> Option<LaneTarget> {
        None
    }
}

/// Handler of one scenario
#[derive(Debug)]
pub enum Handler {
    Drowsiness(DrowsinessHandler),
    RedLight(RedLightHandler),
    Scripted(ScriptedHandler),
    Oncoming(OncomingHandler),
}

impl Handler {
    fn as_handler(&self) -> &dyn ScenarioHandler {
        match self {
            Handler::Drowsiness(handler) => handler,
            Handler::RedLight(handler) => handler,
            Handler::Scripted(handler) => handler,
            Handler::Oncoming(handler) => handler,
        }
    }

    fn as_handler_mut(&mut self) -> &mut dyn ScenarioHandler {
        match self {
            Handler::Drowsiness(handler) => handler,
            Handler::RedLight(handler) => handler,
            Handler::Scripted(handler) => handler,
            Handler::Oncoming(handler) => handler,
        }
    }
}

/// Catalogue entry of a scenario
#[derive(Debug)]
pub struct ScenarioEntry {
    pub id: ScenarioId,
    pub title: &'static str,
    pub default_town: &'static str,
    build: fn(DriverClass) -> Handler,
}

impl ScenarioEntry {
    /// Build a fresh handler for `driver_class`
    pub fn build(&self, driver_class: DriverClass) -> Handler {
        (self.build)(driver_class)
    }
}

pub static CATALOGUE: [ScenarioEntry; 6] = [
    ScenarioEntry {
        id: ScenarioId(1),
        title: "Urban Driving with Drowsiness Reactions",
        default_town: "Town01",
        build: |class| Handler::Drowsiness(DrowsinessHandler::new(Terrain::Urban, class)),
    },
    ScenarioEntry {
        id: ScenarioId(2),
        title: "Highway Driving with Drowsiness Reactions",
        default_town: "Town04",
        build: |class| Handler::Drowsiness(DrowsinessHandler::new(Terrain::Highway, class)),
    },
    ScenarioEntry {
        id: ScenarioId(3),
        title: "Approaching Barrier on Urban Street",
        default_town: "Town01",
        build: |_| Handler::Scripted(ScriptedHandler::barrier()),
    },
    ScenarioEntry {
        id: ScenarioId(4),
        title: "Switching into Wrong Lane on Two Way Road",
        default_town: "Town05",
        build: |_| Handler::Scripted(ScriptedHandler::wrong_lane()),
    },
    ScenarioEntry {
        id: ScenarioId(5),
        title: "Driver Unresponsive at Red Light",
        default_town: "Town05",
        build: |class| Handler::RedLight(RedLightHandler::new(class)),
    },
    ScenarioEntry {
        id: ScenarioId(6),
        title: "Oncoming Vehicle Approaching",
        default_town: "Town04",
        build: |_| Handler::Oncoming(OncomingHandler::new()),
    },
];

/// Catalogue entry of `id`
pub fn lookup(id: ScenarioId) -> Result<&'static ScenarioEntry> {
    CATALOGUE
        .iter()
        .find(|entry| entry.id == id)
        .ok_or_else(|| Error::Configuration(format!("unknown scenario id {}", id.value())))
}

/// Routes ticks to the handler of one scenario
#[derive(Debug)]
pub struct Dispatcher {
    entry: &'static ScenarioEntry,
    handler: Handler,
    ledger: CueLedger,
    last_elapsed: Option<Duration>,
}

impl Dispatcher {
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let entry = lookup(config.scenario_id)?;
        info!(
            "{} \"{}\" in {} for a driver classified {}",
            entry.id, entry.title, config.town, config.driver_class
        );
        Ok(Self {
            entry,
            handler: entry.build(config.driver_class),
            ledger: CueLedger::default(),
            last_elapsed: None,
        })
    }

    pub fn scenario(&self) -> &'static ScenarioEntry {
        self.entry
    }

    /// Run one tick
    #[instrument(name = "tick", level = "debug", skip_all, fields(scenario = %self.entry.id))]
    pub fn tick(&mut self, input: TickInput, world: &mut dyn World) -> Result<TickOutput> {
        let mut input = input;
        if let Some(last) = self.last_elapsed {
            if input.elapsed < last {
                warn!("Elapsed time went backwards from {last:?} to {:?}", input.elapsed);
                input.elapsed = last;
            }
        }
        self.last_elapsed = Some(input.elapsed);

        let mut effects = Effects::default();
        let command = self
            .handler
            .as_handler_mut()
            .step(&input, world, &mut effects)?;

        for request in &effects.requests {
            self.ledger.record(request);
        }
        let resolution = self.resolution();
        debug!("{command}, {resolution}");

        Ok(TickOutput {
            command,
            npc_command: effects.npc_command,
            requests: effects.requests,
            resolution,
        })
    }

    pub fn resolution(&self) -> Resolution {
        self.handler.as_handler().resolution()
    }

    pub fn critical_phase(&self) -> Option<Phase> {
        self.handler.as_handler().critical_phase()
    }

    pub fn lane_target(&self) -> Option<LaneTarget> {
        self.handler.as_handler().lane_target()
    }

    /// Stop every sustained cue and switch lights off. A second call returns nothing.
    pub fn finish(&mut self) -> Vec<Request> {
        let requests = self.ledger.teardown();
        if !requests.is_empty() {
            info!("Tearing down {} annunciator request(s)", requests.len());
        }
        requests
    }
}

#[cfg(test)]
mod test {
    use super::{lookup, Resolution, ScenarioId, CATALOGUE};
    use crate::command::DriverClass;
    use crate::error::Error;

    #[test]
    fn catalogue_ids_are_unique_and_sequential() {
        for (index, entry) in CATALOGUE.iter().enumerate() {
            assert_eq!(entry.id.value() as usize, index + 1);
        }
    }

    #[test]
    fn unknown_scenario_is_a_configuration_error() {
        assert!(matches!(
            lookup(ScenarioId::new(7)),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            lookup(ScenarioId::new(0)),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn resolution_tags_and_folder_suffixes() {
        assert_eq!(Resolution::Unresolved.folder_suffix(), None);
        assert_eq!(
            Resolution::Driver(DriverClass::VeryDrowsy).folder_suffix(),
            Some("very_drowsy".to_string())
        );
        assert_eq!(
            Resolution::CriticalUserCancelled.folder_suffix(),
            Some("critical_user_cancelled".to_string())
        );
        assert_eq!(Resolution::AiTakeover.to_string(), "ai_takeover");
        assert_eq!(ScenarioId::new(5).to_string(), "Scenario5");
    }
}

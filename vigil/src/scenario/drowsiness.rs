// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Drowsiness reactions on urban streets and highways

use super::{Effects, Resolution, ScenarioHandler, TickInput};
use crate::alert::PeriodicAlert;
use crate::annunciator::Cue;
use crate::command::{ControlCommand, CruiseLaw, DriverClass};
use crate::configuration::profiles::{
    DROWSINESS_CRITICAL, HIGHWAY_CRUISE, HIGHWAY_PURSUIT, URBAN_CRUISE, URBAN_TAKEOVER,
    VERY_DROWSY_HOLD,
};
use crate::critical::{CriticalEvent, Directive, Phase};
use crate::decel::DecelProfile;
use crate::error::Result;
use crate::lane_pursuit::{LanePursuit, LaneTarget};
use crate::world::World;
use tracing::instrument;
use vigil_log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terrain {
    Urban,
    Highway,
}

/// How the vehicle slows down once the driver failed to respond
#[derive(Debug)]
enum Takeover {
    /// Straight ahead along a deceleration curve
    Curve(DecelProfile),
    /// Pull over into the rightmost lane. Engaged on the first takeover tick.
    Pursuit(Option<LanePursuit>),
}

#[derive(Debug)]
enum Reaction {
    Attentive,
    Periodic(PeriodicAlert),
    Critical {
        event: CriticalEvent,
        takeover: Takeover,
    },
}

/// Reacts to the driver's classification while cruising
#[derive(Debug)]
pub struct DrowsinessHandler {
    terrain: Terrain,
    driver_class: DriverClass,
    cruise: CruiseLaw,
    reaction: Reaction,
    lane_target: Option<LaneTarget>,
}

impl DrowsinessHandler {
    pub fn new(terrain: Terrain, driver_class: DriverClass) -> Self {
        let cruise = match terrain {
            Terrain::Urban => URBAN_CRUISE,
            Terrain::Highway => HIGHWAY_CRUISE,
        };
        let reaction = match driver_class {
            DriverClass::Alert => Reaction::Attentive,
            DriverClass::SlightlyDrowsy => {
                Reaction::Periodic(PeriodicAlert::one_shot(Cue::SoftBeep))
            }
            DriverClass::VeryDrowsy => {
                Reaction::Periodic(PeriodicAlert::held(Cue::HeavyBeep, VERY_DROWSY_HOLD))
            }
            DriverClass::Critical => Reaction::Critical {
                event: CriticalEvent::new(DROWSINESS_CRITICAL),
                takeover: match terrain {
                    Terrain::Urban => Takeover::Curve(URBAN_TAKEOVER),
                    Terrain::Highway => Takeover::Pursuit(None),
                },
            },
        };
        Self {
            terrain,
            driver_class,
            cruise,
            reaction,
            lane_target: None,
        }
    }

    pub fn terrain(&self) -> Terrain {
        self.terrain
    }
}

impl ScenarioHandler for DrowsinessHandler {
    #[instrument(name = "drowsiness", level = "trace", skip_all)]
    fn step(
        &mut self,
        input: &TickInput,
        world: &mut dyn World,
        effects: &mut Effects,
    ) -> Result<ControlCommand> {
        let t = input.elapsed;
        let speed = input.telemetry.speed_kmh();

        let (event, takeover) = match &mut self.reaction {
            Reaction::Attentive => return Ok(self.cruise.command(0.0, speed)),
            Reaction::Periodic(alert) => {
                alert.poll(t, &mut effects.requests);
                return Ok(self.cruise.command(0.0, speed));
            }
            Reaction::Critical { event, takeover } => (event, takeover),
        };

        match event.advance(t, input.driver_ack, speed, &mut effects.requests) {
            Directive::Cruise => Ok(self.cruise.command(0.0, speed)),
            Directive::Takeover {
                since,
                initial_speed,
            } => match takeover {
                Takeover::Curve(profile) => Ok(profile.command(0.0, speed, initial_speed, since)),
                Takeover::Pursuit(slot) => {
                    let pursuit = match slot.take() {
                        Some(pursuit) => pursuit,
                        None => LanePursuit::engage(
                            &*world,
                            &input.telemetry,
                            initial_speed,
                            HIGHWAY_PURSUIT,
                        )?,
                    };
                    let pursuit = slot.insert(pursuit);
                    let (command, target) = pursuit.step(&*world, &input.telemetry, since)?;
                    let was_centered = self
                        .lane_target
                        .is_some_and(|last| last.gain == HIGHWAY_PURSUIT.hold_gain);
                    if target.gain == HIGHWAY_PURSUIT.hold_gain && !was_centered {
                        info!(
                            "Centered in lane {} at {:.1} km/h",
                            target.target_lane_id, speed
                        );
                    }
                    self.lane_target = Some(target);
                    Ok(command)
                }
            },
        }
    }

    fn resolution(&self) -> Resolution {
        match self.critical_phase() {
            None | Some(Phase::Normal | Phase::PreWarning) => {
                Resolution::Driver(self.driver_class)
            }
            Some(Phase::WarningActive | Phase::Takeover) => Resolution::CriticalAiTakeover,
            Some(Phase::Acknowledged) => Resolution::CriticalUserCancelled,
        }
    }

    fn critical_phase(&self) -> Option<Phase> {
        match &self.reaction {
            Reaction::Critical { event, .. } => Some(event.phase()),
            _ => None,
        }
    }

    fn lane_target(&self) -> Option<LaneTarget> {
        self.lane_target
    }
}

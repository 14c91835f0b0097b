// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Oncoming traffic encounter
//!
//! Triggered by the distance between the ego vehicle and the oncoming actor. Each
//! threshold fires once: the warning first, then the drift of the oncoming actor into
//! the ego lane, then a short evasive maneuver followed by a return to the lane center.
//!
//! ```text
//! Cruise ──(d < evade)──▶ Evade ──(1s)──▶ Return ──(1s)──▶ Recovered
//! ```

use crate::annunciator::{Cue, LightState, Narration, Request};
use crate::command::{ControlCommand, CruiseLaw};
use crate::world::{Location, Telemetry};
use vigil_log::{debug, info, warn};
use vigil_time::Duration;

/// Steering and throttle held for a fixed time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Maneuver {
    pub steer: f64,
    pub throttle: f64,
    pub duration: Duration,
}

/// Encounter tuning. Distances in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncounterProfile {
    pub warning_distance: f64,
    pub drift_distance: f64,
    pub evade_distance: f64,
    pub npc_steer: f64,
    pub npc_throttle: f64,
    pub evade: Maneuver,
    pub recover: Maneuver,
    /// Scenario time after which a recovered vehicle switches from alarm to flasher
    pub flasher_after: Duration,
    /// Scenario time after which a recovered vehicle clears all signaling
    pub clear_after: Duration,
    pub cruise: CruiseLaw,
}

/// Ego maneuver phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ManeuverPhase {
    Cruise,
    Evade { since: Duration },
    Return { since: Duration },
    Recovered,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncounterState {
    pub npc_drift_active: bool,
    pub warning_issued: bool,
    pub maneuver: ManeuverPhase,
    pub flasher_active: bool,
    pub signals_cleared: bool,
}

impl Default for EncounterState {
    fn default() -> Self {
        Self {
            npc_drift_active: false,
            warning_issued: false,
            maneuver: ManeuverPhase::Cruise,
            flasher_active: false,
            signals_cleared: false,
        }
    }
}

/// Commands of one encounter tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncounterCommands {
    pub ego: ControlCommand,
    /// Command for the oncoming actor, once it drifts
    pub npc: Option<ControlCommand>,
}

/// Oncoming traffic encounter controller
#[derive(Debug)]
pub struct Encounter {
    profile: EncounterProfile,
    state: EncounterState,
}

impl Encounter {
    pub fn new(profile: EncounterProfile) -> Self {
        Self {
            profile,
            state: EncounterState::default(),
        }
    }

    pub fn state(&self) -> &EncounterState {
        &self.state
    }

    pub fn step(
        &mut self,
        t: Duration,
        telemetry: &Telemetry,
        oncoming: &Location,
        requests: &mut Vec<Request>,
    ) -> EncounterCommands {
        let distance = telemetry.location.distance(oncoming);
        let speed = telemetry.speed_kmh();
        let profile = self.profile;
        debug!("t = {:.2}s, oncoming at {distance:.1}m", t.as_secs_f64());

        if distance < profile.drift_distance && !self.state.npc_drift_active {
            self.state.npc_drift_active = true;
            info!("Oncoming actor drifting into the ego lane at {distance:.1}m");
        }
        let npc = self
            .state
            .npc_drift_active
            .then(|| ControlCommand::drive(profile.npc_steer, profile.npc_throttle, 0.0));

        if distance < profile.warning_distance && !self.state.warning_issued {
            self.state.warning_issued = true;
            requests.push(Request::Play(Cue::Narration(Narration::Oncoming)));
            requests.push(Request::Loop(Cue::HeavyBeep));
            requests.push(Request::Lights(LightState::RightBlinker));
            warn!("Oncoming traffic detected at {distance:.1}m");
        }

        if distance < profile.evade_distance && self.state.maneuver == ManeuverPhase::Cruise {
            self.state.maneuver = ManeuverPhase::Evade { since: t };
            info!("Evasive maneuver at t = {:.2}s, {distance:.1}m", t.as_secs_f64());
        }

        if let ManeuverPhase::Evade { since } = self.state.maneuver {
            if t.saturating_sub(since) < profile.evade.duration {
                return EncounterCommands {
                    ego: ControlCommand::drive(profile.evade.steer, profile.evade.throttle, speed),
                    npc,
                };
            }
            self.state.maneuver = ManeuverPhase::Return { since: t };
            info!("Returning to lane center at t = {:.2}s", t.as_secs_f64());
        }

        if let ManeuverPhase::Return { since } = self.state.maneuver {
            if t.saturating_sub(since) < profile.recover.duration {
                return EncounterCommands {
                    ego: ControlCommand::drive(
                        profile.recover.steer,
                        profile.recover.throttle,
                        speed,
                    ),
                    npc,
                };
            }
            self.state.maneuver = ManeuverPhase::Recovered;
            info!("Recovered at t = {:.2}s", t.as_secs_f64());
        }

        if self.state.maneuver == ManeuverPhase::Recovered {
            self.sign_off(t, requests);
        }

        EncounterCommands {
            ego: profile.cruise.command(0.0, speed),
            npc,
        }
    }

    /// Replace the alarm by the flasher, then clear all signaling
    fn sign_off(&mut self, t: Duration, requests: &mut Vec<Request>) {
        if t > self.profile.flasher_after && !self.state.flasher_active {
            self.state.flasher_active = true;
            requests.push(Request::Stop(Cue::HeavyBeep));
            requests.push(Request::Loop(Cue::Flasher));
        }
        if t > self.profile.clear_after && !self.state.signals_cleared {
            self.state.signals_cleared = true;
            requests.push(Request::Lights(LightState::Off));
            requests.push(Request::Stop(Cue::Flasher));
            info!("Encounter signaling cleared at t = {:.2}s", t.as_secs_f64());
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Encounter, ManeuverPhase};
    use crate::annunciator::{Cue, LightState, Narration, Request};
    use crate::configuration::profiles::ONCOMING;
    use crate::world::{Location, Telemetry, Vector3};
    use vigil_time::Duration;

    fn ego() -> Telemetry {
        Telemetry {
            velocity: Vector3::new(20.0, 0.0, 0.0),
            ..Default::default()
        }
    }

    #[test]
    fn thresholds_fire_once_in_order() {
        let mut encounter = Encounter::new(ONCOMING);
        let mut requests = vec![];

        let far = encounter.step(
            Duration::from_secs(1),
            &ego(),
            &Location::new(60.0, 0.0, 0.0),
            &mut requests,
        );
        assert!(far.npc.is_none());
        assert!(requests.is_empty());

        encounter.step(
            Duration::from_secs(2),
            &ego(),
            &Location::new(49.0, 0.0, 0.0),
            &mut requests,
        );
        assert_eq!(
            requests,
            vec![
                Request::Play(Cue::Narration(Narration::Oncoming)),
                Request::Loop(Cue::HeavyBeep),
                Request::Lights(LightState::RightBlinker),
            ]
        );
        assert!(!encounter.state().npc_drift_active);

        requests.clear();
        let drifting = encounter.step(
            Duration::from_secs(3),
            &ego(),
            &Location::new(39.0, 0.0, 0.0),
            &mut requests,
        );
        assert!(requests.is_empty());
        let npc = drifting.npc.unwrap();
        assert_eq!(npc.steer, -0.0135);
        assert_eq!(npc.throttle, 0.5);
    }

    #[test]
    fn evade_and_return_do_not_overlap() {
        let mut encounter = Encounter::new(ONCOMING);
        let mut requests = vec![];
        let oncoming = Location::new(24.0, 0.0, 0.0);

        let mut steer = vec![];
        for ms in (5000..=7500).step_by(500) {
            let commands =
                encounter.step(Duration::from_millis(ms), &ego(), &oncoming, &mut requests);
            steer.push((ms, commands.ego.steer));
        }
        assert_eq!(
            steer,
            vec![
                (5000, 0.012),
                (5500, 0.012),
                (6000, -0.0017),
                (6500, -0.0017),
                (7000, 0.0),
                (7500, 0.0),
            ]
        );
        assert_eq!(encounter.state().maneuver, ManeuverPhase::Recovered);
        assert!(encounter.state().flasher_active);
        assert!(requests.contains(&Request::Loop(Cue::Flasher)));
    }

    #[test]
    fn signaling_clears_after_recovery() {
        let mut encounter = Encounter::new(ONCOMING);
        let mut requests = vec![];
        let oncoming = Location::new(10.0, 0.0, 0.0);
        for s in [14, 15, 16, 17] {
            encounter.step(Duration::from_secs(s), &ego(), &oncoming, &mut requests);
        }
        assert!(encounter.state().signals_cleared);
        assert_eq!(
            &requests[requests.len() - 2..],
            &[Request::Lights(LightState::Off), Request::Stop(Cue::Flasher)]
        );
    }
}

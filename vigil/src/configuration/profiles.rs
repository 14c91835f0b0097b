// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Tuning of the scenario controllers

use crate::annunciator::{Cue, LightState, Narration, Request};
use crate::command::CruiseLaw;
use crate::critical::{AckPolicy, CriticalProfile};
use crate::decel::{Creep, DecayLaw, DecelProfile};
use crate::encounter::{EncounterProfile, Maneuver};
use crate::lane_pursuit::PursuitProfile;
use crate::scripted::{Action, Script, Window};
use vigil_time::Duration;

/// Brake applied at or above a cruise ceiling
const CRUISE_BRAKE: f64 = 0.2;

pub const URBAN_CRUISE: CruiseLaw = CruiseLaw {
    ceiling: 30.0,
    throttle: 0.45,
    brake: CRUISE_BRAKE,
};

pub const HIGHWAY_CRUISE: CruiseLaw = CruiseLaw {
    ceiling: 90.0,
    throttle: 0.55,
    brake: CRUISE_BRAKE,
};

pub const RED_LIGHT_CRUISE: CruiseLaw = CruiseLaw {
    ceiling: 40.0,
    throttle: 0.60,
    brake: CRUISE_BRAKE,
};

/// Critical drowsiness on urban streets and highways
pub const DROWSINESS_CRITICAL: CriticalProfile = CriticalProfile {
    warn_delay: Duration::from_secs(5),
    ack_window: Duration::from_secs(3),
    alert: Cue::HeavyBeep,
    ack_lights: LightState::Off,
    on_ack: AckPolicy::Resume,
};

pub const RED_LIGHT_CRITICAL: CriticalProfile = CriticalProfile {
    warn_delay: Duration::from_millis(9500),
    ack_window: Duration::from_secs(2),
    alert: Cue::HeavyBeep,
    ack_lights: LightState::RightBlinker,
    on_ack: AckPolicy::StopAfterWindow,
};

/// The red light narration plays once past this time, if the warning has not started yet
pub const RED_LIGHT_NARRATION_AFTER: Duration = Duration::from_secs(8);

/// Time a very drowsy alert is sustained before it is stopped
pub const VERY_DROWSY_HOLD: Duration = Duration::from_secs(3);

pub const URBAN_TAKEOVER: DecelProfile = DecelProfile {
    law: DecayLaw::Linear,
    duration: Duration::from_secs(5),
    max_brake: 1.0,
    creep: Creep::Throttle(0.05),
};

/// Holds the vehicle once stopped
pub const RED_LIGHT_STOP: DecelProfile = DecelProfile {
    law: DecayLaw::Proportional,
    duration: Duration::from_secs(2),
    max_brake: 0.4,
    creep: Creep::Brake(0.4),
};

pub const HIGHWAY_PURSUIT: PursuitProfile = PursuitProfile {
    centered_tolerance: 0.5,
    settled_tolerance: 0.3,
    hold_gain: 0.2,
    correct_gain: 0.6,
    merge_gain: 0.4,
    hold_lookahead: 10.0,
    merge_lookahead: 12.0,
    settled_horizon: Duration::from_secs(6),
    merge_horizon: Duration::from_secs(10),
    steer_limit: 0.5,
    speed_band: 2.0,
    brake_scale: 50.0,
    catch_up_throttle: 0.2,
    hold_throttle: 0.1,
};

/// Drift towards a barrier on the right and the corrective steering
pub const BARRIER_SCRIPT: Script = Script {
    name: "barrier",
    windows: &[
        Window {
            start: Duration::ZERO,
            steer: 0.0,
            actions: &[],
        },
        Window {
            start: Duration::from_secs(5),
            steer: 0.03,
            actions: &[Action {
                at: Duration::from_millis(5300),
                request: Request::Play(Cue::Narration(Narration::Barrier)),
            }],
        },
        Window {
            start: Duration::from_millis(6300),
            steer: -0.034,
            actions: &[Action {
                at: Duration::from_millis(6300),
                request: Request::Hold(Cue::HeavyBeep),
            }],
        },
        Window {
            start: Duration::from_millis(7500),
            steer: 0.0,
            actions: &[],
        },
        Window {
            start: Duration::from_millis(8300),
            steer: 0.0,
            actions: &[Action {
                at: Duration::from_millis(8300),
                request: Request::Stop(Cue::HeavyBeep),
            }],
        },
    ],
};

/// Drift into the opposing lane of a two-way street and the correction
pub const WRONG_LANE_SCRIPT: Script = Script {
    name: "wrong lane",
    windows: &[
        Window {
            start: Duration::ZERO,
            steer: 0.0,
            actions: &[Action {
                at: Duration::ZERO,
                request: Request::Lights(LightState::Off),
            }],
        },
        Window {
            start: Duration::from_secs(5),
            steer: -0.015,
            actions: &[
                Action {
                    at: Duration::from_secs(5),
                    request: Request::Play(Cue::Narration(Narration::WrongLane)),
                },
                Action {
                    at: Duration::from_secs(5),
                    request: Request::Lights(LightState::Hazard),
                },
                Action {
                    at: Duration::from_secs(6),
                    request: Request::Loop(Cue::HeavyBeep),
                },
            ],
        },
        Window {
            start: Duration::from_secs(7),
            steer: 0.0205,
            actions: &[],
        },
        Window {
            start: Duration::from_secs(9),
            steer: -0.0025,
            actions: &[
                Action {
                    at: Duration::from_secs(9),
                    request: Request::Stop(Cue::HeavyBeep),
                },
                Action {
                    at: Duration::from_secs(9),
                    request: Request::Loop(Cue::Flasher),
                },
                Action {
                    at: Duration::from_secs(9),
                    request: Request::Lights(LightState::Hazard),
                },
            ],
        },
        Window {
            start: Duration::from_secs(14),
            steer: 0.0,
            actions: &[
                Action {
                    at: Duration::from_secs(14),
                    request: Request::Stop(Cue::Flasher),
                },
                Action {
                    at: Duration::from_secs(14),
                    request: Request::Lights(LightState::Off),
                },
            ],
        },
    ],
};

pub const ONCOMING: EncounterProfile = EncounterProfile {
    warning_distance: 50.0,
    drift_distance: 40.0,
    evade_distance: 25.0,
    npc_steer: -0.0135,
    npc_throttle: 0.5,
    evade: Maneuver {
        steer: 0.012,
        throttle: 0.40,
        duration: Duration::from_secs(1),
    },
    recover: Maneuver {
        steer: -0.0017,
        throttle: 0.45,
        duration: Duration::from_secs(1),
    },
    flasher_after: Duration::from_secs(4),
    clear_after: Duration::from_secs(15),
    cruise: CruiseLaw {
        ceiling: 90.0,
        throttle: 0.55,
        brake: 0.0,
    },
};

#[cfg(test)]
mod test {
    use super::{BARRIER_SCRIPT, WRONG_LANE_SCRIPT};

    #[test]
    fn script_windows_are_ordered() {
        for script in [BARRIER_SCRIPT, WRONG_LANE_SCRIPT] {
            assert!(script.windows[0].start.is_zero());
            for pair in script.windows.windows(2) {
                assert!(pair[0].start < pair[1].start, "{}", script.name);
            }
            for window in script.windows {
                assert!(window.actions.iter().all(|a| a.at >= window.start));
            }
        }
    }
}

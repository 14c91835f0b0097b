// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Open loop, time segmented steering scripts

use crate::annunciator::Request;
use crate::command::{ControlCommand, CruiseLaw};
use vigil_log::{debug, info};
use vigil_time::Duration;

/// Annunciator request fired once when its window is active and `at` has passed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Action {
    pub at: Duration,
    pub request: Request,
}

/// Time window with constant steering. A window ends where the next one starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: Duration,
    pub steer: f64,
    pub actions: &'static [Action],
}

/// Named sequence of windows, ordered by start time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Script {
    pub name: &'static str,
    pub windows: &'static [Window],
}

impl Script {
    /// Index of the window containing `t`
    fn window_at(&self, t: Duration) -> Option<usize> {
        self.windows.iter().rposition(|window| window.start <= t)
    }
}

/// Plays a [`Script`] against elapsed time
#[derive(Debug)]
pub struct ScriptedTrajectory {
    script: &'static Script,
    cruise: CruiseLaw,
    current: Option<usize>,
    fired: Vec<Vec<bool>>,
}

impl ScriptedTrajectory {
    pub fn new(script: &'static Script, cruise: CruiseLaw) -> Self {
        let fired = script
            .windows
            .iter()
            .map(|window| vec![false; window.actions.len()])
            .collect();
        Self {
            script,
            cruise,
            current: None,
            fired,
        }
    }

    /// Index of the active window, if the script started
    pub fn current_window(&self) -> Option<usize> {
        self.current
    }

    pub fn step(
        &mut self,
        t: Duration,
        speed: f64,
        requests: &mut Vec<Request>,
    ) -> ControlCommand {
        let Some(found) = self.script.window_at(t) else {
            return self.cruise.command(0.0, speed);
        };

        // Windows are only ever entered moving forward
        let index = match self.current {
            Some(current) if current > found => {
                debug!("{}: ignoring t = {t:?} behind window {current}", self.script.name);
                current
            }
            Some(current) if current == found => current,
            _ => {
                info!(
                    "{}: window {found} from t = {:.1}s",
                    self.script.name,
                    self.script.windows[found].start.as_secs_f64()
                );
                self.current = Some(found);
                found
            }
        };

        let window = &self.script.windows[index];
        for (action, fired) in window.actions.iter().zip(self.fired[index].iter_mut()) {
            if !*fired && t >= action.at {
                *fired = true;
                requests.push(action.request);
            }
        }

        self.cruise.command(window.steer, speed)
    }
}

#[cfg(test)]
mod test {
    use super::ScriptedTrajectory;
    use crate::annunciator::{Cue, LightState, Narration, Request};
    use crate::configuration::profiles::{BARRIER_SCRIPT, URBAN_CRUISE, WRONG_LANE_SCRIPT};
    use vigil_time::Duration;

    fn play(trajectory: &mut ScriptedTrajectory, until_ms: u64) -> Vec<(u64, f64, Request)> {
        let mut log = vec![];
        for ms in (0..=until_ms).step_by(100) {
            let mut requests = vec![];
            let command = trajectory.step(Duration::from_millis(ms), 20.0, &mut requests);
            log.extend(requests.into_iter().map(|r| (ms, command.steer, r)));
        }
        log
    }

    #[test]
    fn barrier_script_fires_each_action_once() {
        let mut trajectory = ScriptedTrajectory::new(&BARRIER_SCRIPT, URBAN_CRUISE);
        let log = play(&mut trajectory, 12_000);
        assert_eq!(
            log,
            vec![
                (5300, 0.03, Request::Play(Cue::Narration(Narration::Barrier))),
                (6300, -0.034, Request::Hold(Cue::HeavyBeep)),
                (8300, 0.0, Request::Stop(Cue::HeavyBeep)),
            ]
        );
    }

    #[test]
    fn wrong_lane_steering_follows_windows() {
        let mut trajectory = ScriptedTrajectory::new(&WRONG_LANE_SCRIPT, URBAN_CRUISE);
        let mut requests = vec![];
        let steer_at = |trajectory: &mut ScriptedTrajectory, ms, requests: &mut Vec<Request>| {
            trajectory.step(Duration::from_millis(ms), 20.0, requests).steer
        };
        assert_eq!(steer_at(&mut trajectory, 0, &mut requests), 0.0);
        assert_eq!(steer_at(&mut trajectory, 5000, &mut requests), -0.015);
        assert_eq!(steer_at(&mut trajectory, 7000, &mut requests), 0.0205);
        assert_eq!(steer_at(&mut trajectory, 9000, &mut requests), -0.0025);
        // A late tick does not re-enter an earlier window
        assert_eq!(steer_at(&mut trajectory, 8000, &mut requests), -0.0025);
        assert_eq!(steer_at(&mut trajectory, 14_000, &mut requests), 0.0);
        assert_eq!(requests.last(), Some(&Request::Lights(LightState::Off)));
        assert!(!requests.contains(&Request::Loop(Cue::HeavyBeep)));
    }

    #[test]
    fn cruise_law_applies_inside_windows() {
        let mut trajectory = ScriptedTrajectory::new(&WRONG_LANE_SCRIPT, URBAN_CRUISE);
        let mut requests = vec![];
        let fast = trajectory.step(Duration::from_secs(1), 35.0, &mut requests);
        assert_eq!(fast.throttle, 0.0);
        assert_eq!(fast.brake, URBAN_CRUISE.brake);
    }
}

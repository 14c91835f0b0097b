// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Speed targets and commands for takeover braking

use crate::command::ControlCommand;
use vigil_time::Duration;

/// Initial speeds below this are treated as standing still
const STANDSTILL: f64 = 1e-6;

/// Shape of the speed target over the horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayLaw {
    /// `initial - (initial / duration) * elapsed`
    Linear,
    /// `initial * (1 - elapsed / duration)`
    Proportional,
}

/// Action taken when the vehicle is at or below the target
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Creep {
    Throttle(f64),
    Brake(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecelProfile {
    pub law: DecayLaw,
    pub duration: Duration,
    pub max_brake: f64,
    pub creep: Creep,
}

impl DecelProfile {
    /// Speed target in km/h, `elapsed` after the takeover started at `initial` km/h.
    ///
    /// Never negative and non-increasing in `elapsed`.
    pub fn target(&self, initial: f64, elapsed: Duration) -> f64 {
        if initial <= STANDSTILL || self.duration.is_zero() {
            return 0.0;
        }
        let elapsed = elapsed.as_secs_f64();
        let duration = self.duration.as_secs_f64();
        let target = match self.law {
            DecayLaw::Linear => initial - (initial / duration) * elapsed,
            DecayLaw::Proportional => initial * (1.0 - elapsed / duration),
        };
        target.max(0.0)
    }

    /// Command for the current `speed`
    pub fn command(
        &self,
        steer: f64,
        speed: f64,
        initial: f64,
        elapsed: Duration,
    ) -> ControlCommand {
        let target = self.target(initial, elapsed);
        if speed > target {
            let brake = if initial <= STANDSTILL {
                self.max_brake
            } else {
                ((speed - target) / initial).min(self.max_brake)
            };
            return ControlCommand::brake(steer, brake, speed);
        }
        match self.creep {
            Creep::Throttle(throttle) => ControlCommand::drive(steer, throttle, speed),
            Creep::Brake(brake) => ControlCommand::brake(steer, brake, speed),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Creep, DecayLaw, DecelProfile};
    use vigil_time::Duration;

    const URBAN: DecelProfile = DecelProfile {
        law: DecayLaw::Linear,
        duration: Duration::from_secs(5),
        max_brake: 1.0,
        creep: Creep::Throttle(0.05),
    };

    #[test]
    fn target_is_non_increasing_and_bottoms_out() {
        let mut previous = f64::MAX;
        for ms in (0..8000).step_by(50) {
            let target = URBAN.target(30.0, Duration::from_millis(ms));
            assert!(target <= previous);
            assert!(target >= 0.0);
            previous = target;
        }
        assert_eq!(previous, 0.0);
        assert!((URBAN.target(30.0, Duration::from_millis(2500)) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn linear_target_follows_rate_times_elapsed() {
        for i in 1..400 {
            let initial = i as f64 * 0.37;
            for ms in (0..=6000).step_by(50) {
                let elapsed = Duration::from_millis(ms);
                let expected = (initial - (initial / 5.0) * elapsed.as_secs_f64()).max(0.0);
                assert_eq!(URBAN.target(initial, elapsed), expected, "{initial} at {ms}ms");
            }
        }
        // Both forms differ in the last bit here
        assert_eq!(URBAN.target(0.37, Duration::from_millis(650)), 0.3219);
    }

    #[test]
    fn zero_initial_speed_targets_standstill() {
        assert_eq!(URBAN.target(0.0, Duration::from_secs(1)), 0.0);
        let command = URBAN.command(0.0, 0.0, 0.0, Duration::from_secs(1));
        assert_eq!(command.throttle, 0.05);
        assert_eq!(command.brake, 0.0);
    }

    #[test]
    fn proportional_law_holds_with_brake() {
        let red_light = DecelProfile {
            law: DecayLaw::Proportional,
            duration: Duration::from_secs(2),
            max_brake: 0.4,
            creep: Creep::Brake(0.4),
        };
        let command = red_light.command(0.0, 40.0, 40.0, Duration::from_secs(1));
        assert_eq!(command.throttle, 0.0);
        assert!((command.brake - 0.4).abs() < 1e-9);

        let stopped = red_light.command(0.0, 0.0, 40.0, Duration::from_secs(3));
        assert_eq!(stopped.throttle, 0.0);
        assert_eq!(stopped.brake, 0.4);
    }
}

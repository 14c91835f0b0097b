// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Control commands, driver classes and the cruise speed law

use crate::error::Error;
#[cfg(feature = "recording")]
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Actuator command produced once per tick.
///
/// `speed` is the ego speed in km/h at the time the command was computed. It is not
/// applied to the vehicle and only echoed for logging.
#[cfg_attr(feature = "recording", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlCommand {
    pub steer: f64,
    pub throttle: f64,
    pub brake: f64,
    pub speed: f64,
}

impl ControlCommand {
    /// Create a command, clamping every actuator value into its valid range
    pub fn new(steer: f64, throttle: f64, brake: f64, speed: f64) -> Self {
        Self {
            steer: steer.clamp(-1.0, 1.0),
            throttle: throttle.clamp(0.0, 1.0),
            brake: brake.clamp(0.0, 1.0),
            speed,
        }
    }

    /// Drive with `throttle` and no brake
    pub fn drive(steer: f64, throttle: f64, speed: f64) -> Self {
        Self::new(steer, throttle, 0.0, speed)
    }

    /// Cut the throttle and apply `brake`
    pub fn brake(steer: f64, brake: f64, speed: f64) -> Self {
        Self::new(steer, 0.0, brake, speed)
    }
}

impl Display for ControlCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "steer {:+.4} throttle {:.2} brake {:.2} @ {:.1} km/h",
            self.steer, self.throttle, self.brake, self.speed
        )
    }
}

/// Driver alertness classification, computed outside of vigil.
#[cfg_attr(feature = "recording", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverClass {
    Alert,
    SlightlyDrowsy,
    VeryDrowsy,
    Critical,
}

impl DriverClass {
    pub const ALL: [DriverClass; 4] = [
        DriverClass::Alert,
        DriverClass::SlightlyDrowsy,
        DriverClass::VeryDrowsy,
        DriverClass::Critical,
    ];

    /// Human readable label, as written into the control log
    pub fn label(&self) -> &'static str {
        match self {
            DriverClass::Alert => "alert",
            DriverClass::SlightlyDrowsy => "slightly drowsy",
            DriverClass::VeryDrowsy => "very drowsy",
            DriverClass::Critical => "critical drowsiness",
        }
    }

    /// Label with spaces replaced by underscores, used in output folder names
    pub fn folder_label(&self) -> String {
        self.label().replace(' ', "_")
    }
}

impl Display for DriverClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DriverClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "alert" => Ok(DriverClass::Alert),
            "slightly drowsy" | "slight" => Ok(DriverClass::SlightlyDrowsy),
            "very drowsy" | "very" => Ok(DriverClass::VeryDrowsy),
            "critical drowsiness" | "critical" => Ok(DriverClass::Critical),
            _ => Err(Error::Configuration(format!("unknown driver class '{s}'"))),
        }
    }
}

/// Bang-bang cruise law: fixed throttle below the ceiling, fixed brake at or above it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CruiseLaw {
    /// Speed ceiling in km/h
    pub ceiling: f64,
    pub throttle: f64,
    /// Brake at or above the ceiling. Zero lets the vehicle coast.
    pub brake: f64,
}

impl CruiseLaw {
    pub fn command(&self, steer: f64, speed: f64) -> ControlCommand {
        if speed < self.ceiling {
            ControlCommand::drive(steer, self.throttle, speed)
        } else {
            ControlCommand::brake(steer, self.brake, speed)
        }
    }
}

#[cfg(test)]
mod test {
    use super::{ControlCommand, CruiseLaw, DriverClass};

    #[test]
    fn command_is_clamped() {
        let command = ControlCommand::new(-3.0, 1.5, -0.2, 42.0);
        assert_eq!(command.steer, -1.0);
        assert_eq!(command.throttle, 1.0);
        assert_eq!(command.brake, 0.0);
        assert_eq!(command.speed, 42.0);
    }

    #[test]
    fn driver_class_labels_parse_back() {
        for class in DriverClass::ALL {
            assert_eq!(class.label().parse::<DriverClass>().unwrap(), class);
            assert_eq!(class.folder_label().parse::<DriverClass>().unwrap(), class);
        }
        assert!("sleepy".parse::<DriverClass>().is_err());
    }

    #[test]
    fn cruise_never_drives_and_brakes_at_once() {
        let law = CruiseLaw {
            ceiling: 30.0,
            throttle: 0.45,
            brake: 0.2,
        };
        for speed in [0.0, 29.9, 30.0, 55.0] {
            let command = law.command(0.0, speed);
            assert!(command.throttle == 0.0 || command.brake == 0.0);
        }
        assert_eq!(law.command(0.0, 10.0).throttle, 0.45);
        assert_eq!(law.command(0.0, 30.0).brake, 0.2);
    }
}

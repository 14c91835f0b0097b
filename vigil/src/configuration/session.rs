// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Session builder

use crate::command::DriverClass;
use crate::error::{Error, Result};
use crate::scenario::{self, ScenarioId};
use vigil_time::Duration;

/// Default run length
pub const DEFAULT_HORIZON: Duration = Duration::from_secs(20);
/// Default tick period
pub const DEFAULT_STEP: Duration = Duration::from_millis(50);

/// Validated session parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub scenario_id: ScenarioId,
    pub town: String,
    pub driver_class: DriverClass,
    pub horizon: Duration,
    pub step: Duration,
}

/// Session configuration
#[derive(Debug, Default)]
pub struct Builder {
    pub scenario_id: Option<ScenarioId>,
    pub town: Option<String>,
    pub driver_class: Option<DriverClass>,
    pub horizon: Option<Duration>,
    pub step: Option<Duration>,
}

impl Builder {
    /// Set the scenario id
    pub fn scenario(mut self, scenario_id: ScenarioId) -> Self {
        self.scenario_id = Some(scenario_id);
        self
    }

    /// Set the town. Defaults to the scenario's town.
    pub fn town(mut self, town: impl Into<String>) -> Self {
        self.town = Some(town.into());
        self
    }

    /// Set the driver classification. Defaults to alert.
    pub fn driver_class(mut self, driver_class: DriverClass) -> Self {
        self.driver_class = Some(driver_class);
        self
    }

    /// Set the run length
    pub fn horizon(mut self, horizon: Duration) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Set the tick period
    pub fn step(mut self, step: Duration) -> Self {
        self.step = Some(step);
        self
    }

    pub fn build(self) -> Result<SessionConfig> {
        let scenario_id = self
            .scenario_id
            .ok_or_else(|| Error::Configuration("missing scenario id".into()))?;
        let entry = scenario::lookup(scenario_id)?;
        let town = self
            .town
            .unwrap_or_else(|| entry.default_town.to_string());
        if town.trim().is_empty() {
            return Err(Error::Configuration("empty town name".into()));
        }
        let step = self.step.unwrap_or(DEFAULT_STEP);
        if step.is_zero() {
            return Err(Error::Configuration("tick period must not be zero".into()));
        }

        Ok(SessionConfig {
            scenario_id,
            town,
            driver_class: self.driver_class.unwrap_or(DriverClass::Alert),
            horizon: self.horizon.unwrap_or(DEFAULT_HORIZON),
            step,
        })
    }
}

#[cfg(test)]
mod test {
    use super::{Builder, DEFAULT_HORIZON};
    use crate::command::DriverClass;
    use crate::error::Error;
    use crate::scenario::ScenarioId;
    use vigil_time::Duration;

    #[test]
    fn town_defaults_from_catalogue() {
        let config = Builder::default().scenario(ScenarioId::new(2)).build().unwrap();
        assert_eq!(config.town, "Town04");
        assert_eq!(config.driver_class, DriverClass::Alert);
        assert_eq!(config.horizon, DEFAULT_HORIZON);

        let config = Builder::default()
            .scenario(ScenarioId::new(2))
            .town("Town10HD")
            .build()
            .unwrap();
        assert_eq!(config.town, "Town10HD");
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(matches!(
            Builder::default().build(),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            Builder::default().scenario(ScenarioId::new(9)).build(),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            Builder::default()
                .scenario(ScenarioId::new(1))
                .step(Duration::ZERO)
                .build(),
            Err(Error::Configuration(_))
        ));
    }
}

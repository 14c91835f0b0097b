// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Scenario session driver
//!
//! A [`Session`] owns the controller state of one run. [`Session::run`] pulls the
//! elapsed time from a [`Clock`], reads telemetry, dispatches the tick and forwards the
//! resulting commands and annunciator requests until the horizon is reached.
//! Sustained cues are stopped and actors released on every exit path.

use crate::annunciator::Annunciator;
use crate::cleanup::CleanupLog;
use crate::command::{ControlCommand, DriverClass};
use crate::configuration::session::SessionConfig;
use crate::critical::Phase;
use crate::error::Result;
use crate::scenario::{Dispatcher, Resolution, ScenarioId, TickInput};
use crate::world::{Actuator, World};
use vigil_log::{debug, error, info};
use vigil_time::{Clock, Duration, SystemTime};

/// Identity of one run
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSession {
    pub scenario_id: ScenarioId,
    pub town: String,
    pub driver_class: DriverClass,
    pub start_time: SystemTime,
}

/// Source of the driver acknowledgment signal
pub trait AckSource {
    /// Whether the driver acknowledges during the tick at `elapsed`
    fn acknowledged(&mut self, elapsed: Duration) -> bool;
}

impl<F> AckSource for F
where
    F: FnMut(Duration) -> bool,
{
    fn acknowledged(&mut self, elapsed: Duration) -> bool {
        self(elapsed)
    }
}

/// Acknowledgment pressed once, on the first tick at or after a given time
#[derive(Debug, Clone, Default)]
pub struct ScheduledAck {
    at: Option<Duration>,
}

impl ScheduledAck {
    pub fn new(at: Option<Duration>) -> Self {
        Self { at }
    }
}

impl AckSource for ScheduledAck {
    fn acknowledged(&mut self, elapsed: Duration) -> bool {
        match self.at {
            Some(at) if elapsed >= at => {
                self.at = None;
                info!("Driver acknowledgment at t = {:.2}s", elapsed.as_secs_f64());
                true
            }
            _ => false,
        }
    }
}

/// Everything known about one completed tick
#[derive(Debug)]
pub struct TickRecord<'a> {
    pub tick: u64,
    pub elapsed: Duration,
    pub wall_time: SystemTime,
    pub command: &'a ControlCommand,
    pub driver_class: DriverClass,
    pub resolution: Resolution,
}

/// Receives every completed tick, e.g. to write a control log
pub trait TickObserver {
    fn observe(&mut self, record: &TickRecord) -> Result<()>;
}

/// Collaborators of a run outside the simulation
pub struct Peripherals<'a> {
    pub annunciator: &'a mut dyn Annunciator,
    pub ack: &'a mut dyn AckSource,
    pub observer: Option<&'a mut dyn TickObserver>,
}

/// Outcome of a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub resolution: Resolution,
    pub final_phase: Option<Phase>,
    /// Elapsed scenario time when the run stopped
    pub elapsed: Duration,
    pub cleanup_failures: usize,
}

/// One scenario run
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    session: ScenarioSession,
    dispatcher: Dispatcher,
}

impl Session {
    /// Create a session. Fails before any state exists if the scenario is unknown.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let dispatcher = Dispatcher::new(&config)?;
        let session = ScenarioSession {
            scenario_id: config.scenario_id,
            town: config.town.clone(),
            driver_class: config.driver_class,
            start_time: SystemTime::now(),
        };
        Ok(Self {
            config,
            session,
            dispatcher,
        })
    }

    pub fn session(&self) -> &ScenarioSession {
        &self.session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Drive the scenario until the horizon
    pub fn run<S>(
        &mut self,
        sim: &mut S,
        clock: &mut dyn Clock,
        mut peripherals: Peripherals,
    ) -> Result<RunSummary>
    where
        S: World + Actuator,
    {
        info!(
            "Running {} on {} for {:.1}s",
            self.session.scenario_id,
            self.session.town,
            self.config.horizon.as_secs_f64()
        );
        let outcome = self.drive(sim, clock, &mut peripherals);

        for request in self.dispatcher.finish() {
            peripherals.annunciator.announce(request);
        }
        let mut cleanup = CleanupLog::default();
        cleanup.attempt("release actors", sim.release());

        let ticks =
            outcome.inspect_err(|e| error!("{} aborted: {e}", self.session.scenario_id))?;
        let summary = RunSummary {
            ticks,
            resolution: self.dispatcher.resolution(),
            final_phase: self.dispatcher.critical_phase(),
            elapsed: clock.elapsed(),
            cleanup_failures: cleanup.failures().len(),
        };
        info!(
            "{} complete after {} ticks: {}",
            self.session.scenario_id, summary.ticks, summary.resolution
        );
        Ok(summary)
    }

    fn drive<S>(
        &mut self,
        sim: &mut S,
        clock: &mut dyn Clock,
        peripherals: &mut Peripherals,
    ) -> Result<u64>
    where
        S: World + Actuator,
    {
        let mut ticks = 0;
        loop {
            let elapsed = clock.elapsed();
            if elapsed >= self.config.horizon {
                return Ok(ticks);
            }

            let input = TickInput {
                elapsed,
                driver_ack: peripherals.ack.acknowledged(elapsed),
                telemetry: sim.telemetry()?,
            };
            let output = self.dispatcher.tick(input, sim)?;

            for request in &output.requests {
                debug!("Annunciator: {request}");
                peripherals.annunciator.announce(*request);
            }
            sim.apply_control(&output.command)?;
            if let Some(npc_command) = &output.npc_command {
                sim.apply_npc_control(npc_command)?;
            }
            if let Some(observer) = peripherals.observer.as_deref_mut() {
                observer.observe(&TickRecord {
                    tick: ticks,
                    elapsed,
                    wall_time: SystemTime::now(),
                    command: &output.command,
                    driver_class: self.session.driver_class,
                    resolution: output.resolution,
                })?;
            }

            ticks += 1;
            clock.advance();
            sim.tick(clock.elapsed())?;
        }
    }
}

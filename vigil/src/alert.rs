// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Rate limited alerts for sustained, non-critical drowsiness

use crate::annunciator::{Cue, Request};
use vigil_log::{debug, info};
use vigil_time::Duration;

/// Enforces a minimum interval between two firings of one alert channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertCooldown {
    last_fired: Option<Duration>,
    cooldown: Duration,
}

impl AlertCooldown {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            last_fired: None,
            cooldown,
        }
    }

    /// Whether the channel may fire at `t`
    pub fn ready(&self, t: Duration) -> bool {
        match self.last_fired {
            None => true,
            Some(last) => t.saturating_sub(last) >= self.cooldown,
        }
    }

    pub fn mark(&mut self, t: Duration) {
        self.last_fired = Some(t);
    }

    pub fn last_fired(&self) -> Option<Duration> {
        self.last_fired
    }
}

/// Periodic alert emitter.
///
/// Fires once `t` is past the grace delay and then again each time the cooldown has
/// passed. With a hold duration the cue is sustained and stopped on the first poll at
/// or after `fired + hold`.
#[derive(Debug)]
pub struct PeriodicAlert {
    cue: Cue,
    grace: Duration,
    hold: Option<Duration>,
    cooldown: AlertCooldown,
    stop_at: Option<Duration>,
}

impl PeriodicAlert {
    pub const GRACE: Duration = Duration::from_secs(5);
    pub const COOLDOWN: Duration = Duration::from_secs(60);

    /// One-shot cue on every firing
    pub fn one_shot(cue: Cue) -> Self {
        Self::new(cue, None)
    }

    /// Cue sustained for `hold` on every firing
    pub fn held(cue: Cue, hold: Duration) -> Self {
        Self::new(cue, Some(hold))
    }

    fn new(cue: Cue, hold: Option<Duration>) -> Self {
        Self {
            cue,
            grace: Self::GRACE,
            hold,
            cooldown: AlertCooldown::new(Self::COOLDOWN),
            stop_at: None,
        }
    }

    pub fn cooldown(&self) -> &AlertCooldown {
        &self.cooldown
    }

    /// Evaluate the alert at `t`, appending requests to `requests`
    pub fn poll(&mut self, t: Duration, requests: &mut Vec<Request>) {
        if self.stop_at.is_some_and(|stop_at| t >= stop_at) {
            self.stop_at = None;
            requests.push(Request::Stop(self.cue));
            debug!("Auto-stop of {:?} at t = {:.2}s", self.cue, t.as_secs_f64());
        }

        if t <= self.grace || !self.cooldown.ready(t) {
            return;
        }

        self.cooldown.mark(t);
        match self.hold {
            Some(hold) => {
                requests.push(Request::Hold(self.cue));
                self.stop_at = Some(t + hold);
            }
            None => requests.push(Request::Play(self.cue)),
        }
        info!("Drowsiness alert {:?} at t = {:.2}s", self.cue, t.as_secs_f64());
    }
}

#[cfg(test)]
mod test {
    use super::PeriodicAlert;
    use crate::annunciator::{Cue, Request};
    use vigil_time::Duration;

    fn run(alert: &mut PeriodicAlert, until_ms: u64) -> Vec<(u64, Request)> {
        let mut fired = vec![];
        for ms in (0..=until_ms).step_by(50) {
            let mut requests = vec![];
            alert.poll(Duration::from_millis(ms), &mut requests);
            fired.extend(requests.into_iter().map(|r| (ms, r)));
        }
        fired
    }

    #[test]
    fn fires_after_grace_and_respects_cooldown() {
        let mut alert = PeriodicAlert::one_shot(Cue::SoftBeep);
        let fired = run(&mut alert, 70_000);
        assert_eq!(
            fired,
            vec![
                (5050, Request::Play(Cue::SoftBeep)),
                (65050, Request::Play(Cue::SoftBeep)),
            ]
        );
    }

    #[test]
    fn held_cue_stops_after_hold() {
        let mut alert = PeriodicAlert::held(Cue::HeavyBeep, Duration::from_secs(3));
        let fired = run(&mut alert, 10_000);
        assert_eq!(
            fired,
            vec![
                (5050, Request::Hold(Cue::HeavyBeep)),
                (8050, Request::Stop(Cue::HeavyBeep)),
            ]
        );
    }
}

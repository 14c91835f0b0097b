// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Critical event escalation: warning, acknowledgment and takeover
//!
//! ```text
//! Normal ──▶ PreWarning ──(t ≥ warn_delay)──▶ WarningActive ──(ack, in window)──▶ Acknowledged
//!                                                   │
//!                                                   └──(window elapsed)──▶ Takeover
//! ```
//!
//! Acknowledged and Takeover are terminal and mutually exclusive. Every phase change
//! goes through [`CriticalEvent::transition`], which refuses to leave a terminal phase
//! or move backwards.

use crate::annunciator::{Cue, LightState, Request};
use std::fmt::Display;
use vigil_log::{debug, info, warn};
use vigil_time::Duration;

/// Phase of a critical event. Ordered by escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Normal,
    PreWarning,
    WarningActive,
    Acknowledged,
    Takeover,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Acknowledged | Phase::Takeover)
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Behavior after the driver acknowledged the warning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckPolicy {
    /// Resume normal driving for the rest of the run
    Resume,
    /// Silence the alarm but still run the stop curve once the ack window has elapsed
    StopAfterWindow,
}

/// Tuning of a critical event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalProfile {
    pub warn_delay: Duration,
    pub ack_window: Duration,
    /// Cue looped while the warning is active
    pub alert: Cue,
    /// Light state set on acknowledgment
    pub ack_lights: LightState,
    pub on_ack: AckPolicy,
}

/// State owned by one critical event instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalEventState {
    pub phase: Phase,
    pub warning_start: Option<Duration>,
    pub takeover_start: Option<Duration>,
    pub takeover_initial_speed: Option<f64>,
}

impl Default for CriticalEventState {
    fn default() -> Self {
        Self {
            phase: Phase::Normal,
            warning_start: None,
            takeover_start: None,
            takeover_initial_speed: None,
        }
    }
}

/// What the owning scenario should do on this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Directive {
    /// Normal driving
    Cruise,
    /// Decelerate. `since` is the time since the takeover started.
    Takeover { since: Duration, initial_speed: f64 },
}

/// Critical event state machine
#[derive(Debug)]
pub struct CriticalEvent {
    profile: CriticalProfile,
    state: CriticalEventState,
}

impl CriticalEvent {
    pub fn new(profile: CriticalProfile) -> Self {
        Self {
            profile,
            state: CriticalEventState::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn state(&self) -> &CriticalEventState {
        &self.state
    }

    pub fn profile(&self) -> &CriticalProfile {
        &self.profile
    }

    /// Advance the state machine to elapsed time `t`.
    ///
    /// `ack` is the driver acknowledgment input of this tick and `speed` the current
    /// ego speed in km/h. Annunciator requests caused by transitions are appended to
    /// `requests`.
    pub fn advance(
        &mut self,
        t: Duration,
        ack: bool,
        speed: f64,
        requests: &mut Vec<Request>,
    ) -> Directive {
        if self.state.phase == Phase::Normal {
            self.transition(Phase::PreWarning);
            info!(
                "Critical warning scheduled at t = {:.1}s",
                self.profile.warn_delay.as_secs_f64()
            );
        }

        if self.state.phase == Phase::PreWarning {
            // Acknowledgment is ignored before the warning
            if t < self.profile.warn_delay {
                return Directive::Cruise;
            }
            self.raise_warning(t, requests);
        }

        if self.state.phase == Phase::WarningActive {
            let in_window = self.in_ack_window(t);
            // Acknowledgment is checked before the window expiry
            if ack && in_window {
                self.acknowledge(t, requests);
                return self.acknowledged_directive(t, speed);
            }
            if in_window {
                return Directive::Cruise;
            }
            self.begin_takeover(t, speed);
        }

        match self.state.phase {
            Phase::Acknowledged => self.acknowledged_directive(t, speed),
            Phase::Takeover => self.takeover_directive(t),
            phase => {
                // All non-terminal phases returned above
                warn!("Unexpected critical phase {phase} at t = {t:?}");
                Directive::Cruise
            }
        }
    }

    /// Move to `next`. Refused when leaving a terminal phase or moving backwards.
    fn transition(&mut self, next: Phase) -> bool {
        let current = self.state.phase;
        if current.is_terminal() || next <= current {
            debug!("Refusing critical transition {current} -> {next}");
            return false;
        }
        debug!("Critical transition {current} -> {next}");
        self.state.phase = next;
        true
    }

    fn in_ack_window(&self, t: Duration) -> bool {
        self.state
            .warning_start
            .is_some_and(|start| t.saturating_sub(start) < self.profile.ack_window)
    }

    fn raise_warning(&mut self, t: Duration, requests: &mut Vec<Request>) {
        if !self.transition(Phase::WarningActive) {
            return;
        }
        self.state.warning_start = Some(t);
        requests.push(Request::Loop(self.profile.alert));
        requests.push(Request::Lights(LightState::Hazard));
        warn!(
            "CRITICAL WARNING at t = {:.2}s, acknowledge within {:.1}s",
            t.as_secs_f64(),
            self.profile.ack_window.as_secs_f64()
        );
    }

    fn acknowledge(&mut self, t: Duration, requests: &mut Vec<Request>) {
        if !self.transition(Phase::Acknowledged) {
            return;
        }
        requests.push(Request::Stop(self.profile.alert));
        requests.push(Request::Play(Cue::Cancel));
        requests.push(Request::Lights(self.profile.ack_lights));
        info!("Driver acknowledged at t = {:.2}s", t.as_secs_f64());
    }

    fn begin_takeover(&mut self, t: Duration, speed: f64) {
        if !self.transition(Phase::Takeover) {
            return;
        }
        self.snapshot_takeover(t, speed);
        info!(
            "Takeover active at t = {:.2}s from {speed:.1} km/h",
            t.as_secs_f64()
        );
    }

    fn snapshot_takeover(&mut self, t: Duration, speed: f64) {
        if self.state.takeover_start.is_none() {
            self.state.takeover_start = Some(t);
            self.state.takeover_initial_speed = Some(speed);
        }
    }

    fn acknowledged_directive(&mut self, t: Duration, speed: f64) -> Directive {
        match self.profile.on_ack {
            AckPolicy::Resume => Directive::Cruise,
            AckPolicy::StopAfterWindow => {
                if self.in_ack_window(t) {
                    return Directive::Cruise;
                }
                self.snapshot_takeover(t, speed);
                self.takeover_directive(t)
            }
        }
    }

    fn takeover_directive(&self, t: Duration) -> Directive {
        match (self.state.takeover_start, self.state.takeover_initial_speed) {
            (Some(start), Some(initial_speed)) => Directive::Takeover {
                since: t.saturating_sub(start),
                initial_speed,
            },
            _ => Directive::Cruise,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{AckPolicy, CriticalEvent, CriticalProfile, Directive, Phase};
    use crate::annunciator::{Cue, LightState, Request};
    use vigil_time::Duration;

    const PROFILE: CriticalProfile = CriticalProfile {
        warn_delay: Duration::from_secs(5),
        ack_window: Duration::from_secs(3),
        alert: Cue::HeavyBeep,
        ack_lights: LightState::Off,
        on_ack: AckPolicy::Resume,
    };

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn backwards_and_terminal_transitions_are_refused() {
        let mut event = CriticalEvent::new(PROFILE);
        assert!(event.transition(Phase::PreWarning));
        assert!(!event.transition(Phase::Normal));
        assert!(event.transition(Phase::WarningActive));
        assert!(event.transition(Phase::Takeover));
        assert!(!event.transition(Phase::Acknowledged));
        assert!(!event.transition(Phase::WarningActive));
        assert_eq!(event.phase(), Phase::Takeover);
    }

    #[test]
    fn ack_on_warning_entry_tick_is_accepted() {
        let mut event = CriticalEvent::new(PROFILE);
        let mut requests = vec![];
        event.advance(ms(0), false, 20.0, &mut requests);
        let directive = event.advance(ms(5000), true, 20.0, &mut requests);

        assert_eq!(directive, Directive::Cruise);
        assert_eq!(event.phase(), Phase::Acknowledged);
        assert_eq!(
            requests,
            vec![
                Request::Loop(Cue::HeavyBeep),
                Request::Lights(LightState::Hazard),
                Request::Stop(Cue::HeavyBeep),
                Request::Play(Cue::Cancel),
                Request::Lights(LightState::Off),
            ]
        );
    }

    #[test]
    fn late_ack_does_not_cancel_takeover() {
        let mut event = CriticalEvent::new(PROFILE);
        let mut requests = vec![];
        event.advance(ms(5000), false, 30.0, &mut requests);
        let directive = event.advance(ms(8000), true, 28.0, &mut requests);

        assert_eq!(event.phase(), Phase::Takeover);
        assert_eq!(
            directive,
            Directive::Takeover {
                since: Duration::ZERO,
                initial_speed: 28.0
            }
        );
        let later = event.advance(ms(9500), true, 20.0, &mut requests);
        assert_eq!(
            later,
            Directive::Takeover {
                since: ms(1500),
                initial_speed: 28.0
            }
        );
    }

    #[test]
    fn stop_after_window_keeps_acknowledged_phase() {
        let profile = CriticalProfile {
            ack_window: Duration::from_secs(2),
            on_ack: AckPolicy::StopAfterWindow,
            ..PROFILE
        };
        let mut event = CriticalEvent::new(profile);
        let mut requests = vec![];
        event.advance(ms(5000), false, 40.0, &mut requests);
        assert_eq!(
            event.advance(ms(5500), true, 40.0, &mut requests),
            Directive::Cruise
        );
        assert_eq!(
            event.advance(ms(7000), false, 41.0, &mut requests),
            Directive::Takeover {
                since: Duration::ZERO,
                initial_speed: 41.0
            }
        );
        assert_eq!(event.phase(), Phase::Acknowledged);
    }
}

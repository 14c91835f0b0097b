// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Annunciator requests
//!
//! Controllers never play sounds or switch lights themselves. They emit [`Request`]s as
//! data which the session forwards to an [`Annunciator`] implementation.

#[cfg(feature = "recording")]
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use vigil_log::trace;

/// Scenario specific spoken announcement
#[cfg_attr(feature = "recording", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Narration {
    Barrier,
    WrongLane,
    RedLight,
    Oncoming,
}

/// Audible cue
#[cfg_attr(feature = "recording", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    SoftBeep,
    HeavyBeep,
    Cancel,
    Flasher,
    Narration(Narration),
}

/// Vehicle signal light state
#[cfg_attr(feature = "recording", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightState {
    #[default]
    Off,
    Hazard,
    RightBlinker,
}

/// A single annunciator request
#[cfg_attr(feature = "recording", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    /// Play a cue once
    Play(Cue),
    /// Play a cue once and keep it until stopped (trimmed playback)
    Hold(Cue),
    /// Repeat a cue until stopped
    Loop(Cue),
    /// Stop a cue
    Stop(Cue),
    /// Switch the ego vehicle's signal lights
    Lights(LightState),
}

impl Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::Play(cue) => write!(f, "play {cue:?}"),
            Request::Hold(cue) => write!(f, "hold {cue:?}"),
            Request::Loop(cue) => write!(f, "loop {cue:?}"),
            Request::Stop(cue) => write!(f, "stop {cue:?}"),
            Request::Lights(state) => write!(f, "lights {state:?}"),
        }
    }
}

/// Receiver of annunciator requests (audio playback, hazard lights)
pub trait Annunciator {
    fn announce(&mut self, request: Request);
}

/// Tracks cues that keep playing and the current light state.
///
/// Used to stop everything a scenario started when the run ends.
#[derive(Debug, Default)]
pub struct CueLedger {
    sustained: Vec<Cue>,
    lights: LightState,
}

impl CueLedger {
    /// Record a request that is about to be forwarded
    pub fn record(&mut self, request: &Request) {
        match *request {
            Request::Hold(cue) | Request::Loop(cue) => {
                if !self.sustained.contains(&cue) {
                    self.sustained.push(cue);
                }
            }
            Request::Stop(cue) => self.sustained.retain(|c| *c != cue),
            Request::Lights(state) => self.lights = state,
            Request::Play(_) => {}
        }
        trace!("Ledger after {request}: {:?}, {:?}", self.sustained, self.lights);
    }

    /// Cues currently sustained
    pub fn sustained(&self) -> &[Cue] {
        &self.sustained
    }

    /// Requests silencing every sustained cue and switching lights off.
    ///
    /// Clears the ledger, so a second call yields nothing.
    pub fn teardown(&mut self) -> Vec<Request> {
        let mut requests: Vec<Request> = self.sustained.drain(..).map(Request::Stop).collect();
        if self.lights != LightState::Off {
            self.lights = LightState::Off;
            requests.push(Request::Lights(LightState::Off));
        }
        requests
    }
}

#[cfg(test)]
mod test {
    use super::{Cue, CueLedger, LightState, Request};

    #[test]
    fn teardown_stops_only_sustained_cues() {
        let mut ledger = CueLedger::default();
        ledger.record(&Request::Play(Cue::Cancel));
        ledger.record(&Request::Loop(Cue::HeavyBeep));
        ledger.record(&Request::Hold(Cue::SoftBeep));
        ledger.record(&Request::Stop(Cue::SoftBeep));
        ledger.record(&Request::Lights(LightState::Hazard));

        assert_eq!(
            ledger.teardown(),
            vec![
                Request::Stop(Cue::HeavyBeep),
                Request::Lights(LightState::Off)
            ]
        );
        assert!(ledger.teardown().is_empty());
    }

    #[test]
    fn repeated_loop_is_tracked_once() {
        let mut ledger = CueLedger::default();
        ledger.record(&Request::Loop(Cue::Flasher));
        ledger.record(&Request::Loop(Cue::Flasher));
        assert_eq!(ledger.sustained(), &[Cue::Flasher]);
    }
}

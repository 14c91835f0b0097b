// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Annunciator writing requests to the log instead of speakers and lamps

use vigil::prelude::{Annunciator, Cue, Request};
use vigil_log::info;

/// Logs every request and counts what reached the driver
#[derive(Debug, Default)]
pub struct LogAnnunciator {
    announced: usize,
    looping: Vec<Cue>,
}

impl LogAnnunciator {
    /// Number of requests received
    pub fn announced(&self) -> usize {
        self.announced
    }

    /// Cues started with a loop request and not stopped yet
    pub fn looping(&self) -> &[Cue] {
        &self.looping
    }
}

impl Annunciator for LogAnnunciator {
    fn announce(&mut self, request: Request) {
        self.announced += 1;
        match request {
            Request::Loop(cue) if !self.looping.contains(&cue) => self.looping.push(cue),
            Request::Stop(cue) => self.looping.retain(|c| *c != cue),
            _ => {}
        }
        info!("Annunciator: {request}");
    }
}

#[cfg(test)]
mod test {
    use super::LogAnnunciator;
    use vigil::annunciator::{Annunciator, Cue, LightState, Request};

    #[test]
    fn loops_are_tracked_until_stopped() {
        let mut annunciator = LogAnnunciator::default();
        annunciator.announce(Request::Loop(Cue::HeavyBeep));
        annunciator.announce(Request::Loop(Cue::HeavyBeep));
        annunciator.announce(Request::Lights(LightState::Hazard));
        assert_eq!(annunciator.looping(), [Cue::HeavyBeep]);

        annunciator.announce(Request::Stop(Cue::HeavyBeep));
        assert!(annunciator.looping().is_empty());
        assert_eq!(annunciator.announced(), 4);
    }
}

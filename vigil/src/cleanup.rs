// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Best-effort teardown

use crate::error::{Error, Result};
use vigil_log::warn;

/// Collects failures of teardown steps. Failures are logged and never returned.
#[derive(Debug, Default)]
pub struct CleanupLog {
    failures: Vec<(&'static str, Error)>,
}

impl CleanupLog {
    /// Record the outcome of teardown `step`
    pub fn attempt<T>(&mut self, step: &'static str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Cleanup step '{step}' failed: {e}");
                self.failures.push((step, e));
                None
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[(&'static str, Error)] {
        &self.failures
    }
}

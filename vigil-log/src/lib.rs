// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Logging facade of the vigil workspace.
//!
//! Every crate logs through this facade so that the backend can be swapped in one
//! place. The backend used by the runner is `vigil-logger`.

pub use log::*;

// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Vigil error implementation

/// Vigil error type
///
/// Every variant is fatal to the run it occurs in. Failures during teardown never
/// surface as an `Error` to the caller; they go to [`crate::cleanup::CleanupLog`].
#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// The requested scenario or session parameters are invalid
    Configuration(String),
    /// The world could not provide required spawn, lane or actor data
    Environment(String),
    /// The lane topology is malformed (e.g. a cyclic right-neighbour chain)
    Topology(String),
    Io((std::io::Error, &'static str)),
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io((e, _)) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Configuration(description) => write!(f, "Configuration error, {description}"),
            Error::Environment(description) => write!(f, "Environment error, {description}"),
            Error::Topology(description) => write!(f, "Topology error, {description}"),
            Error::Io((e, description)) => write!(f, "Io error: {description}, {e}"),
        }
    }
}

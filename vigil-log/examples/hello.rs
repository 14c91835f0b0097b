// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use vigil_log::{error, info, log, warn, Level, LevelFilter};

fn main() {
    vigil_logger::init(LevelFilter::Trace, true);

    log!(Level::Trace, "Scenario loop armed");

    log!(
        target: "urban",
        Level::Debug,
        "Cruising below {} km/h",
        30
    );

    info!("Driver class is {}", "critical drowsiness");
    warn!("Critical warning raised, waiting for acknowledgment");
    error!("No acknowledgment, handing over to takeover control");
}

// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Console logger for the vigil workspace.
//!
//! Installs a [`Log`] implementation behind the `vigil-log` facade that writes one
//! coloured (or monochrome) line per record to stdout. Timestamps are taken from
//! `vigil_time::SystemTime`, so a speed factor set for a run is visible in the log.

use std::fmt::Debug;
use std::io::Write;
use std::str::FromStr;
use std::{io, process};
use vigil_log::{LevelFilter, Log, Metadata, Record};
use vigil_time::SystemTime;

mod console;
pub mod fmt;
pub mod record;

const ENV_RUST_LOG: &str = "RUST_LOG";
const MAX_ARGS_SIZE: usize = 8 * 1024;

/// Initialize the logger.
///
/// A valid level passed as `RUST_LOG` environment variable overrides `level`.
/// `color` selects coloured or monochrome console output.
pub fn init(level: LevelFilter, color: bool) {
    let logger = Logger::new(color);

    vigil_log::set_max_level(level_from_env().unwrap_or(level));
    vigil_log::set_boxed_logger(Box::new(logger)).expect("failed to set logger")
}

/// The vigil logger.
#[derive(Debug)]
pub struct Logger {
    console: console::Console,
}

impl Logger {
    /// Create a new logger.
    pub fn new(color: bool) -> Self {
        Self {
            console: console::Console::new(color),
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= vigil_log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = SystemTime::now();
        let pid = process::id();
        let tid = thread_id();

        // Format args into a stack buffer. Overlong messages are truncated.
        let mut args_buffer = [0u8; MAX_ARGS_SIZE];
        let len = {
            let mut writer = io::Cursor::new(&mut args_buffer[..]);
            let _ = write!(&mut writer, "{}", record.args());
            writer.position() as usize
        };
        let args = record::utf8_prefix(&args_buffer[..len]);

        let record = record::Record::new(
            timestamp,
            record.level(),
            record.target(),
            record.file(),
            record.line(),
            pid,
            tid,
            args,
        );

        if let Err(e) = self.console.write(&record) {
            eprintln!("failed to write log record: {e}");
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

/// Kernel id of the calling thread
fn thread_id() -> u32 {
    // SAFETY: gettid(2) cannot fail
    unsafe { libc::gettid() as u32 }
}

/// Try to parse the log level from the environment variable `RUST_LOG`.
fn level_from_env() -> Option<LevelFilter> {
    std::env::var(ENV_RUST_LOG).ok().and_then(|s| {
        LevelFilter::from_str(&s)
            .inspect_err(|_| eprintln!("Failed to parse log level from `RUST_LOG={s}`"))
            .ok()
    })
}

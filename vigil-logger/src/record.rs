// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use vigil_log::Level;
use vigil_time::SystemTime;

/// A log record ready for formatting.
#[derive(Debug)]
pub struct Record<'a> {
    pub timestamp: SystemTime,
    pub level: Level,
    pub target: &'a str,
    pub file: Option<&'a str>,
    pub line: Option<u32>,
    pub pid: u32,
    pub tid: u32,
    pub args: &'a str,
}

impl Record<'_> {
    /// Create a new record.
    #[allow(clippy::too_many_arguments)]
    pub fn new<'a>(
        timestamp: SystemTime,
        level: Level,
        target: &'a str,
        file: Option<&'a str>,
        line: Option<u32>,
        pid: u32,
        tid: u32,
        args: &'a str,
    ) -> Record<'a> {
        Record {
            timestamp,
            level,
            target,
            file,
            line,
            pid,
            tid,
            args,
        }
    }
}

/// Longest valid UTF-8 prefix of `bytes`. Truncation may split a multi-byte character.
pub fn utf8_prefix(bytes: &[u8]) -> &str {
    match std::str::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            // `valid_up_to` is always a char boundary
            std::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod test {
    use super::utf8_prefix;

    #[test]
    fn utf8_prefix_keeps_valid_text() {
        assert_eq!(utf8_prefix(b"takeover"), "takeover");
    }

    #[test]
    fn utf8_prefix_drops_split_character() {
        let text = "ack ✓".as_bytes();
        assert_eq!(utf8_prefix(&text[..text.len() - 1]), "ack ");
    }
}

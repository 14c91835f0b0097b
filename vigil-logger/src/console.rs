// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use crate::fmt;
use crate::record::Record;
use ::console::Term;
use std::io;

#[derive(Debug)]
pub struct Console {
    color: bool,
}

impl Console {
    /// Console on stdout. Colors are used only if requested and stdout is a color terminal.
    pub fn new(color: bool) -> Self {
        Self::for_terminal(color, &Term::stdout())
    }

    fn for_terminal(color: bool, term: &Term) -> Self {
        Self {
            color: color && term.features().colors_supported(),
        }
    }

    pub fn write(&self, record: &Record) -> io::Result<()> {
        fmt::format(record, io::stdout().lock(), self.color)
    }
}

#[cfg(test)]
mod test {
    use super::Console;
    use ::console::Term;

    #[test]
    #[cfg(unix)]
    fn redirected_output_is_monochrome() {
        let path = std::env::temp_dir().join(format!("vigil-console-{}", std::process::id()));
        let file = std::fs::File::create(&path).unwrap();
        let term = Term::read_write_pair(file.try_clone().unwrap(), file);
        assert!(!Console::for_terminal(true, &term).color);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn monochrome_is_kept_on_any_terminal() {
        assert!(!Console::for_terminal(false, &Term::stdout()).color);
        assert!(!Console::for_terminal(false, &Term::stderr()).color);
    }
}

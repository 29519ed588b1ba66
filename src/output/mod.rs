//! Output stream: stdout or a pager, with runs of blank lines squeezed.

use std::io::{self, Write};
use std::process::{Child, ChildStdin, Command, Stdio};

use crossterm::tty::IsTty;

use crate::app::{FedicatError, Result};
use crate::richtext::LinkStyle;

/// Whether stdout is attached to a terminal.
pub fn interactive() -> bool {
    io::stdout().is_tty()
}

/// Overstruck links only display through a pager.
pub fn link_style(interactive: bool, no_pager: bool) -> LinkStyle {
    if interactive && !no_pager {
        LinkStyle::Underline
    } else {
        LinkStyle::Plain
    }
}

pub struct Output {
    sink: Box<dyn Write>,
    pager: Option<Child>,
    last_blank: bool,
    at_line_start: bool,
    closed: bool,
}

impl Output {
    pub fn stdout() -> Self {
        Self::to_writer(Box::new(io::stdout()))
    }

    pub fn to_writer(sink: Box<dyn Write>) -> Self {
        Self {
            sink,
            pager: None,
            // Leading blank lines are dropped too.
            last_blank: true,
            at_line_start: true,
            closed: false,
        }
    }

    /// Spawn `command` and write into its standard input.
    pub fn pager(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| FedicatError::Pager("empty pager command".into()))?;

        let mut child = Command::new(program)
            .args(args)
            .env("LESS", std::env::var("LESS").unwrap_or_else(|_| "FRX".into()))
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| FedicatError::Pager(format!("{program}: {e}")))?;

        let stdin: ChildStdin = child
            .stdin
            .take()
            .ok_or_else(|| FedicatError::Pager(format!("{program}: no stdin")))?;

        let mut output = Self::to_writer(Box::new(stdin));
        output.pager = Some(child);
        Ok(output)
    }

    /// Write a block of text. Lines are passed through except that a blank
    /// line directly after another blank line is dropped.
    pub fn write_block(&mut self, block: &str) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        let mut squeezed = String::with_capacity(block.len());
        for line in block.split_inclusive('\n') {
            let complete = line.ends_with('\n');
            let blank = self.at_line_start && complete && line.trim().is_empty();
            if blank && self.last_blank {
                continue;
            }
            self.last_blank = blank;
            self.at_line_start = complete;
            squeezed.push_str(line);
        }

        match self.sink.write_all(squeezed.as_bytes()) {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::debug!("output closed by reader");
                self.closed = true;
                Ok(())
            }
            other => Ok(other?),
        }
    }

    /// Flush, close the pager's input and wait for it to exit.
    pub fn finish(mut self) -> Result<()> {
        match self.sink.flush() {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
            other => other?,
        }

        let Some(mut child) = self.pager.take() else {
            return Ok(());
        };
        drop(self.sink);

        let status = child.wait()?;
        if !status.success() {
            return Err(FedicatError::Pager(format!("pager exited with {status}")));
        }
        Ok(())
    }
}

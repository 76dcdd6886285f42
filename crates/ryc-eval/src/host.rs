//! Host I/O used by the bundled natives.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Where program output goes and where input comes from.
pub trait Host {
    /// Write text exactly as given.
    fn write_str(&mut self, text: &str) -> io::Result<()>;

    /// Read one line without its terminator. `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// The process's standard streams.
#[derive(Debug, Default)]
pub struct StdHost;

impl Host for StdHost {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(strip_terminator(line)))
    }
}

/// In-memory host: captures output and replays scripted input lines.
#[derive(Debug, Default)]
pub struct BufferHost {
    output: String,
    input: VecDeque<String>,
}

impl BufferHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose `read_line` yields `lines` in order.
    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            output: String::new(),
            input: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Everything written so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }
}

impl Host for BufferHost {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.input.pop_front().map(strip_terminator))
    }
}

fn strip_terminator(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_host_captures_output() {
        let mut host = BufferHost::new();
        host.write_str("a").unwrap();
        host.write_str("b\n").unwrap();
        assert_eq!(host.output(), "ab\n");
    }

    #[test]
    fn test_buffer_host_replays_input() {
        let mut host = BufferHost::with_input(["first\r\n", "second"]);
        assert_eq!(host.read_line().unwrap().as_deref(), Some("first"));
        assert_eq!(host.read_line().unwrap().as_deref(), Some("second"));
        assert_eq!(host.read_line().unwrap(), None);
    }
}

// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;
use std::io;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::Error;
use crate::append::Append;
use crate::format::ContinuationPolicy;
use crate::format::FormatOptions;
use crate::format::Formatter;
use crate::record::Record;
use crate::template::Templates;

enum Target {
    Stdout,
    Stderr,
    Writer(Box<dyn Write + Send>),
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Stdout => f.write_str("Stdout"),
            Target::Stderr => f.write_str("Stderr"),
            Target::Writer(_) => f.write_str("Writer"),
        }
    }
}

impl Write for Target {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Target::Stdout => io::stdout().write(buf),
            Target::Stderr => io::stderr().write(buf),
            Target::Writer(writer) => writer.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Target::Stdout => io::stdout().lock().write_all(buf),
            Target::Stderr => io::stderr().lock().write_all(buf),
            Target::Writer(writer) => writer.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Target::Stdout => io::stdout().flush(),
            Target::Stderr => io::stderr().flush(),
            Target::Writer(writer) => writer.flush(),
        }
    }
}

#[derive(Debug)]
struct State {
    formatter: Formatter,
    target: Target,
}

/// An appender that writes colored records to a terminal.
///
/// Carriage-return prefixes overwrite the current line, so a sequence of PLAIN records with
/// `prefix = "\r"` and an empty terminator renders as a single updating line. Every record is
/// flushed as soon as it is written.
///
/// # Examples
///
/// ```
/// use lineforth::append::Console;
///
/// let stdout = Console::stdout();
/// let stderr = Console::stderr().no_color();
/// ```
#[derive(Debug)]
pub struct Console {
    state: Mutex<State>,
}

impl Default for Console {
    fn default() -> Self {
        Console::stdout()
    }
}

impl Console {
    fn with_target(target: Target) -> Console {
        let formatter = Formatter::console(Arc::new(Templates::default()));
        Console {
            state: Mutex::new(State { formatter, target }),
        }
    }

    /// Write to standard output.
    pub fn stdout() -> Console {
        Console::with_target(Target::Stdout)
    }

    /// Write to standard error.
    pub fn stderr() -> Console {
        Console::with_target(Target::Stderr)
    }

    /// Write to an arbitrary writer, such as a [`Capture`](crate::append::Capture).
    pub fn new(writer: impl Write + Send + 'static) -> Console {
        Console::with_target(Target::Writer(Box::new(writer)))
    }

    /// Set the level templates.
    ///
    /// Default to [`Templates::default`].
    pub fn with_templates(self, templates: impl Into<Arc<Templates>>) -> Console {
        let templates = templates.into();
        self.map_formatter(|formatter| formatter.with_templates(templates))
    }

    /// Set the continuation policy.
    pub fn with_policy(self, policy: impl Into<Box<dyn ContinuationPolicy>>) -> Console {
        self.map_formatter(|formatter| formatter.with_policy(policy))
    }

    /// Strip escape sequences while keeping terminal line continuation.
    pub fn no_color(self) -> Console {
        self.map_formatter(|formatter| {
            let options = FormatOptions {
                strip_color: true,
                ..formatter.options()
            };
            formatter.with_options(options)
        })
    }

    fn map_formatter(self, f: impl FnOnce(Formatter) -> Formatter) -> Console {
        let State { formatter, target } = self.state.into_inner().unwrap_or_else(|e| e.into_inner());
        Console {
            state: Mutex::new(State {
                formatter: f(formatter),
                target,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Append for Console {
    fn append(&self, record: &Record) -> Result<(), Error> {
        let mut state = self.state();
        let rendered = state.formatter.format(record)?;
        state.target.write_all(rendered.text().as_bytes())?;
        state.target.flush()?;
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        self.state().target.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;
    use crate::append::Capture;
    use crate::color;

    #[test]
    fn test_progress_line_overwrites() {
        let capture = Capture::default();
        let console = Console::new(capture.clone());
        for step in ["1/3", "2/3", "3/3"] {
            let record = Record::builder()
                .level(Level::Plain)
                .message(step)
                .prefix("\r")
                .terminator("")
                .build();
            console.append(&record).unwrap();
        }

        let plain = |text: &str| format!("{}{text}{}", color::DEFAULT, color::END);
        assert_eq!(
            capture.contents(),
            format!("{}\r{}\r{}", plain("1/3"), plain("2/3"), plain("3/3"))
        );
    }

    #[test]
    fn test_no_color_keeps_continuation() {
        let capture = Capture::default();
        let console = Console::new(capture.clone()).no_color();
        let first = Record::builder()
            .level(Level::Plain)
            .message(format!("{}half", color::GREEN))
            .terminator("")
            .build();
        let second = Record::builder()
            .level(Level::Plain)
            .message("full")
            .prefix("\r")
            .build();
        console.append(&first).unwrap();
        console.append(&second).unwrap();
        assert_eq!(capture.contents(), "half\rfull\n");
    }

    #[test]
    fn test_rejected_record_writes_nothing() {
        let capture = Capture::default();
        let console = Console::new(capture.clone());
        let record = Record::builder().message("x").terminator("\r\n").build();
        assert!(matches!(
            console.append(&record),
            Err(Error::InvalidTerminator(_))
        ));
        assert_eq!(capture.contents(), "");
    }
}

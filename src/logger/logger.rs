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
use std::io::Write;
use std::process::ExitCode;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;

use crate::Error;
use crate::Level;
use crate::append::Append;
use crate::color;
use crate::format::validate_prefix;
use crate::format::validate_terminator;
use crate::record::Context;
use crate::record::Record;

/// Per-call overrides merged with the defaults of a logging call.
///
/// Unset fields fall back to an empty prefix, a newline terminator, the level's template color and
/// the caller's context.
///
/// # Examples
///
/// ```
/// use lineforth::Level;
/// use lineforth::Overrides;
///
/// # let logger = lineforth::builder("demo").console(false).quiet().build().unwrap();
/// let progress = Overrides::new().prefix("\r").terminator("");
/// logger.log(Level::Plain, "50%", progress).unwrap();
/// ```
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    prefix: Option<String>,
    terminator: Option<String>,
    color: Option<String>,
    context: Option<Context>,
}

impl Overrides {
    pub fn new() -> Overrides {
        Overrides::default()
    }

    /// Whitespace written before the record. Only ` `, `\t` and `\r` are allowed.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// What ends the record. Only newlines are allowed; empty leaves the cursor mid-line.
    #[must_use]
    pub fn terminator(mut self, terminator: impl Into<String>) -> Self {
        self.terminator = Some(terminator.into());
        self
    }

    /// An escape sequence replacing the level's color.
    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// The module and function reported for the record, see [`context!`](crate::context).
    #[must_use]
    pub fn context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }
}

#[derive(Debug)]
pub(crate) struct Sink {
    level: AtomicU8,
    append: Box<dyn Append>,
}

impl Sink {
    pub(crate) fn new(level: Level, append: Box<dyn Append>) -> Sink {
        Sink {
            level: AtomicU8::new(level.value()),
            append,
        }
    }

    fn enabled(&self, level: Level) -> bool {
        level.value() >= self.level.load(Ordering::Relaxed)
    }
}

/// A named logger writing every record to its attached sinks.
///
/// Create one with [`builder`](crate::builder). Each sink owns its own formatter, so one logger
/// can render the same call in color on a terminal and as plain lines in a file.
///
/// A record below the logger's level is dropped before any sink sees it; each sink may apply a
/// stricter level of its own.
#[derive(Debug)]
pub struct Logger {
    name: String,
    level: AtomicU8,
    sinks: Vec<Sink>,
}

impl Logger {
    pub(crate) fn new(name: String, level: Level, sinks: Vec<Sink>) -> Logger {
        Logger {
            name,
            level: AtomicU8::new(level.value()),
            sinks,
        }
    }

    /// The name the logger was built with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current threshold.
    pub fn level(&self) -> Level {
        Level::try_from(self.level.load(Ordering::Relaxed)).unwrap_or(Level::Debug)
    }

    /// Set the threshold of the logger and of every attached sink.
    pub fn set_level(&self, level: Level) {
        self.level.store(level.value(), Ordering::Relaxed);
        for sink in &self.sinks {
            sink.level.store(level.value(), Ordering::Relaxed);
        }
    }

    /// Whether a record of `level` would reach at least one sink.
    pub fn enabled(&self, level: Level) -> bool {
        level.value() >= self.level.load(Ordering::Relaxed)
            && self.sinks.iter().any(|sink| sink.enabled(level))
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) -> Result<(), Error> {
        self.debug_with(message, Overrides::default())
    }

    #[track_caller]
    pub fn debug_with(
        &self,
        message: impl Into<String>,
        overrides: Overrides,
    ) -> Result<(), Error> {
        self.log(Level::Debug, message, overrides)
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) -> Result<(), Error> {
        self.info_with(message, Overrides::default())
    }

    #[track_caller]
    pub fn info_with(
        &self,
        message: impl Into<String>,
        overrides: Overrides,
    ) -> Result<(), Error> {
        self.log(Level::Info, message, overrides)
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) -> Result<(), Error> {
        self.warn_with(message, Overrides::default())
    }

    #[track_caller]
    pub fn warn_with(
        &self,
        message: impl Into<String>,
        overrides: Overrides,
    ) -> Result<(), Error> {
        self.log(Level::Warn, message, overrides)
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) -> Result<(), Error> {
        self.error_with(message, Overrides::default())
    }

    #[track_caller]
    pub fn error_with(
        &self,
        message: impl Into<String>,
        overrides: Overrides,
    ) -> Result<(), Error> {
        self.log(Level::Error, message, overrides)
    }

    #[track_caller]
    pub fn critical(&self, message: impl Into<String>) -> Result<(), Error> {
        self.critical_with(message, Overrides::default())
    }

    #[track_caller]
    pub fn critical_with(
        &self,
        message: impl Into<String>,
        overrides: Overrides,
    ) -> Result<(), Error> {
        self.log(Level::Critical, message, overrides)
    }

    /// Write the message without timestamp, label or module.
    #[track_caller]
    pub fn plain(&self, message: impl Into<String>) -> Result<(), Error> {
        self.plain_with(message, Overrides::default())
    }

    /// Write the message without timestamp, label or module, e.g. one step of a progress line:
    ///
    /// ```
    /// use lineforth::Overrides;
    ///
    /// let logger = lineforth::builder("app").quiet().build().unwrap();
    /// logger.plain_with("50%", Overrides::new().prefix("\r").terminator("")).unwrap();
    /// ```
    #[track_caller]
    pub fn plain_with(
        &self,
        message: impl Into<String>,
        overrides: Overrides,
    ) -> Result<(), Error> {
        self.log(Level::Plain, message, overrides)
    }

    /// Log an INFO record in green.
    #[track_caller]
    pub fn info_green(&self, message: impl Into<String>) -> Result<(), Error> {
        self.info_color(message, color::GREEN)
    }

    /// Log an INFO record in the given color.
    #[track_caller]
    pub fn info_color(
        &self,
        message: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<(), Error> {
        self.log(Level::Info, message, Overrides::new().color(color))
    }

    /// Log the opening banner of a program run, `Execution started` unless a message is given.
    #[track_caller]
    pub fn start_execution(&self, message: Option<&str>) -> Result<(), Error> {
        let message = message.unwrap_or("Execution started");
        self.info_green(message)
    }

    /// Log the closing banner of a program run and turn its outcome into an exit code.
    ///
    /// On failure the error is logged at CRITICAL and [`ExitCode::FAILURE`] is returned, so
    /// `main` can end with `logger.end_execution(run())`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::process::ExitCode;
    ///
    /// fn run() -> Result<(), std::io::Error> {
    ///     Ok(())
    /// }
    ///
    /// fn main() -> ExitCode {
    ///     let logger = lineforth::builder("app").build().unwrap();
    ///     logger.end_execution(run())
    /// }
    /// ```
    #[track_caller]
    pub fn end_execution<E: fmt::Debug>(&self, outcome: Result<(), E>) -> ExitCode {
        match outcome {
            Ok(()) => {
                let overrides = Overrides::new().color(color::DEFAULT).terminator("\n\n");
                let reported = self.log(Level::Info, "Execution ended.", overrides);
                self.finish(reported, ExitCode::SUCCESS)
            }
            Err(err) => {
                let reported = match self.critical("Execution ended.") {
                    Ok(()) => self.critical(format!("{err:?}")),
                    Err(e) => Err(e),
                };
                self.finish(reported, ExitCode::FAILURE)
            }
        }
    }

    fn finish(&self, reported: Result<(), Error>, code: ExitCode) -> ExitCode {
        if let Err(err) = reported.and_then(|()| self.flush()) {
            let _ = writeln!(std::io::stderr(), "failed to log end of execution: {err}");
        }
        code
    }

    /// Log a message with explicit overrides.
    ///
    /// # Errors
    ///
    /// Return [`Error::InvalidPrefix`] or [`Error::InvalidTerminator`] for a bad override, in
    /// which case no sink writes anything. Otherwise return the first error raised by a sink;
    /// the remaining sinks still receive the record.
    #[track_caller]
    pub fn log(
        &self,
        level: Level,
        message: impl Into<String>,
        overrides: Overrides,
    ) -> Result<(), Error> {
        if level.value() < self.level.load(Ordering::Relaxed) {
            return Ok(());
        }

        let Overrides {
            prefix,
            terminator,
            color,
            context,
        } = overrides;
        let context = match context {
            Some(context) => context,
            None => Context::caller(),
        };

        let mut builder = Record::builder()
            .level(level)
            .message(message)
            .prefix(prefix.unwrap_or_default())
            .terminator(terminator.unwrap_or_else(|| "\n".to_string()))
            .context(context);
        if let Some(color) = color {
            builder = builder.color(color);
        }
        self.dispatch(&builder.build())
    }

    /// Send an already built record to every sink whose level admits it.
    ///
    /// The logger's own threshold is not consulted.
    ///
    /// # Errors
    ///
    /// See [`Logger::log`].
    pub fn dispatch(&self, record: &Record) -> Result<(), Error> {
        validate_prefix(record.prefix().unwrap_or_default())?;
        validate_terminator(record.terminator().unwrap_or_default())?;

        let mut result = Ok(());
        for sink in &self.sinks {
            if !sink.enabled(record.level()) {
                continue;
            }
            if let Err(err) = sink.append.append(record) {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }

    /// Flush every sink.
    ///
    /// # Errors
    ///
    /// Return the first error raised by a sink.
    pub fn flush(&self) -> Result<(), Error> {
        let mut result = Ok(());
        for sink in &self.sinks {
            if let Err(err) = sink.append.flush() {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }
}

pub(crate) fn handle_log_error(record: &log::Record, error: Error) {
    let Err(fallback_error) = write!(
        std::io::stderr(),
        r###"
Error perform logging.
    Attempted to log: {args}
    Record: {record:?}
    Error: {error}
"###,
        args = record.args(),
        record = record,
        error = error,
    ) else {
        return;
    };

    panic!(
        r###"
Error performing stderr logging after error occurred during regular logging.
    Attempted to log: {args}
    Record: {record:?}
    Error: {error}
    Fallback error: {fallback_error}
"###,
        args = record.args(),
        record = record,
        error = error,
        fallback_error = fallback_error,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::append::Capture;
    use crate::append::Console;

    fn logger(level: Level) -> (Logger, Capture) {
        let capture = Capture::default();
        let console = Console::new(capture.clone()).no_color();
        let sinks = vec![Sink::new(level, Box::new(console))];
        (Logger::new("test".to_string(), level, sinks), capture)
    }

    #[test]
    fn test_threshold_and_set_level() {
        let (logger, capture) = logger(Level::Info);
        logger.debug("hidden").unwrap();
        assert_eq!(capture.contents(), "");
        assert!(!logger.enabled(Level::Debug));

        logger.set_level(Level::Debug);
        assert_eq!(logger.level(), Level::Debug);
        logger.debug("x").unwrap();

        let contents = capture.contents();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains("DEBUG"));
        assert!(contents.ends_with("x\n"));
    }

    #[test]
    fn test_level_methods_accept_overrides() {
        let (logger, capture) = logger(Level::Debug);
        let step = || Overrides::new().prefix("\r").terminator("");
        logger.plain_with("1/2", step()).unwrap();
        logger.plain_with("2/2", step()).unwrap();
        logger.warn_with("done", Overrides::new().prefix("\t")).unwrap();

        let contents = capture.contents();
        let lines = contents.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2, "{contents:?}");
        assert_eq!(lines[0], "1/2\r2/2");
        assert!(lines[1].starts_with('\t') && lines[1].contains("[WARN]"));

        let bad = Overrides::new().terminator("x");
        assert!(logger.error_with("rejected", bad).is_err());
        assert_eq!(capture.contents(), contents);
    }

    #[test]
    fn test_caller_module() {
        let (logger, capture) = logger(Level::Debug);
        logger.info("hello").unwrap();
        assert!(capture.contents().contains("logger"));

        let overrides = Overrides::new().context(Context::new("elsewhere").with_function("main"));
        logger.log(Level::Info, "hello", overrides).unwrap();
        assert!(capture.contents().contains("elsewhere"));
    }

    #[test]
    fn test_invalid_override_writes_nothing() {
        let (logger, capture) = logger(Level::Debug);
        let err = logger
            .log(Level::Plain, "x", Overrides::new().prefix("->"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPrefix(_)));
        let err = logger
            .log(Level::Plain, "x", Overrides::new().terminator("."))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTerminator(_)));
        assert_eq!(capture.contents(), "");
    }

    #[test]
    fn test_end_execution() {
        let (logger, capture) = logger(Level::Debug);
        assert_eq!(logger.end_execution(Ok::<(), String>(())), ExitCode::SUCCESS);
        assert!(capture.contents().ends_with("Execution ended.\n\n"));

        capture.clear();
        let code = logger.end_execution(Err::<(), _>("boom"));
        assert_eq!(code, ExitCode::FAILURE);
        let contents = capture.contents();
        let lines = contents.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("CRITICAL") && lines[0].ends_with("Execution ended."));
        assert!(lines[1].ends_with("\"boom\""));
    }

    #[test]
    fn test_plain_passthrough() {
        let (logger, capture) = logger(Level::Critical);
        logger.error("hidden").unwrap();
        logger.plain("shown").unwrap();
        assert_eq!(capture.contents(), "shown\n");
    }
}

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

use std::io::Write;
use std::sync::Arc;

use crate::Error;
use crate::Level;
use crate::Logger;
use crate::append::Append;
use crate::append::Console;
#[cfg(feature = "append-file")]
use crate::append::FileBuilder;
use crate::color;
use crate::logger::Sink;
#[cfg(feature = "append-file")]
use crate::record::Record;
use crate::template::Templates;

/// Create a new empty [`LoggerBuilder`] instance for configuring a logger named `name`.
///
/// By default the logger is at INFO, writes colored output to standard output and has no file
/// sink.
///
/// # Examples
///
/// ```
/// use lineforth::Level;
///
/// let logger = lineforth::builder("service")
///     .level(Level::Debug)
///     .console_stderr()
///     .build()
///     .unwrap();
/// logger.debug("ready").unwrap();
/// ```
pub fn builder(name: impl Into<String>) -> LoggerBuilder {
    LoggerBuilder::new(name)
}

/// A builder for configuring a [`Logger`]. See also [`builder`].
#[must_use = "call `build` to create the logger"]
#[derive(Debug)]
pub struct LoggerBuilder {
    name: String,
    level: Level,
    templates: Arc<Templates>,

    console: Option<Console>,
    console_level: Option<Level>,
    no_color: bool,

    #[cfg(feature = "append-file")]
    file: Option<FileBuilder>,
    #[cfg(feature = "append-file")]
    file_level: Option<Level>,

    appends: Vec<Box<dyn Append>>,
    quiet: bool,
}

impl LoggerBuilder {
    /// Create a new [`LoggerBuilder`] for a logger named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: Level::Info,
            templates: Arc::new(Templates::default()),
            console: Some(Console::stdout()),
            console_level: None,
            no_color: false,
            #[cfg(feature = "append-file")]
            file: None,
            #[cfg(feature = "append-file")]
            file_level: None,
            appends: vec![],
            quiet: false,
        }
    }

    /// Set the lowest level the logger lets through.
    ///
    /// Default to [`Level::Info`].
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Read the level from the environment variable `name`, keeping the configured level when the
    /// variable is unset or does not hold a level name or value.
    ///
    /// # Examples
    ///
    /// ```
    /// use lineforth::Level;
    ///
    /// // LINEFORTH_LEVEL=warn or LINEFORTH_LEVEL=30
    /// let builder = lineforth::builder("service")
    ///     .level(Level::Info)
    ///     .level_from_env("LINEFORTH_LEVEL");
    /// ```
    pub fn level_from_env(mut self, name: &str) -> Self {
        let parsed = std::env::var(name)
            .ok()
            .and_then(|value| value.trim().parse::<Level>().ok());
        if let Some(level) = parsed {
            self.level = level;
        }
        self
    }

    /// Set the level templates shared by the console and file sinks.
    ///
    /// Default to [`Templates::default`].
    pub fn templates(mut self, templates: impl Into<Arc<Templates>>) -> Self {
        self.templates = templates.into();
        self
    }

    /// Enable or disable the console sink.
    pub fn console(mut self, enabled: bool) -> Self {
        self.console = enabled.then(Console::stdout);
        self
    }

    /// Write console output to standard error instead of standard output.
    pub fn console_stderr(mut self) -> Self {
        self.console = Some(Console::stderr());
        self
    }

    /// Write console output to an arbitrary writer, such as a [`Capture`](crate::append::Capture).
    pub fn console_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.console = Some(Console::new(writer));
        self
    }

    /// Strip color from console output.
    pub fn no_color(mut self) -> Self {
        self.no_color = true;
        self
    }

    /// Set a threshold for the console sink alone. Default to the logger's level.
    pub fn console_level(mut self, level: Level) -> Self {
        self.console_level = Some(level);
        self
    }

    /// Attach a rotating file sink.
    ///
    /// The file uses the logger's templates unless the [`FileBuilder`] sets its own.
    #[cfg(feature = "append-file")]
    pub fn file(mut self, file: FileBuilder) -> Self {
        self.file = Some(file);
        self
    }

    /// Set a threshold for the file sink alone. Default to the logger's level.
    #[cfg(feature = "append-file")]
    pub fn file_level(mut self, level: Level) -> Self {
        self.file_level = Some(level);
        self
    }

    /// Attach any other [`Append`].
    pub fn append(mut self, append: impl Append) -> Self {
        self.appends.push(Box::new(append));
        self
    }

    /// Do not log the start banner or announce the log file.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Build the [`Logger`] and log its start banner.
    ///
    /// # Errors
    ///
    /// Return [`Error::SinkSetup`] if the file sink cannot be opened. Nothing is written in that
    /// case.
    #[track_caller]
    pub fn build(self) -> Result<Logger, Error> {
        let LoggerBuilder {
            name,
            level,
            templates,
            console,
            console_level,
            no_color,
            #[cfg(feature = "append-file")]
            file,
            #[cfg(feature = "append-file")]
            file_level,
            appends,
            quiet,
        } = self;

        #[cfg(feature = "append-file")]
        let file = match file {
            Some(file) => Some(file.fallback_templates(&templates).build()?),
            None => None,
        };

        let mut sinks = Vec::with_capacity(appends.len() + 2);
        if let Some(mut console) = console {
            console = console.with_templates(templates.clone());
            if no_color {
                console = console.no_color();
            }

            #[cfg(feature = "append-file")]
            if let (Some(file), false) = (&file, quiet) {
                let announcement = Record::builder()
                    .level(Level::Plain)
                    .message(format!(
                        "\"{name}\" will start logging into: {}",
                        file.path().display()
                    ))
                    .color(color::rgb(0x08, 0x88, 0x88))
                    .terminator("\n\n")
                    .build();
                console.append(&announcement)?;
            }

            sinks.push(Sink::new(console_level.unwrap_or(level), Box::new(console)));
        }

        #[cfg(feature = "append-file")]
        if let Some(file) = file {
            sinks.push(Sink::new(file_level.unwrap_or(level), Box::new(file)));
        }

        for append in appends {
            sinks.push(Sink::new(level, append));
        }

        let banner = format!("Logger {}'{name}'{} started", color::GREEN, color::END);
        let logger = Logger::new(name, level, sinks);
        if !quiet {
            logger.info(banner)?;
        }
        Ok(logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::append::Capture;

    #[test]
    fn test_banner() {
        let capture = Capture::default();
        let logger = builder("banner")
            .console_writer(capture.clone())
            .build()
            .unwrap();
        assert_eq!(logger.name(), "banner");
        assert_eq!(logger.level(), Level::Info);

        let contents = capture.contents();
        let expected = format!("{}'banner'{} started", color::GREEN, color::END);
        assert!(contents.contains(&expected), "{contents:?}");
        assert!(contents.contains("[INFO]"));
    }

    #[test]
    fn test_quiet_and_console_level() {
        let capture = Capture::default();
        let logger = builder("quiet")
            .level(Level::Debug)
            .console_writer(capture.clone())
            .console_level(Level::Warn)
            .no_color()
            .quiet()
            .build()
            .unwrap();
        assert_eq!(capture.contents(), "");

        logger.info("dropped by the console").unwrap();
        logger.warn("kept").unwrap();
        assert_eq!(capture.contents().lines().count(), 1);
        assert!(capture.contents().ends_with("kept\n"));
    }

    #[test]
    fn test_level_from_env() {
        // SAFETY: the variable is unique to this test.
        unsafe { std::env::set_var("LINEFORTH_TEST_LEVEL", "warning") };
        let logger = builder("env")
            .console(false)
            .quiet()
            .level_from_env("LINEFORTH_TEST_LEVEL")
            .build()
            .unwrap();
        assert_eq!(logger.level(), Level::Warn);

        let logger = builder("env")
            .console(false)
            .quiet()
            .level(Level::Error)
            .level_from_env("LINEFORTH_TEST_LEVEL_UNSET")
            .build()
            .unwrap();
        assert_eq!(logger.level(), Level::Error);
    }
}

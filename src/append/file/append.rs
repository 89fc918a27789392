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
use std::num::NonZeroU64;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::Error;
use crate::append::Append;
use crate::append::file::rolling::RollingFileWriter;
use crate::append::file::rolling::RollingFileWriterBuilder;
use crate::format::Formatter;
use crate::record::Record;
use crate::template::Templates;
use crate::trap::Trap;

const DEFAULT_MAX_BACKUPS: usize = 5;
const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// How an existing log file is treated when the appender opens it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Keep existing content and write after it.
    #[default]
    Append,
    /// Discard existing content. Rotation is disabled in this mode.
    Truncate,
}

/// A builder to configure and create a [`File`] appender.
#[derive(Debug)]
pub struct FileBuilder {
    basedir: PathBuf,
    filename: String,
    mode: FileMode,
    max_backups: usize,
    max_bytes: u64,
    templates: Option<Arc<Templates>>,
    trap: Option<Box<dyn Trap>>,
}

impl FileBuilder {
    /// Create a new file appender builder writing to `basedir/filename`.
    pub fn new(basedir: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            basedir: basedir.into(),
            filename: filename.into(),
            mode: FileMode::Append,
            max_backups: DEFAULT_MAX_BACKUPS,
            max_bytes: DEFAULT_MAX_BYTES,
            templates: None,
            trap: None,
        }
    }

    /// Set how an existing file is opened.
    ///
    /// Default to [`FileMode::Append`].
    #[must_use]
    pub fn mode(mut self, mode: FileMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the number of rotated backups to keep. Zero disables rotation.
    ///
    /// Default to 5.
    #[must_use]
    pub fn max_backups(mut self, n: usize) -> Self {
        self.max_backups = n;
        self
    }

    /// Set the size in bytes the current file may reach before it is rotated. Zero disables
    /// rotation.
    ///
    /// Default to 5 MiB.
    #[must_use]
    pub fn max_bytes(mut self, n: u64) -> Self {
        self.max_bytes = n;
        self
    }

    /// Set the level templates.
    ///
    /// When unset, the templates of the logger the file is attached to are used, or
    /// [`Templates::default`] for a standalone appender.
    #[must_use]
    pub fn templates(mut self, templates: impl Into<Arc<Templates>>) -> Self {
        self.templates = Some(templates.into());
        self
    }

    /// Set the trap for errors raised while rotating or flushing in the background of a call.
    ///
    /// Default to [`DefaultTrap`](crate::trap::DefaultTrap).
    ///
    /// # Examples
    ///
    /// ```
    /// use lineforth::append::FileBuilder;
    /// use lineforth::trap::DefaultTrap;
    ///
    /// let builder = FileBuilder::new("my_service", "my_app.log");
    /// builder.trap(DefaultTrap::default());
    /// ```
    #[must_use]
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = Some(trap.into());
        self
    }

    pub(crate) fn fallback_templates(mut self, templates: &Arc<Templates>) -> Self {
        if self.templates.is_none() {
            self.templates = Some(templates.clone());
        }
        self
    }

    /// Build the [`File`] appender.
    ///
    /// # Errors
    ///
    /// Return [`Error::SinkSetup`] if either:
    ///
    /// * The configured filename is empty.
    /// * The log directory cannot be created.
    /// * The log file cannot be opened.
    pub fn build(self) -> Result<File, Error> {
        let FileBuilder {
            basedir,
            filename,
            mode,
            max_backups,
            max_bytes,
            templates,
            trap,
        } = self;

        let path = basedir.join(&filename);
        let mut builder = RollingFileWriterBuilder::new(basedir, filename)
            .truncate(mode == FileMode::Truncate)
            .max_backups(max_backups)
            .max_file_size(NonZeroU64::new(max_bytes));
        if let Some(trap) = trap {
            builder = builder.trap(trap);
        }
        let writer = builder.build()?;

        let templates = templates.unwrap_or_default();
        Ok(File::new(path, writer, Formatter::file(templates)))
    }
}

#[derive(Debug)]
struct State {
    formatter: Formatter,
    writer: RollingFileWriter,
}

/// An appender that writes uncolored records to a size-rotated file.
///
/// Carriage-return overwrites are turned into separate lines, and a record is written at most once
/// no matter how many times it reaches the appender.
#[derive(Debug)]
pub struct File {
    path: PathBuf,
    state: Mutex<State>,
}

impl File {
    fn new(path: PathBuf, writer: RollingFileWriter, formatter: Formatter) -> Self {
        let state = Mutex::new(State { formatter, writer });
        Self { path, state }
    }

    /// The path of the current log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Append for File {
    fn append(&self, record: &Record) -> Result<(), Error> {
        let mut state = self.state();
        let rendered = state.formatter.format(record)?;
        if rendered.is_repeated() {
            return Ok(());
        }
        state.writer.write_all(rendered.text().as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        self.state().writer.flush()?;
        Ok(())
    }
}

impl Drop for File {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(|e| e.into_inner());
        let _ = state.writer.flush();
    }
}

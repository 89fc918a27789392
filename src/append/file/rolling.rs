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

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::num::NonZeroU64;
use std::path::PathBuf;

use anyhow::Context;

use crate::Error;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// A writer that rolls the current file over to numbered backups once it grows too large.
///
/// Backups are named `<filename>.1` (newest) to `<filename>.<max_backups>` (oldest).
#[derive(Debug)]
pub struct RollingFileWriter {
    state: State,
    writer: File,
}

impl Drop for RollingFileWriter {
    fn drop(&mut self) {
        if let Err(err) = self.writer.flush() {
            let err = anyhow::Error::new(err).context("failed to flush file writer on drop");
            self.state.trap.trap(&err);
        }
    }
}

impl Write for RollingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.state.should_rollover(buf.len()) {
            self.state.refresh_writer(&mut self.writer);
        }

        self.writer
            .write(buf)
            .inspect(|&n| self.state.current_filesize += n as u64)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// A builder for configuring [`RollingFileWriter`].
#[derive(Debug)]
pub struct RollingFileWriterBuilder {
    // required
    basedir: PathBuf,
    filename: String,

    // has default
    truncate: bool,
    max_size: Option<NonZeroU64>,
    max_backups: usize,
    trap: Box<dyn Trap>,
}

impl RollingFileWriterBuilder {
    #[must_use]
    pub fn new(basedir: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            basedir: basedir.into(),
            filename: filename.into(),
            truncate: false,
            max_size: None,
            max_backups: 0,
            trap: Box::new(DefaultTrap::default()),
        }
    }

    /// Truncate the file on open instead of appending to it.
    #[must_use]
    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    /// Set the maximum size of the current file in bytes.
    #[must_use]
    pub fn max_file_size(mut self, n: Option<NonZeroU64>) -> Self {
        self.max_size = n;
        self
    }

    /// Set the number of backups to keep. Zero disables rotation.
    #[must_use]
    pub fn max_backups(mut self, n: usize) -> Self {
        self.max_backups = n;
        self
    }

    #[must_use]
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Builds the [`RollingFileWriter`].
    ///
    /// # Errors
    ///
    /// Return [`Error::SinkSetup`] if the filename is empty, or the directory or file cannot be
    /// created or opened.
    pub fn build(self) -> Result<RollingFileWriter, Error> {
        let Self {
            basedir,
            filename,
            truncate,
            max_size,
            max_backups,
            trap,
        } = self;

        if filename.is_empty() {
            let err = io::Error::new(io::ErrorKind::InvalidInput, "filename must not be empty");
            return Err(Error::sink_setup(basedir, err));
        }

        fs::create_dir_all(&basedir).map_err(|err| Error::sink_setup(&basedir, err))?;

        let filepath = basedir.join(&filename);
        let writer = OpenOptions::new()
            .create(true)
            .write(true)
            .append(!truncate)
            .truncate(truncate)
            .open(&filepath)
            .map_err(|err| Error::sink_setup(&filepath, err))?;
        let current_filesize = writer
            .metadata()
            .map_err(|err| Error::sink_setup(&filepath, err))?
            .len();

        let state = State {
            filepath,
            current_filesize,
            // truncating a file on every start makes backups meaningless
            max_size: if truncate { None } else { max_size },
            max_backups,
            trap,
        };
        Ok(RollingFileWriter { state, writer })
    }
}

#[derive(Debug)]
struct State {
    filepath: PathBuf,
    current_filesize: u64,
    max_size: Option<NonZeroU64>,
    max_backups: usize,
    trap: Box<dyn Trap>,
}

impl State {
    fn backup_filename(&self, n: usize) -> PathBuf {
        let mut filename = self.filepath.clone().into_os_string();
        filename.push(format!(".{n}"));
        PathBuf::from(filename)
    }

    fn should_rollover(&self, incoming: usize) -> bool {
        if self.max_backups == 0 || self.current_filesize == 0 {
            return false;
        }

        self.max_size
            .is_some_and(|n| self.current_filesize + incoming as u64 > n.get())
    }

    fn rotate_log_writer(&self) -> anyhow::Result<File> {
        let oldest = self.backup_filename(self.max_backups);
        if fs::exists(&oldest).is_ok_and(|ok| ok) {
            fs::remove_file(&oldest)
                .with_context(|| format!("failed to remove old log: {}", oldest.display()))?;
        }

        for i in (1..self.max_backups).rev() {
            let old = self.backup_filename(i);
            if fs::exists(&old).is_ok_and(|ok| ok) {
                let new = self.backup_filename(i + 1);
                fs::rename(&old, &new)
                    .with_context(|| format!("failed to rotate log: {}", old.display()))?;
            }
        }

        let archive = self.backup_filename(1);
        fs::rename(&self.filepath, &archive).with_context(|| {
            format!("failed to archive log: {}", self.filepath.display())
        })?;

        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.filepath)
            .context("failed to create log file")
    }

    fn refresh_writer(&mut self, file: &mut File) {
        if let Err(err) = file.flush() {
            let err = anyhow::Error::new(err).context("failed to flush previous writer");
            self.trap.trap(&err);
        }

        match self.rotate_log_writer() {
            Ok(new_file) => {
                *file = new_file;
                self.current_filesize = 0;
            }
            Err(err) => {
                let err = err.context("failed to rotate log writer");
                self.trap.trap(&err);
            }
        }
    }
}

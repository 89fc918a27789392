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

//! Sinks that write formatted records.

use std::fmt;

use crate::Error;
use crate::record::Record;

mod capture;
#[cfg(feature = "append-file")]
pub mod file;
mod stdio;

pub use self::capture::Capture;
#[cfg(feature = "append-file")]
pub use self::file::File;
#[cfg(feature = "append-file")]
pub use self::file::FileBuilder;
#[cfg(feature = "append-file")]
pub use self::file::FileMode;
pub use self::stdio::Console;

/// A sink that formats and writes log records.
///
/// Each implementation owns its formatter. The logger hands a record to an appender only after
/// the record passed the appender's threshold.
pub trait Append: fmt::Debug + Send + Sync + 'static {
    /// Format and write a log record.
    fn append(&self, record: &Record) -> Result<(), Error>;

    /// Flush any buffered records.
    ///
    /// Default to a no-op.
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}

impl<T: Append> From<T> for Box<dyn Append> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

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

//! Lineforth is a line-oriented logger for terminals and log files.
//!
//! # Overview
//!
//! A [`Logger`] renders every call through per-level templates and writes it to each attached
//! sink. The console sink keeps colors and honors carriage-return overwrites, so progress output
//! can update a single terminal line in place. The file sink writes the same calls as uncolored
//! lines, turning each overwrite into a line of its own, and rotates the file by size.
//!
//! Each sink remembers how the previous record ended. A record asking to overwrite a line that
//! was already terminated starts a fresh line instead, and a leveled record never glues onto a
//! dangling partial line.
//!
//! # Examples
//!
//! Simple setup with the default console sink:
//!
//! ```
//! let logger = lineforth::builder("app").build().unwrap();
//!
//! logger.info("This is an info message.").unwrap();
//! ```
//!
//! A progress line on the console that becomes one line per step in a file:
//!
//! ```
//! use lineforth::Level;
//! use lineforth::Overrides;
//! use lineforth::append::FileBuilder;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let logger = lineforth::builder("app")
//!     .level(Level::Debug)
//!     .file(FileBuilder::new(dir.path(), "app.log"))
//!     .build()
//!     .unwrap();
//!
//! for step in 1..=3 {
//!     let overrides = Overrides::new().prefix("\r").terminator("");
//!     logger.log(Level::Plain, format!("step {step}/3"), overrides).unwrap();
//! }
//! logger.plain("").unwrap();
//! logger.debug("done").unwrap();
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod bridge;
pub mod color;
pub mod format;
pub mod template;
pub mod trap;

mod error;
mod level;
mod logger;
mod record;

pub use append::Append;
pub use error::Error;
pub use level::Level;
pub use logger::*;
pub use record::Context;
pub use record::Record;
pub use record::RecordBuilder;
pub use record::RecordId;

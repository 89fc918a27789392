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

//! Appender for writing log records to a plain text file with size-based rotation.
//!
//! Files receive uncolored text, one record per line: carriage-return overwrites that a terminal
//! would perform in place become separate lines instead.
//!
//! # Example
//!
//! ```
//! use lineforth::append::FileBuilder;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let file = FileBuilder::new(dir.path(), "app.log")
//!     .max_backups(3)
//!     .max_bytes(1024 * 1024)
//!     .build()
//!     .unwrap();
//!
//! let logger = lineforth::builder("app").append(file).build().unwrap();
//! logger.info("This log will be written to a rotating file.").unwrap();
//! ```

pub use self::append::File;
pub use self::append::FileBuilder;
pub use self::append::FileMode;

mod append;
mod rolling;

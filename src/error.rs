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

use std::path::PathBuf;

/// The error type of lineforth.
///
/// `InvalidPrefix` and `InvalidTerminator` are per-call errors: the record that triggered them
/// produced no output at all. `UnknownLevel`, `InvalidTemplate` and `SinkSetup` are raised while
/// wiring a logger together and indicate a configuration problem.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("prefix supports only ` `, `\\t` or `\\r`, got {0:?}")]
    InvalidPrefix(String),
    #[error("terminator supports only new line, got {0:?}")]
    InvalidTerminator(String),
    #[error("no template registered for level {0}")]
    UnknownLevel(u8),
    #[error("invalid layout {layout:?}: {reason}")]
    InvalidTemplate { layout: String, reason: String },
    #[error("invalid color {0:?}")]
    InvalidColor(String),
    #[error("failed to set up sink at {}: {source}", path.display())]
    SinkSetup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to perform IO action: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_template(layout: &str, reason: impl Into<String>) -> Self {
        Error::InvalidTemplate {
            layout: layout.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn sink_setup(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::SinkSetup {
            path: path.into(),
            source,
        }
    }

    /// Whether this error rejected a single logging call rather than a configuration.
    pub fn is_per_call(&self) -> bool {
        matches!(self, Error::InvalidPrefix(_) | Error::InvalidTerminator(_))
    }
}

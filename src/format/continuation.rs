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

//! Line continuation between consecutive records on one sink.
//!
//! Whether a record starts on a fresh line, overwrites the current one, or continues it depends
//! on the record's own prefix and on how the previous record on the same sink ended:
//!
//! | cursor after previous record | prefix has `\r` | level     | console          | file                 |
//! |------------------------------|-----------------|-----------|------------------|----------------------|
//! | no previous record           | yes             | any       | `\r` dropped     | tail kept, trimmed   |
//! | fresh line (`\n` terminator) | yes             | any       | `\r` dropped     | tail kept, trimmed   |
//! | mid-line                     | yes             | any       | `\r` kept        | `\n` + tail, trimmed |
//! | mid-line                     | no              | not PLAIN | `\n` prepended   | `\n` prepended       |
//! | anything else                | no              | any       | prefix as is     | prefix as is         |
//!
//! Whether the previous record was PLAIN plays no part: only its terminator matters, so
//! PLAIN to leveled and leveled to PLAIN transitions follow the same rules.
//!
//! On files, the tail is whatever follows the last `\r` of the prefix; padding before it belonged
//! to the overwritten line and is dropped.

use std::fmt;

use crate::Level;
use crate::format::FormatOptions;

/// What a formatter remembers about the last record it formatted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Previous {
    level: Level,
    terminator: String,
}

impl Previous {
    pub fn new(level: Level, terminator: impl Into<String>) -> Previous {
        Previous {
            level,
            terminator: terminator.into(),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    /// Whether the cursor sits at the start of a fresh line after this record.
    pub fn ends_line(&self) -> bool {
        self.terminator.contains('\n')
    }
}

/// The outcome of continuation resolution for one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Continuation {
    /// The prefix to render in place of the requested one.
    pub prefix: String,
    /// Whether padding spaces, tabs and carriage returns around the message body should be
    /// trimmed. Set for overwrite requests on sinks that cannot overwrite.
    pub trim_message: bool,
}

/// A strategy deciding how a record continues from the previous one.
pub trait ContinuationPolicy: fmt::Debug + Send + Sync + 'static {
    /// Resolve the prefix of a record at `level` that requested `prefix`.
    ///
    /// `prefix` has already been validated to contain only spaces, tabs and carriage returns.
    fn resolve(
        &self,
        previous: Option<&Previous>,
        level: Level,
        prefix: &str,
        options: FormatOptions,
    ) -> Continuation;
}

impl<T: ContinuationPolicy> From<T> for Box<dyn ContinuationPolicy> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// The continuation rules described in the [module documentation](self).
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct DefaultContinuation {}

impl ContinuationPolicy for DefaultContinuation {
    fn resolve(
        &self,
        previous: Option<&Previous>,
        level: Level,
        prefix: &str,
        options: FormatOptions,
    ) -> Continuation {
        resolve_continuation(previous, level, prefix, options)
    }
}

/// Resolve the prefix of a record from the previous record on the same sink.
///
/// This is a pure function of its inputs; calling it twice with the same arguments yields the
/// same result.
///
/// # Examples
///
/// ```
/// use lineforth::Level;
/// use lineforth::format::FormatOptions;
/// use lineforth::format::Previous;
/// use lineforth::format::resolve_continuation;
///
/// let progress = Previous::new(Level::Plain, "");
/// let console = resolve_continuation(Some(&progress), Level::Plain, "\r", FormatOptions::console());
/// assert_eq!(console.prefix, "\r");
/// let file = resolve_continuation(Some(&progress), Level::Plain, "\r", FormatOptions::file());
/// assert_eq!(file.prefix, "\n");
/// ```
pub fn resolve_continuation(
    previous: Option<&Previous>,
    level: Level,
    prefix: &str,
    options: FormatOptions,
) -> Continuation {
    let overwrite = prefix.contains('\r');
    let mid_line = previous.is_some_and(|previous| !previous.ends_line());
    let synthesize = options.synthesize_newline_on_overwrite;
    // padding written after the last carriage return survives on every sink
    let tail = prefix.rfind('\r').map_or(prefix, |at| &prefix[at + 1..]);

    let prefix = match (mid_line, overwrite) {
        // there is a partial line to overwrite
        (true, true) if synthesize => format!("\n{tail}"),
        (true, true) => prefix.to_string(),
        // nothing to overwrite: first record, or the cursor is already on a fresh line
        (false, true) if synthesize => tail.to_string(),
        (false, true) => prefix.replace('\r', ""),
        // never glue a leveled record onto a dangling partial line
        (true, false) if !level.is_plain() => format!("\n{prefix}"),
        (_, false) => prefix.to_string(),
    };

    Continuation {
        prefix,
        trim_message: overwrite && synthesize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(previous: Option<(Level, &str)>, level: Level, prefix: &str, file: bool) -> String {
        let previous = previous.map(|(level, terminator)| Previous::new(level, terminator));
        let options = if file {
            FormatOptions::file()
        } else {
            FormatOptions::console()
        };
        resolve_continuation(previous.as_ref(), level, prefix, options).prefix
    }

    #[test]
    fn test_first_record_drops_carriage_return() {
        assert_eq!(resolve(None, Level::Plain, "\r", false), "");
        assert_eq!(resolve(None, Level::Info, "\t\r ", false), "\t ");
        assert_eq!(resolve(None, Level::Info, "\t\r ", true), " ");
        assert_eq!(resolve(None, Level::Info, "\r", true), "");
        assert_eq!(resolve(None, Level::Info, "  ", false), "  ");
        assert_eq!(resolve(None, Level::Info, "", true), "");
    }

    #[test]
    fn test_fresh_line_ignores_overwrite() {
        for level in Level::ALL {
            for previous in Level::ALL {
                assert_eq!(resolve(Some((previous, "\n")), level, "\r", false), "");
                assert_eq!(resolve(Some((previous, "\n\n")), level, "\r", true), "");
                assert_eq!(resolve(Some((previous, "\n")), level, " \r\t", false), " \t");
                assert_eq!(resolve(Some((previous, "\n")), level, " \r\t", true), "\t");
            }
        }
    }

    #[test]
    fn test_fresh_line_keeps_plain_prefix() {
        assert_eq!(resolve(Some((Level::Plain, "\n")), Level::Warn, "", false), "");
        assert_eq!(resolve(Some((Level::Warn, "\n")), Level::Plain, "\t", true), "\t");
    }

    #[test]
    fn test_mid_line_overwrite() {
        for level in Level::ALL {
            for previous in Level::ALL {
                assert_eq!(resolve(Some((previous, "")), level, "\r", false), "\r");
                assert_eq!(resolve(Some((previous, "")), level, "\r", true), "\n");
                assert_eq!(resolve(Some((previous, "")), level, "\t\r  ", false), "\t\r  ");
                assert_eq!(resolve(Some((previous, "")), level, "\t\r  ", true), "\n  ");
                assert_eq!(resolve(Some((previous, "")), level, "\r\r\t", true), "\n\t");
            }
        }
    }

    #[test]
    fn test_mid_line_leveled_record_starts_new_line() {
        for previous in Level::ALL {
            for file in [false, true] {
                assert_eq!(resolve(Some((previous, "")), Level::Info, "", file), "\n");
                assert_eq!(resolve(Some((previous, "")), Level::Error, " ", file), "\n ");
                // PLAIN continues the line
                assert_eq!(resolve(Some((previous, "")), Level::Plain, "", file), "");
                assert_eq!(resolve(Some((previous, "")), Level::Plain, " ", file), " ");
            }
        }
    }

    #[test]
    fn test_trim_only_for_overwrite_on_file() {
        let previous = Previous::new(Level::Plain, "");
        let file = FormatOptions::file();
        let console = FormatOptions::console();
        assert!(resolve_continuation(Some(&previous), Level::Plain, "\r", file).trim_message);
        assert!(resolve_continuation(None, Level::Plain, "\r", file).trim_message);
        assert!(!resolve_continuation(Some(&previous), Level::Plain, "\r", console).trim_message);
        assert!(!resolve_continuation(Some(&previous), Level::Plain, " ", file).trim_message);
    }

    #[test]
    fn test_previous_plainness_is_irrelevant() {
        for level in Level::ALL {
            for prefix in ["", " ", "\r", "\t\r"] {
                for terminator in ["", "\n"] {
                    for file in [false, true] {
                        assert_eq!(
                            resolve(Some((Level::Plain, terminator)), level, prefix, file),
                            resolve(Some((Level::Info, terminator)), level, prefix, file),
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let previous = Previous::new(Level::Info, "");
        let first = resolve_continuation(Some(&previous), Level::Plain, "\r", FormatOptions::file());
        let again = resolve_continuation(Some(&previous), Level::Plain, "\r", FormatOptions::file());
        assert_eq!(first, again);
    }
}

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

//! The record formatter.
//!
//! A [`Formatter`] turns [`Record`]s into the exact text a sink writes. It remembers the last
//! record it formatted, because where a record starts depends on how the previous one ended; see
//! [`continuation`] for the rules. One formatter belongs to exactly one sink.

use std::sync::Arc;

use crate::Error;
use crate::color;
use crate::record::Record;
use crate::record::RecordId;
use crate::template::Fields;
use crate::template::Templates;

pub mod continuation;

pub use self::continuation::Continuation;
pub use self::continuation::ContinuationPolicy;
pub use self::continuation::DefaultContinuation;
pub use self::continuation::Previous;
pub use self::continuation::resolve_continuation;

/// The kind of sink a formatter writes for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SinkKind {
    /// A terminal: keeps colors and honors overwrites.
    Console,
    /// A plain text file: strips colors and turns overwrites into new lines.
    File,
}

/// Switches of the formatting pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    /// Remove every escape sequence from the output.
    pub strip_color: bool,
    /// Write a newline where a carriage return would overwrite a partial line.
    pub synthesize_newline_on_overwrite: bool,
    /// Format a record at most once; a repeated record yields the first result unchanged.
    pub dedupe_by_identity: bool,
}

impl FormatOptions {
    /// Options for terminal output.
    pub const fn console() -> FormatOptions {
        FormatOptions {
            strip_color: false,
            synthesize_newline_on_overwrite: false,
            dedupe_by_identity: false,
        }
    }

    /// Options for file output.
    pub const fn file() -> FormatOptions {
        FormatOptions {
            strip_color: true,
            synthesize_newline_on_overwrite: true,
            dedupe_by_identity: true,
        }
    }
}

impl From<SinkKind> for FormatOptions {
    fn from(kind: SinkKind) -> Self {
        match kind {
            SinkKind::Console => FormatOptions::console(),
            SinkKind::File => FormatOptions::file(),
        }
    }
}

/// A formatted record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    text: String,
    repeated: bool,
}

impl Rendered {
    /// The text to write.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Whether this record was already formatted by the same formatter.
    ///
    /// Only reported when [`FormatOptions::dedupe_by_identity`] is on. The text is then the text
    /// of the first pass, and the formatter state did not change.
    pub fn is_repeated(&self) -> bool {
        self.repeated
    }
}

#[derive(Debug)]
struct Memory {
    id: RecordId,
    previous: Previous,
    // kept only when deduplicating
    output: Option<String>,
}

/// Check that a prefix contains only spaces, tabs and carriage returns.
///
/// # Errors
///
/// Return [`Error::InvalidPrefix`] otherwise.
pub fn validate_prefix(prefix: &str) -> Result<(), Error> {
    if prefix.chars().all(|c| matches!(c, ' ' | '\t' | '\r')) {
        Ok(())
    } else {
        Err(Error::InvalidPrefix(prefix.to_string()))
    }
}

/// Check that a terminator contains only newlines.
///
/// # Errors
///
/// Return [`Error::InvalidTerminator`] otherwise.
pub fn validate_terminator(terminator: &str) -> Result<(), Error> {
    if terminator.chars().all(|c| c == '\n') {
        Ok(())
    } else {
        Err(Error::InvalidTerminator(terminator.to_string()))
    }
}

/// A stateful formatter owned by one sink.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use lineforth::Level;
/// use lineforth::Record;
/// use lineforth::format::Formatter;
/// use lineforth::template::Templates;
///
/// let mut formatter = Formatter::file(Arc::new(Templates::default()));
/// let loading = Record::builder().level(Level::Plain).message("loading").terminator("").build();
/// let done = Record::builder().level(Level::Plain).message("done").prefix("\r").build();
///
/// assert_eq!(formatter.format(&loading).unwrap().text(), "loading");
/// assert_eq!(formatter.format(&done).unwrap().text(), "\ndone\n");
/// ```
#[derive(Debug)]
pub struct Formatter {
    templates: Arc<Templates>,
    options: FormatOptions,
    policy: Box<dyn ContinuationPolicy>,
    memory: Option<Memory>,
}

impl Formatter {
    /// Create a formatter with the default continuation policy.
    pub fn new(templates: Arc<Templates>, options: impl Into<FormatOptions>) -> Formatter {
        Formatter {
            templates,
            options: options.into(),
            policy: Box::new(DefaultContinuation::default()),
            memory: None,
        }
    }

    /// Create a formatter for terminal output.
    pub fn console(templates: Arc<Templates>) -> Formatter {
        Formatter::new(templates, SinkKind::Console)
    }

    /// Create a formatter for file output.
    pub fn file(templates: Arc<Templates>) -> Formatter {
        Formatter::new(templates, SinkKind::File)
    }

    /// Replace the continuation policy.
    pub fn with_policy(mut self, policy: impl Into<Box<dyn ContinuationPolicy>>) -> Formatter {
        self.policy = policy.into();
        self
    }

    /// Replace the templates. The formatter forgets the previous record.
    pub fn with_templates(mut self, templates: Arc<Templates>) -> Formatter {
        self.templates = templates;
        self.memory = None;
        self
    }

    /// Replace the pipeline switches. The formatter forgets the previous record.
    pub fn with_options(mut self, options: impl Into<FormatOptions>) -> Formatter {
        self.options = options.into();
        self.memory = None;
        self
    }

    pub fn options(&self) -> FormatOptions {
        self.options
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    /// The last record this formatter formatted successfully, if any.
    pub fn previous(&self) -> Option<&Previous> {
        self.memory.as_ref().map(|memory| &memory.previous)
    }

    /// Forget the previous record, as if nothing had been formatted yet.
    pub fn reset(&mut self) {
        self.memory = None;
    }

    /// Format a record.
    ///
    /// The record is never modified. On error, nothing is rendered and the formatter keeps its
    /// previous state.
    ///
    /// # Errors
    ///
    /// Return [`Error::InvalidPrefix`] or [`Error::InvalidTerminator`] if the record's overrides
    /// contain disallowed characters.
    pub fn format(&mut self, record: &Record) -> Result<Rendered, Error> {
        if self.options.dedupe_by_identity {
            if let Some(Memory {
                id,
                output: Some(output),
                ..
            }) = &self.memory
            {
                if *id == record.id() {
                    return Ok(Rendered {
                        text: output.clone(),
                        repeated: true,
                    });
                }
            }
        }

        let prefix = record.prefix().unwrap_or_default();
        validate_prefix(prefix)?;
        let terminator = record.terminator().unwrap_or("\n");
        validate_terminator(terminator)?;

        let level = record.level();
        let template = self.templates.get(level);

        let color_start = if self.options.strip_color {
            String::new()
        } else {
            match record.color() {
                Some(color) => color::sanitize(color),
                None => template.color().to_string(),
            }
        };
        let color_end = if self.options.strip_color {
            ""
        } else {
            color::END
        };

        let previous = self.memory.as_ref().map(|memory| &memory.previous);
        let continuation = self
            .policy
            .resolve(previous, level, prefix, self.options);

        let mut message = record.message();
        if continuation.trim_message {
            message = message.trim_matches(&[' ', '\t', '\r'][..]);
        }

        let time = self.templates.format_time(record.time());
        let pid = record.pid().to_string();
        let context = record.context();
        let fields = Fields {
            prefix: &continuation.prefix,
            color_start: &color_start,
            time: &time,
            label: template.label(),
            module: context.module(),
            function: context.function().unwrap_or_default(),
            pid: &pid,
            message,
            color_end,
            terminator,
        };

        let mut text = template.layout().render(&fields);
        if self.options.strip_color {
            text = color::strip(&text).into_owned();
        }

        self.memory = Some(Memory {
            id: record.id(),
            previous: Previous::new(level, terminator),
            output: self.options.dedupe_by_identity.then(|| text.clone()),
        });

        Ok(Rendered {
            text,
            repeated: false,
        })
    }
}

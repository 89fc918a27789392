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

//! Per-level display templates.
//!
//! A [`LevelTemplate`] pairs a label and a default color with a [`Layout`]: a format string with
//! `{name}` placeholders. The recognised placeholders are:
//!
//! | placeholder     | substituted with                                  |
//! |-----------------|---------------------------------------------------|
//! | `{prefix}`      | the resolved line prefix (spaces, tabs, `\r`, `\n`) |
//! | `{color_start}` | the record color, empty on uncolored sinks        |
//! | `{time}`        | the record timestamp                              |
//! | `{label}`       | the template label, e.g. `WARN`                   |
//! | `{module}`      | the calling module                                |
//! | `{function}`    | the calling function, empty if unknown            |
//! | `{pid}`         | the process id                                    |
//! | `{message}`     | the message body                                  |
//! | `{color_end}`   | [`color::END`], empty on uncolored sinks          |
//! | `{terminator}`  | the record terminator                             |
//!
//! Use `{{` and `}}` for literal braces.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::Error;
use crate::Level;
use crate::color;

/// Layout of DEBUG and CRITICAL records: the whole line is colored.
pub const FULL_COLOR_LAYOUT: &str =
    "{prefix}{color_start}{time} [{label}] {module} ({pid}) {message}{color_end}{terminator}";

/// Layout of INFO, WARN and ERROR records: only the header is colored.
pub const HEADER_COLOR_LAYOUT: &str =
    "{prefix}{color_start}{time} [{label}] {module} ({pid}){color_end} {message}{terminator}";

/// Layout of PLAIN records.
pub const PLAIN_LAYOUT: &str = "{prefix}{color_start}{message}{color_end}{terminator}";

const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Placeholder {
    Prefix,
    ColorStart,
    Time,
    Label,
    Module,
    Function,
    Pid,
    Message,
    ColorEnd,
    Terminator,
}

impl Placeholder {
    fn parse(name: &str) -> Option<Placeholder> {
        Some(match name {
            "prefix" => Placeholder::Prefix,
            "color_start" => Placeholder::ColorStart,
            "time" => Placeholder::Time,
            "label" => Placeholder::Label,
            "module" => Placeholder::Module,
            "function" => Placeholder::Function,
            "pid" => Placeholder::Pid,
            "message" => Placeholder::Message,
            "color_end" => Placeholder::ColorEnd,
            "terminator" => Placeholder::Terminator,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Placeholder),
}

/// A parsed layout string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    source: String,
    segments: Vec<Segment>,
}

impl Layout {
    /// Parse a layout string.
    ///
    /// # Errors
    ///
    /// Return [`Error::InvalidTemplate`] on an unknown placeholder or an unbalanced brace.
    pub fn parse(source: &str) -> Result<Layout, Error> {
        let mut segments = vec![];
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => name.push(c),
                            None => return Err(Error::invalid_template(source, "unclosed `{`")),
                        }
                    }
                    let field = Placeholder::parse(&name).ok_or_else(|| {
                        Error::invalid_template(source, format!("unknown placeholder `{name}`"))
                    })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                }
                '}' => return Err(Error::invalid_template(source, "unmatched `}`")),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Layout {
            source: source.to_string(),
            segments,
        })
    }

    /// The layout string this layout was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub(crate) fn render(&self, fields: &Fields<'_>) -> String {
        let mut out = String::with_capacity(self.source.len() + fields.message.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => out.push_str(fields.get(*field)),
            }
        }
        out
    }
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layout::parse(s)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Values substituted into a [`Layout`].
#[derive(Debug, Default)]
pub(crate) struct Fields<'a> {
    pub prefix: &'a str,
    pub color_start: &'a str,
    pub time: &'a str,
    pub label: &'a str,
    pub module: &'a str,
    pub function: &'a str,
    pub pid: &'a str,
    pub message: &'a str,
    pub color_end: &'a str,
    pub terminator: &'a str,
}

impl Fields<'_> {
    fn get(&self, field: Placeholder) -> &str {
        match field {
            Placeholder::Prefix => self.prefix,
            Placeholder::ColorStart => self.color_start,
            Placeholder::Time => self.time,
            Placeholder::Label => self.label,
            Placeholder::Module => self.module,
            Placeholder::Function => self.function,
            Placeholder::Pid => self.pid,
            Placeholder::Message => self.message,
            Placeholder::ColorEnd => self.color_end,
            Placeholder::Terminator => self.terminator,
        }
    }
}

/// How records of one level are displayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelTemplate {
    label: String,
    color: String,
    layout: Layout,
}

impl LevelTemplate {
    /// Create a template.
    ///
    /// # Errors
    ///
    /// Return [`Error::InvalidTemplate`] if `layout` cannot be parsed.
    ///
    /// # Examples
    ///
    /// ```
    /// use lineforth::color;
    /// use lineforth::template::LevelTemplate;
    ///
    /// let template = LevelTemplate::new("WARN", color::YELLOW, "<{label}> ({pid}) {message}{terminator}");
    /// assert!(template.is_ok());
    /// ```
    pub fn new(
        label: impl Into<String>,
        color: impl Into<String>,
        layout: &str,
    ) -> Result<LevelTemplate, Error> {
        Ok(LevelTemplate {
            label: label.into(),
            color: color.into(),
            layout: Layout::parse(layout)?,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The escape sequence used when a record carries no color override.
    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn builtin(level: Level) -> LevelTemplate {
        let (color, layout) = match level {
            Level::Debug => (color::GREY, FULL_COLOR_LAYOUT),
            Level::Info => (color::DEFAULT, HEADER_COLOR_LAYOUT),
            Level::Warn => (color::YELLOW, HEADER_COLOR_LAYOUT),
            Level::Error => (color::RED, HEADER_COLOR_LAYOUT),
            Level::Critical => (color::pure::RED, FULL_COLOR_LAYOUT),
            Level::Plain => (color::DEFAULT, PLAIN_LAYOUT),
        };
        LevelTemplate {
            label: level.name().to_string(),
            color: color.to_string(),
            // built-in layouts always parse
            layout: Layout::parse(layout).unwrap(),
        }
    }
}

/// The level registry: one [`LevelTemplate`] for every [`Level`].
///
/// A registry is always complete, so resolving a [`Level`] never fails. Resolving a raw numeric
/// value fails with [`Error::UnknownLevel`] when the value names no level.
///
/// # Examples
///
/// ```
/// use lineforth::Level;
/// use lineforth::template::Templates;
///
/// let templates = Templates::default();
/// assert_eq!(templates.get(Level::Warn).label(), "WARN");
/// assert!(templates.resolve(35).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct Templates {
    // indexed by `Level::index`
    templates: Vec<LevelTemplate>,
    timezone: TimeZone,
    timestamp_format: String,
}

impl Default for Templates {
    fn default() -> Self {
        Templates {
            templates: Level::ALL.into_iter().map(LevelTemplate::builtin).collect(),
            timezone: TimeZone::system(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl Templates {
    /// Build a registry from a mapping of numeric level values to templates.
    ///
    /// # Errors
    ///
    /// Return [`Error::UnknownLevel`] if a key is not a level value, or if a level has no
    /// template.
    pub fn new(mapping: impl IntoIterator<Item = (u8, LevelTemplate)>) -> Result<Templates, Error> {
        let mut slots: [Option<LevelTemplate>; 6] = Default::default();
        for (value, template) in mapping {
            let level = Level::try_from(value)?;
            slots[level.index()] = Some(template);
        }

        let mut templates = Vec::with_capacity(slots.len());
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(template) => templates.push(template),
                None => {
                    let value = Level::from_index(index).map_or(0, Level::value);
                    return Err(Error::UnknownLevel(value));
                }
            }
        }

        Ok(Templates {
            templates,
            ..Templates::default()
        })
    }

    /// Replace the template of one level.
    pub fn with_template(mut self, level: Level, template: LevelTemplate) -> Self {
        self.templates[level.index()] = template;
        self
    }

    /// Set the timezone for timestamps.
    ///
    /// Default to the system timezone.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.timezone = tz;
        self
    }

    /// Set the [strftime](jiff::fmt::strtime) format of timestamps.
    ///
    /// Default to `%Y-%m-%d %H:%M:%S,%3f`.
    pub fn timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    /// The template of a level.
    pub fn get(&self, level: Level) -> &LevelTemplate {
        &self.templates[level.index()]
    }

    /// The template of a numeric level value.
    ///
    /// # Errors
    ///
    /// Return [`Error::UnknownLevel`] if no level has this value.
    pub fn resolve(&self, value: u8) -> Result<&LevelTemplate, Error> {
        Level::try_from(value).map(|level| self.get(level))
    }

    pub(crate) fn format_time(&self, ts: Timestamp) -> String {
        let zoned = ts.to_zoned(self.timezone.clone());
        // an unusable format falls back to RFC 9557 rather than failing the record
        jiff::fmt::strtime::format(&self.timestamp_format, &zoned)
            .unwrap_or_else(|_| zoned.to_string())
    }
}

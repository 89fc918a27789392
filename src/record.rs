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

//! Log record and caller context.

use std::borrow::Cow;
use std::panic::Location;
use std::path::Path;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use jiff::Timestamp;

use crate::Level;

static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

/// The identity of a [`Record`].
///
/// Every built record gets a fresh id; clones keep it, since a clone stands for the same logical
/// event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordId(u64);

impl RecordId {
    fn next() -> RecordId {
        RecordId(NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Where a log call came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Context {
    module: Cow<'static, str>,
    function: Option<Cow<'static, str>>,
}

impl Context {
    /// Create a context for a module, with no function name.
    pub fn new(module: impl Into<Cow<'static, str>>) -> Context {
        Context {
            module: module.into(),
            function: None,
        }
    }

    /// Set the function name.
    pub fn with_function(mut self, function: impl Into<Cow<'static, str>>) -> Context {
        self.function = Some(function.into());
        self
    }

    /// The context of the caller, with the module taken from the caller's file stem.
    ///
    /// The function name is unknown; use [`context!`](crate::context) to capture it.
    #[track_caller]
    pub fn caller() -> Context {
        Context::from_location(Location::caller())
    }

    pub(crate) fn from_location(location: &'static Location<'static>) -> Context {
        let module = Path::new(location.file())
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        Context {
            module: Cow::Borrowed(module),
            function: None,
        }
    }

    /// Build a context from a function's type name such as `my_app::db::connect::{{closure}}`.
    ///
    /// The last path segment that is not a closure marker is the function, the one before it is
    /// the module. This is what [`context!`](crate::context) feeds in.
    pub fn from_function_path(path: &'static str) -> Context {
        let mut segments = path
            .rsplit("::")
            .filter(|segment| !segment.starts_with('{'));
        let mut last = segments.next();
        let mut module = segments.next();
        if module.is_none() {
            module = last.take();
        }
        Context {
            module: Cow::Borrowed(module.unwrap_or_default()),
            function: last.map(Cow::Borrowed),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }
}

/// Capture the [`Context`] of the enclosing function.
///
/// ```
/// fn connect() -> lineforth::Context {
///     lineforth::context!()
/// }
///
/// let context = connect();
/// assert_eq!(context.function(), Some("connect"));
/// ```
#[macro_export]
macro_rules! context {
    () => {{
        fn __lineforth_here() {}
        fn __lineforth_type_name<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __lineforth_type_name(__lineforth_here);
        let name = name.strip_suffix("::__lineforth_here").unwrap_or(name);
        $crate::Context::from_function_path(name)
    }};
}

/// The unit of work entering a formatter.
///
/// Overrides are stored as given; they are validated when the record is formatted, so a record
/// with a bad prefix is rejected by every sink it reaches and written by none.
#[derive(Clone, Debug)]
pub struct Record {
    id: RecordId,
    time: Timestamp,
    pid: u32,
    level: Level,
    message: String,
    prefix: Option<String>,
    terminator: Option<String>,
    color: Option<String>,
    context: Context,
}

impl Record {
    /// Returns a new builder.
    #[track_caller]
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// The observed time.
    pub fn time(&self) -> Timestamp {
        self.time
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// The message body.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The requested prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The requested terminator, if any.
    pub fn terminator(&self) -> Option<&str> {
        self.terminator.as_deref()
    }

    /// The color override, if any.
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }
}

/// Builder for [`Record`].
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl Default for RecordBuilder {
    #[track_caller]
    fn default() -> Self {
        RecordBuilder {
            record: Record {
                id: RecordId(0),
                time: Timestamp::now(),
                pid: std::process::id(),
                level: Level::Info,
                message: String::new(),
                prefix: None,
                terminator: None,
                color: None,
                context: Context::caller(),
            },
        }
    }
}

impl RecordBuilder {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.record.message = message.into();
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.record.level = level;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.record.prefix = Some(prefix.into());
        self
    }

    pub fn terminator(mut self, terminator: impl Into<String>) -> Self {
        self.record.terminator = Some(terminator.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.record.color = Some(color.into());
        self
    }

    pub fn context(mut self, context: Context) -> Self {
        self.record.context = context;
        self
    }

    pub fn time(mut self, time: Timestamp) -> Self {
        self.record.time = time;
        self
    }

    pub fn pid(mut self, pid: u32) -> Self {
        self.record.pid = pid;
        self
    }

    /// Build the record and assign it a fresh identity.
    pub fn build(mut self) -> Record {
        self.record.id = RecordId::next();
        self.record
    }
}

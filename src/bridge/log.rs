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

use std::borrow::Cow;

use crate::Level;
use crate::Logger;
use crate::logger::handle_log_error;
use crate::record::Context;
use crate::record::Record;

#[derive(Default)]
struct Overrides {
    prefix: Option<String>,
    terminator: Option<String>,
    color: Option<String>,
    plain: bool,
}

impl<'kvs> log::kv::VisitSource<'kvs> for Overrides {
    fn visit_pair(
        &mut self,
        key: log::kv::Key<'kvs>,
        value: log::kv::Value<'kvs>,
    ) -> Result<(), log::kv::Error> {
        match key.as_str() {
            "prefix" => self.prefix = Some(value.to_string()),
            "terminator" => self.terminator = Some(value.to_string()),
            "color" => self.color = Some(value.to_string()),
            "plain" => self.plain = value.to_bool().unwrap_or(false),
            _ => {}
        }
        Ok(())
    }
}

fn context(record: &log::Record) -> Context {
    let module = match record.module_path_static() {
        Some(path) => Cow::Borrowed(path.rsplit("::").next().unwrap_or(path)),
        None => {
            let path = record.module_path().unwrap_or(record.target());
            Cow::Owned(path.rsplit("::").next().unwrap_or(path).to_string())
        }
    };
    Context::new(module)
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        Logger::enabled(self, metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        let mut overrides = Overrides::default();
        // the visitor never fails
        let _ = record.key_values().visit(&mut overrides);

        let level = if overrides.plain {
            Level::Plain
        } else {
            Level::from(record.level())
        };
        if !Logger::enabled(self, level) {
            return;
        }

        let mut builder = Record::builder()
            .level(level)
            .message(record.args().to_string())
            .prefix(overrides.prefix.unwrap_or_default())
            .terminator(overrides.terminator.unwrap_or_else(|| "\n".to_string()))
            .context(context(record));
        if let Some(color) = overrides.color {
            builder = builder.color(color);
        }

        if let Err(err) = self.dispatch(&builder.build()) {
            handle_log_error(record, err);
        }
    }

    fn flush(&self) {
        let _ = Logger::flush(self);
    }
}

impl Logger {
    /// Install this logger as the `log` crate's global logger.
    ///
    /// The global maximum level is set to `Trace`; the logger's own threshold does the filtering.
    ///
    /// # Errors
    ///
    /// Return an error if the `log` crate global logger has already been set.
    ///
    /// # Examples
    ///
    /// ```
    /// let logger = lineforth::builder("app").build().unwrap();
    /// let logger = logger.try_apply().unwrap();
    ///
    /// log::info!("routed through {}", logger.name());
    /// log::info!(prefix = "\r", terminator = "", plain = true; "50%");
    /// ```
    pub fn try_apply(self) -> Result<&'static Logger, log::SetLoggerError> {
        let logger: &'static Logger = Box::leak(Box::new(self));
        log::set_logger(logger)?;
        log::set_max_level(log::LevelFilter::Trace);
        Ok(logger)
    }

    /// Install this logger as the `log` crate's global logger.
    ///
    /// # Panics
    ///
    /// Panic if the `log` crate global logger has already been set.
    pub fn apply(self) -> &'static Logger {
        self.try_apply()
            .expect("Logger::apply must be called before the log crate global logger initialized")
    }
}

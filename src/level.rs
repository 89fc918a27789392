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

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Severity of a log record.
///
/// Levels are totally ordered by their numeric value:
///
/// ```text
/// DEBUG(10) < INFO(20) < WARN(30) < ERROR(40) < CRITICAL(50) < PLAIN(60)
/// ```
///
/// `Plain` is not "more severe" than `Critical`; it marks unformatted pass-through output. It
/// sorts highest so that any threshold lets it through.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug = 10,
    Info = 20,
    Warn = 30,
    Error = 40,
    Critical = 50,
    Plain = 60,
}

impl Level {
    /// All levels, from least to most severe.
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Critical,
        Level::Plain,
    ];

    /// The numeric value of this level.
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// The canonical upper-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
            Level::Plain => "PLAIN",
        }
    }

    /// Whether this is the unformatted pass-through pseudo-level.
    pub const fn is_plain(self) -> bool {
        matches!(self, Level::Plain)
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Level::Debug => 0,
            Level::Info => 1,
            Level::Warn => 2,
            Level::Error => 3,
            Level::Critical => 4,
            Level::Plain => 5,
        }
    }

    pub(crate) fn from_index(index: usize) -> Option<Level> {
        Level::ALL.get(index).copied()
    }
}

impl TryFrom<u8> for Level {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        Level::ALL
            .into_iter()
            .find(|level| level.value() == value)
            .ok_or(Error::UnknownLevel(value))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.value()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Parse a level from its name (case-insensitive, `WARNING` is accepted) or its numeric value.
impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(value) = s.parse::<u8>() {
            return Level::try_from(value);
        }

        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARN" | "WARNING" => Ok(Level::Warn),
            "ERROR" => Ok(Level::Error),
            "CRITICAL" => Ok(Level::Critical),
            "PLAIN" => Ok(Level::Plain),
            _ => Err(Error::UnknownLevel(0)),
        }
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warn,
            log::Level::Info => Level::Info,
            log::Level::Debug | log::Level::Trace => Level::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_order() {
        for pair in Level::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].value() < pair[1].value());
        }
        assert!(Level::Plain > Level::Critical);
    }

    #[test]
    fn test_numeric_round_trip() {
        for level in Level::ALL {
            assert_eq!(Level::try_from(level.value()).unwrap(), level);
            assert_eq!(Level::from_index(level.index()), Some(level));
        }
        assert!(matches!(Level::try_from(15), Err(Error::UnknownLevel(15))));
        assert!(matches!(Level::try_from(0), Err(Error::UnknownLevel(0))));
    }

    #[test]
    fn test_parse() {
        assert_eq!("info".parse::<Level>().unwrap(), Level::Info);
        assert_eq!("Warning".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!(" 40 ".parse::<Level>().unwrap(), Level::Error);
        assert_eq!("plain".parse::<Level>().unwrap(), Level::Plain);
        assert!("verbose".parse::<Level>().is_err());
        assert!("41".parse::<Level>().is_err());
    }

    #[test]
    fn test_display_pads() {
        assert_eq!(format!("{:>8}", Level::Warn), "    WARN");
        assert_eq!(Level::Critical.to_string(), "CRITICAL");
    }
}

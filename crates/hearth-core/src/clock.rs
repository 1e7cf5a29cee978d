use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CalendarError;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A validated wall-clock time of day, stored as minutes since midnight.
///
/// Parsed from the zero-padded 24-hour `HH:MM` form the event service stores.
/// A trailing `:SS` is tolerated and dropped. Ordering matches the lexical
/// ordering of the canonical `HH:MM` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    minutes: u32,
}

impl ClockTime {
    pub const MIDNIGHT: Self = Self { minutes: 0 };
    pub const LAST_MINUTE: Self = Self {
        minutes: MINUTES_PER_DAY - 1,
    };

    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, CalendarError> {
        if hour > 23 || minute > 59 {
            return Err(CalendarError::InvalidClockTime {
                raw: format!("{hour:02}:{minute:02}"),
            });
        }
        Ok(Self {
            minutes: hour * 60 + minute,
        })
    }

    /// Clamps into `00:00..=23:59`.
    #[must_use]
    pub fn from_minutes_clamped(minutes: i64) -> Self {
        let clamped = minutes.clamp(0, i64::from(Self::LAST_MINUTE.minutes));
        Self {
            minutes: u32::try_from(clamped).unwrap_or(0),
        }
    }

    #[must_use]
    pub fn minutes_since_midnight(self) -> u32 {
        self.minutes
    }

    #[must_use]
    pub fn hour(self) -> u32 {
        self.minutes / 60
    }

    #[must_use]
    pub fn minute(self) -> u32 {
        self.minutes % 60
    }
}

fn clock_re() -> Option<&'static Regex> {
    static CLOCK_RE: OnceLock<Option<Regex>> = OnceLock::new();
    CLOCK_RE
        .get_or_init(|| {
            Regex::new(r"^(?P<hour>\d{2}):(?P<minute>\d{2})(?::\d{2})?$")
                .map_err(|err| tracing::error!(error = %err, "clock regex failed to compile"))
                .ok()
        })
        .as_ref()
}

impl FromStr for ClockTime {
    type Err = CalendarError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || CalendarError::InvalidClockTime {
            raw: raw.to_string(),
        };

        let caps = clock_re()
            .and_then(|re| re.captures(raw.trim()))
            .ok_or_else(invalid)?;
        let hour = caps
            .name("hour")
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .ok_or_else(invalid)?;
        let minute = caps
            .name("minute")
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .ok_or_else(invalid)?;

        Self::from_hm(hour, minute).map_err(|_| invalid())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

//! Scheduler configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Process-wide scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// IANA zone every trigger expression is evaluated in.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// How often the job list is re-fetched after the startup pass.
    #[serde(default)]
    pub poll_interval: PollInterval,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            poll_interval: PollInterval::default(),
        }
    }
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

/// Default reconciliation interval (15 minutes).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 900;

/// Reconciliation polling: a number of seconds, or `"disabled"`.
///
/// When disabled, reconciliation only happens once at startup and when
/// triggered out-of-band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PollIntervalRepr", into = "PollIntervalRepr")]
pub enum PollInterval {
    Seconds(u64),
    Disabled,
}

impl PollInterval {
    pub fn is_disabled(&self) -> bool {
        matches!(self, PollInterval::Disabled)
    }

    /// Interval as a duration, `None` when polling is disabled.
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            PollInterval::Seconds(secs) => Some(Duration::from_secs(*secs)),
            PollInterval::Disabled => None,
        }
    }
}

impl Default for PollInterval {
    fn default() -> Self {
        PollInterval::Seconds(DEFAULT_POLL_INTERVAL_SECS)
    }
}

impl fmt::Display for PollInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollInterval::Seconds(secs) => write!(f, "{}s", secs),
            PollInterval::Disabled => write!(f, "disabled"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PollIntervalRepr {
    Seconds(u64),
    Keyword(String),
}

impl TryFrom<PollIntervalRepr> for PollInterval {
    type Error = String;

    fn try_from(repr: PollIntervalRepr) -> Result<Self, Self::Error> {
        match repr {
            PollIntervalRepr::Seconds(secs) => Ok(PollInterval::Seconds(secs)),
            PollIntervalRepr::Keyword(word) if word.eq_ignore_ascii_case("disabled") => {
                Ok(PollInterval::Disabled)
            }
            PollIntervalRepr::Keyword(word) => Err(format!(
                "expected a number of seconds or \"disabled\", got \"{}\"",
                word
            )),
        }
    }
}

impl From<PollInterval> for PollIntervalRepr {
    fn from(value: PollInterval) -> Self {
        match value {
            PollInterval::Seconds(secs) => PollIntervalRepr::Seconds(secs),
            PollInterval::Disabled => PollIntervalRepr::Keyword("disabled".to_string()),
        }
    }
}

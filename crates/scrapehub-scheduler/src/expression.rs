//! Trigger expression parsing.
//!
//! Jobs carry standard five-field cron patterns
//! (`minute hour day-of-month month day-of-week`). A leading seconds field
//! is also accepted. Expressions are compiled into a [`cron::Schedule`],
//! which always expects seconds and numbers weekdays from 1 (Sunday), so
//! the weekday field is rewritten to day names before compiling.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone};
use cron::Schedule;

use crate::error::TriggerParseError;

const DAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// A parsed, schedulable trigger expression.
#[derive(Clone)]
pub struct TriggerExpression {
    source: String,
    schedule: Schedule,
}

impl TriggerExpression {
    /// Parse a five- or six-field cron expression.
    pub fn parse(expression: &str) -> Result<Self, TriggerParseError> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        let (seconds, rest) = match fields.len() {
            5 => ("0", &fields[..]),
            6 => (fields[0], &fields[1..]),
            found => {
                return Err(TriggerParseError::FieldCount {
                    expression: expression.to_string(),
                    found,
                });
            }
        };

        let day_of_week = normalize_day_of_week(rest[4]).map_err(|reason| {
            TriggerParseError::Invalid {
                expression: expression.to_string(),
                reason,
            }
        })?;
        let compiled = format!(
            "{} {} {} {} {} {}",
            seconds, rest[0], rest[1], rest[2], rest[3], day_of_week
        );

        let schedule = Schedule::from_str(&compiled).map_err(|e| TriggerParseError::Invalid {
            expression: expression.to_string(),
            reason: e.to_string(),
        })?;

        if schedule.upcoming(chrono::Utc).next().is_none() {
            return Err(TriggerParseError::Invalid {
                expression: expression.to_string(),
                reason: "expression never fires".to_string(),
            });
        }

        Ok(Self {
            source: expression.to_string(),
            schedule,
        })
    }

    /// The expression as written by the user.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// First fire time strictly after `after`, in the same zone.
    pub fn next_after<Z: TimeZone>(&self, after: &DateTime<Z>) -> Option<DateTime<Z>> {
        self.schedule.after(after).next()
    }

    /// Next fire time from now in the given zone.
    pub fn next_in<Z: TimeZone>(&self, tz: Z) -> Option<DateTime<Z>> {
        self.schedule.upcoming(tz).next()
    }
}

impl fmt::Debug for TriggerExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TriggerExpression").field(&self.source).finish()
    }
}

impl fmt::Display for TriggerExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for TriggerExpression {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for TriggerExpression {}

impl FromStr for TriggerExpression {
    type Err = TriggerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Rewrite numeric weekday lists (`0`-`7`, Sunday = 0 or 7) into day names.
///
/// Elements that already use names, and the bare wildcards, pass through.
fn normalize_day_of_week(field: &str) -> Result<String, String> {
    if field == "*" || field == "?" || field.chars().any(|c| c.is_ascii_alphabetic()) {
        return Ok(field.to_string());
    }

    let mut days = BTreeSet::new();
    for element in field.split(',') {
        expand_day_element(element, &mut days)?;
    }

    if days.is_empty() {
        return Err(format!("empty day-of-week field '{}'", field));
    }
    if days.len() == DAY_NAMES.len() {
        return Ok("*".to_string());
    }

    Ok(days
        .into_iter()
        .map(|d| DAY_NAMES[d])
        .collect::<Vec<_>>()
        .join(","))
}

fn expand_day_element(element: &str, days: &mut BTreeSet<usize>) -> Result<(), String> {
    let (base, step) = match element.split_once('/') {
        Some((base, step)) => {
            let step: usize = step
                .parse()
                .map_err(|_| format!("invalid day-of-week step '{}'", step))?;
            if step == 0 {
                return Err("day-of-week step cannot be 0".to_string());
            }
            (base, step)
        }
        None => (element, 1),
    };

    let (start, end) = if base == "*" {
        (0, 6)
    } else if let Some((start, end)) = base.split_once('-') {
        (parse_day(start)?, parse_day(end)?)
    } else {
        let start = parse_day(base)?;
        // `5/2` means "from Friday, every second day".
        let end = if element.contains('/') { 7 } else { start };
        (start, end)
    };

    if start > end {
        return Err(format!("day-of-week range '{}' runs backwards", base));
    }

    for day in (start..=end).step_by(step) {
        days.insert(day % 7);
    }
    Ok(())
}

fn parse_day(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(day) if day <= 7 => Ok(day),
        _ => Err(format!("day-of-week value '{}' is not between 0 and 7", value)),
    }
}

#[cfg(test)]
#[path = "expression_tests.rs"]
mod tests;

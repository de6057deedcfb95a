use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};

use crate::{
    error::TrackerError,
    utils::clock::{Clock, DefaultClock, FixedClock},
};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Parses user input such as "yesterday", "3 days ago" or "15/03/2025" relative to `now`.
pub fn parse_moment(value: &str, date_style: DateStyle, now: DateTime<Local>) -> Result<DateTime<Utc>> {
    match parse_date_string(value, now, date_style.into()) {
        Ok(v) => Ok(v.with_timezone(&Utc)),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {value:?}: {e}"),
            )
            .into()),
    }
}

/// Parses a back-dated moment. Moments after `now` are rejected.
pub fn resolve_moment(
    at: Option<&str>,
    date_style: DateStyle,
    now: DateTime<Local>,
) -> Result<Option<DateTime<Utc>>> {
    let Some(value) = at else {
        return Ok(None);
    };
    let moment = parse_moment(value, date_style, now)?;
    if moment > now.with_timezone(&Utc) {
        return Err(TrackerError::InvalidMoment(format!(
            "{value:?} is in the future, only past moments can be recorded"
        ))
        .into());
    }
    Ok(Some(moment))
}

/// Clock for a single command. Commands run "now" unless the user back-dates them with `--at`.
pub fn command_clock(at: Option<&str>, date_style: DateStyle) -> Result<Box<dyn Clock>> {
    match resolve_moment(at, date_style, Local::now())? {
        Some(moment) => Ok(Box::new(FixedClock(moment))),
        None => Ok(Box::new(DefaultClock)),
    }
}

use std::{fmt::Display, ops::RangeInclusive};

use chrono::{DateTime, Utc};

use crate::utils::time::floor_days_between;

use super::entities::{CycleRecord, CycleStore};

/// Used whenever the history is too short or too irregular to compute an average.
pub const DEFAULT_CYCLE_LENGTH: u32 = 28;

/// Gaps between starts outside of `(0, MAX_CYCLE_GAP)` days are treated as gaps in tracking rather
/// than real cycles.
const MAX_CYCLE_GAP: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menstrual,
    Follicular,
    Ovulation,
    Luteal,
}

#[derive(Debug, PartialEq, Eq)]
pub struct PhaseInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub tip: &'static str,
}

static MENSTRUAL_INFO: PhaseInfo = PhaseInfo {
    name: "Menstrual Phase",
    description: "Your period - shedding of the uterine lining",
    tip: "Rest, stay hydrated, use heating pads for cramps",
};

static FOLLICULAR_INFO: PhaseInfo = PhaseInfo {
    name: "Follicular Phase",
    description: "Preparing for ovulation - estrogen rises",
    tip: "Great energy levels, good time for workouts and new projects",
};

static OVULATION_INFO: PhaseInfo = PhaseInfo {
    name: "Ovulation Phase",
    description: "Most fertile days - egg is released",
    tip: "Peak energy and mood, highest fertility",
};

static LUTEAL_INFO: PhaseInfo = PhaseInfo {
    name: "Luteal Phase",
    description: "Preparing for next period - progesterone rises",
    tip: "May feel PMS symptoms, practice self-care",
};

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Menstrual,
        Phase::Follicular,
        Phase::Ovulation,
        Phase::Luteal,
    ];

    pub fn info(self) -> &'static PhaseInfo {
        match self {
            Phase::Menstrual => &MENSTRUAL_INFO,
            Phase::Follicular => &FOLLICULAR_INFO,
            Phase::Ovulation => &OVULATION_INFO,
            Phase::Luteal => &LUTEAL_INFO,
        }
    }

    /// Days of a cycle of `cycle_length` days covered by the phase. The luteal phase stretches to
    /// the end of the cycle and is empty for cycles shorter than 17 days.
    pub fn days(self, cycle_length: u32) -> RangeInclusive<i64> {
        match self {
            Phase::Menstrual => 1..=5,
            Phase::Follicular => 6..=13,
            Phase::Ovulation => 14..=16,
            Phase::Luteal => 17..=cycle_length as i64,
        }
    }

    /// Phase of `day`, or `None` when the day falls outside of the expected cycle.
    pub fn for_day(day: i64, cycle_length: u32) -> Option<Phase> {
        if day < 1 || day > cycle_length as i64 {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|phase| phase.days(cycle_length).contains(&day))
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Menstrual => write!(f, "menstrual"),
            Phase::Follicular => write!(f, "follicular"),
            Phase::Ovulation => write!(f, "ovulation"),
            Phase::Luteal => write!(f, "luteal"),
        }
    }
}

/// Mean gap in days between consecutive period starts, or `None` if no usable gap exists.
/// `cycles` is expected most recent first.
pub fn average_cycle_length(cycles: &[CycleRecord]) -> Option<u32> {
    let gaps = cycles
        .windows(2)
        .map(|pair| floor_days_between(pair[1].start_date, pair[0].start_date))
        .filter(|gap| *gap > 0 && *gap < MAX_CYCLE_GAP)
        .collect::<Vec<_>>();

    rounded_mean(&gaps).and_then(|v| u32::try_from(v).ok())
}

/// Same as [average_cycle_length] but never without an answer.
pub fn estimated_cycle_length(cycles: &[CycleRecord]) -> u32 {
    average_cycle_length(cycles).unwrap_or(DEFAULT_CYCLE_LENGTH)
}

/// Arithmetic mean rounded half up.
pub(crate) fn rounded_mean(values: &[i64]) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    let sum: i64 = values.iter().sum();
    Some((sum as f64 / values.len() as f64 + 0.5).floor() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseReport {
    /// Day of the current cycle, the first day of the period being day 1.
    pub current_day: i64,
    pub cycle_length: u32,
    pub phase: Option<Phase>,
}

/// Works out where in the cycle `now` is. `None` when nothing was ever tracked.
pub fn classify_phase(store: &CycleStore, now: DateTime<Utc>) -> Option<PhaseReport> {
    let reference = store.reference_start()?;
    let current_day = floor_days_between(reference, now) + 1;
    let cycle_length = estimated_cycle_length(&store.cycles);

    Some(PhaseReport {
        current_day,
        cycle_length,
        phase: Phase::for_day(current_day, cycle_length),
    })
}

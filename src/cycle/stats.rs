use std::fmt::Display;

use chrono::{DateTime, Duration, Utc};

use crate::utils::time::ceil_days_between;

use super::{
    entities::CycleStore,
    phase::{average_cycle_length, rounded_mean, DEFAULT_CYCLE_LENGTH},
};

/// How far away the predicted period is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    InDays(i64),
    Today,
    Late(i64),
}

impl Countdown {
    pub fn from_days_until(days_until: i64) -> Self {
        match days_until {
            d if d > 0 => Countdown::InDays(d),
            0 => Countdown::Today,
            d => Countdown::Late(d.abs()),
        }
    }
}

impl Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Countdown::InDays(1) => write!(f, "in 1 day"),
            Countdown::InDays(days) => write!(f, "in {days} days"),
            Countdown::Today => write!(f, "today"),
            Countdown::Late(1) => write!(f, "1 day late"),
            Countdown::Late(days) => write!(f, "{days} days late"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextPeriod {
    pub predicted: DateTime<Utc>,
    /// Positive when the period is still ahead, negative when it is late.
    pub days_until: i64,
}

impl NextPeriod {
    pub fn countdown(&self) -> Countdown {
        Countdown::from_days_until(self.days_until)
    }
}

/// Everything shown on the statistics panel. `None` fields are displayed as "no data".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub total_cycles: usize,
    pub average_period_length: Option<u32>,
    /// Only set when it was computed from the history, unlike the phase classifier which falls
    /// back to [DEFAULT_CYCLE_LENGTH].
    pub average_cycle_length: Option<u32>,
    pub next_period: Option<NextPeriod>,
}

pub fn total_cycles(store: &CycleStore) -> usize {
    store.cycles.len() + usize::from(store.is_active())
}

pub fn average_period_length(store: &CycleStore) -> Option<u32> {
    let lengths = store
        .cycles
        .iter()
        .filter_map(|cycle| cycle.period_length_days())
        .filter(|length| *length > 0)
        .collect::<Vec<_>>();
    rounded_mean(&lengths).and_then(|v| u32::try_from(v).ok())
}

/// Predicts the start of the next period from the last recorded one.
pub fn predict_next_period(store: &CycleStore, now: DateTime<Utc>) -> Option<NextPeriod> {
    let last_start = store.cycles.first()?.start_date;
    let cycle_length = average_cycle_length(&store.cycles).unwrap_or(DEFAULT_CYCLE_LENGTH);
    let predicted = last_start + Duration::days(cycle_length as i64);

    Some(NextPeriod {
        predicted,
        days_until: ceil_days_between(now, predicted),
    })
}

pub fn compute_stats(store: &CycleStore, now: DateTime<Utc>) -> CycleStats {
    CycleStats {
        total_cycles: total_cycles(store),
        average_period_length: average_period_length(store),
        average_cycle_length: average_cycle_length(&store.cycles),
        next_period: predict_next_period(store, now),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::cycle::entities::{ActivePeriod, CycleRecord, CycleStore};

    use super::{compute_stats, predict_next_period, Countdown, NextPeriod};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 11, 20, 12, 0, 0).unwrap() + Duration::days(n)
    }

    fn record(start: i64, end: Option<i64>) -> CycleRecord {
        CycleRecord {
            start_date: day(start),
            end_date: end.map(day),
            symptom_logs: vec![],
        }
    }

    #[test]
    fn test_empty_store_has_no_data() {
        let stats = compute_stats(&CycleStore::default(), day(0));

        assert_eq!(stats.total_cycles, 0);
        assert_eq!(stats.average_period_length, None);
        assert_eq!(stats.average_cycle_length, None);
        assert_eq!(stats.next_period, None);
    }

    #[test]
    fn test_active_period_counts_as_cycle() {
        let store = CycleStore {
            cycles: vec![],
            current_period: Some(ActivePeriod::new(day(0))),
            symptoms: vec![],
        };

        let stats = compute_stats(&store, day(2));
        assert_eq!(stats.total_cycles, 1);
        assert_eq!(stats.next_period, None);
    }

    #[test]
    fn test_average_period_length_skips_open_records() {
        let store = CycleStore {
            cycles: vec![record(60, None), record(30, Some(35)), record(0, Some(3))],
            current_period: None,
            symptoms: vec![],
        };

        let stats = compute_stats(&store, day(61));

        // 6 and 4 days
        assert_eq!(stats.average_period_length, Some(5));
        assert_eq!(stats.average_cycle_length, Some(30));
        assert_eq!(stats.total_cycles, 3);
    }

    #[test]
    fn test_average_period_length_ignores_inverted_records() {
        let store = CycleStore {
            cycles: vec![record(30, Some(20)), record(0, Some(4))],
            current_period: None,
            symptoms: vec![],
        };

        assert_eq!(compute_stats(&store, day(31)).average_period_length, Some(5));

        let only_inverted = CycleStore {
            cycles: vec![record(30, Some(0))],
            current_period: None,
            symptoms: vec![],
        };
        assert_eq!(
            compute_stats(&only_inverted, day(31)).average_period_length,
            None
        );
    }

    #[test]
    fn test_single_cycle_predicts_with_default_length() {
        let store = CycleStore {
            cycles: vec![record(0, Some(4))],
            current_period: None,
            symptoms: vec![],
        };

        let stats = compute_stats(&store, day(30));

        assert_eq!(stats.average_cycle_length, None);
        assert_eq!(
            stats.next_period,
            Some(NextPeriod {
                predicted: day(28),
                days_until: -2,
            })
        );
        assert_eq!(stats.next_period.unwrap().countdown().to_string(), "2 days late");
    }

    #[test]
    fn test_prediction_countdown() {
        let store = CycleStore {
            cycles: vec![record(28, Some(32)), record(0, Some(5))],
            current_period: None,
            symptoms: vec![],
        };

        let ahead = predict_next_period(&store, day(40) + Duration::hours(1)).unwrap();
        assert_eq!(ahead.predicted, day(56));
        assert_eq!(ahead.days_until, 16);
        assert_eq!(ahead.countdown(), Countdown::InDays(16));

        let today = predict_next_period(&store, day(56)).unwrap();
        assert_eq!(today.countdown(), Countdown::Today);
        assert_eq!(today.countdown().to_string(), "today");

        let almost = predict_next_period(&store, day(56) - Duration::hours(3)).unwrap();
        assert_eq!(almost.countdown().to_string(), "in 1 day");
    }
}

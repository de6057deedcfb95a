//! Mutations of [CycleStore]. Every operation checks its precondition before touching anything, so
//! a failed call leaves the store exactly as it was.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::error::{TrackerError, TrackerResult};

use super::entities::{ActivePeriod, CycleStore, FlowLevel, SymptomLog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodState {
    Idle,
    Active,
}

impl CycleStore {
    pub fn state(&self) -> PeriodState {
        if self.is_active() {
            PeriodState::Active
        } else {
            PeriodState::Idle
        }
    }

    /// End of the most recent cycle, or its start for records without an end.
    fn latest_recorded_moment(&self) -> Option<DateTime<Utc>> {
        self.cycles
            .first()
            .map(|cycle| cycle.end_date.unwrap_or(cycle.start_date).max(cycle.start_date))
    }

    pub fn start_period(&mut self, now: DateTime<Utc>) -> TrackerResult<()> {
        if self.current_period.is_some() {
            return Err(TrackerError::AlreadyActive);
        }
        if let Some(latest) = self.latest_recorded_moment() {
            if now <= latest {
                return Err(TrackerError::InvalidMoment(format!(
                    "A new period has to start after the last recorded one ({latest})"
                )));
            }
        }
        self.current_period = Some(ActivePeriod::new(now));
        Ok(())
    }

    /// Closes the running period and puts it at the front of the history.
    pub fn end_period(&mut self, now: DateTime<Utc>) -> TrackerResult<()> {
        let period = self
            .current_period
            .take()
            .ok_or(TrackerError::NoActivePeriod)?;
        // A back-dated end never precedes the start.
        let end_date = now.max(period.start_date);
        self.cycles.insert(0, period.finish(end_date));
        Ok(())
    }

    /// Records a log in the global history and, while a period runs, in that period too.
    pub fn log_symptoms(
        &mut self,
        now: DateTime<Utc>,
        symptoms: BTreeSet<String>,
        flow: Option<FlowLevel>,
        note: Option<String>,
    ) -> SymptomLog {
        let log = SymptomLog {
            date: now,
            symptoms,
            flow,
            note: note
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        };

        self.symptoms.insert(0, log.clone());
        if let Some(period) = self.current_period.as_mut() {
            period.symptom_logs.push(log.clone());
        }
        log
    }

    pub fn delete_cycle(&mut self, index: usize) -> TrackerResult<()> {
        if index >= self.cycles.len() {
            return Err(TrackerError::IndexOutOfRange {
                index,
                len: self.cycles.len(),
            });
        }
        self.cycles.remove(index);
        Ok(())
    }
}

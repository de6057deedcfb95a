use std::{collections::BTreeSet, fmt::Display};

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::time::floor_days_between;

/// How heavy the flow was when the symptoms were logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FlowLevel {
    None,
    Light,
    Medium,
    Heavy,
}

impl Display for FlowLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowLevel::None => write!(f, "none"),
            FlowLevel::Light => write!(f, "light"),
            FlowLevel::Medium => write!(f, "medium"),
            FlowLevel::Heavy => write!(f, "heavy"),
        }
    }
}

/// A point in time record of how the user felt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomLog {
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub symptoms: BTreeSet<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub flow: Option<FlowLevel>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub note: Option<String>,
}

/// A finished period. Only ever removed, never edited, once it lands in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleRecord {
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, rename = "symptoms", alias = "symptomLogs")]
    pub symptom_logs: Vec<SymptomLog>,
}

impl CycleRecord {
    /// Length of the bleeding in days, counting the first and the last day. `None` for records
    /// without an end date.
    pub fn period_length_days(&self) -> Option<i64> {
        self.end_date
            .map(|end| floor_days_between(self.start_date, end) + 1)
    }
}

/// The period that is currently in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePeriod {
    pub start_date: DateTime<Utc>,
    #[serde(default, rename = "symptoms", alias = "symptomLogs")]
    pub symptom_logs: Vec<SymptomLog>,
}

impl ActivePeriod {
    pub fn new(start_date: DateTime<Utc>) -> Self {
        Self {
            start_date,
            symptom_logs: vec![],
        }
    }

    /// Day of the running period, the start date being day 1.
    pub fn day(&self, now: DateTime<Utc>) -> i64 {
        floor_days_between(self.start_date, now) + 1
    }

    pub fn finish(self, end_date: DateTime<Utc>) -> CycleRecord {
        CycleRecord {
            start_date: self.start_date,
            end_date: Some(end_date),
            symptom_logs: self.symptom_logs,
        }
    }
}

/// Everything persisted for cycle tracking. Loaded whole and written whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleStore {
    /// Most recent first.
    #[serde(default)]
    pub cycles: Vec<CycleRecord>,
    #[serde(default)]
    pub current_period: Option<ActivePeriod>,
    /// Most recent first.
    #[serde(default)]
    pub symptoms: Vec<SymptomLog>,
}

impl CycleStore {
    pub fn is_active(&self) -> bool {
        self.current_period.is_some()
    }

    /// Start of the cycle "now" belongs to: the running period, or the last recorded one.
    pub fn reference_start(&self) -> Option<DateTime<Utc>> {
        self.current_period
            .as_ref()
            .map(|period| period.start_date)
            .or_else(|| self.cycles.first().map(|cycle| cycle.start_date))
    }

    /// Index of the first recorded cycle that ends before it starts.
    pub fn inverted_cycle(&self) -> Option<usize> {
        self.cycles
            .iter()
            .position(|cycle| cycle.end_date.is_some_and(|end| end < cycle.start_date))
    }
}

/// Older documents store unset form fields as empty strings.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let Some(value) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if value.as_str().is_some_and(|v| v.trim().is_empty()) {
        return Ok(None);
    }
    T::deserialize(value)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

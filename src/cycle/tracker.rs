use std::collections::BTreeSet;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::{
    error::TrackerResult,
    storage::{keys::StorageKey, record_store::RecordStore},
    utils::clock::Clock,
};

use super::{
    entities::{CycleStore, FlowLevel, SymptomLog},
    phase::{classify_phase, PhaseReport},
    stats::{compute_stats, CycleStats},
};

pub async fn load_cycle_store(storage: &impl RecordStore) -> Result<CycleStore> {
    match storage.get(StorageKey::Period).await? {
        Some(content) => {
            serde_json::from_str(&content).context("Stored period data is not a valid cycle store")
        }
        None => {
            debug!("No period data stored yet");
            Ok(CycleStore::default())
        }
    }
}

pub async fn save_cycle_store(storage: &impl RecordStore, store: &CycleStore) -> Result<()> {
    let content = serde_json::to_string(store)?;
    storage.set(StorageKey::Period, content).await
}

/// Owns the [CycleStore] for one session. Every mutation is applied to a copy which is persisted
/// whole before it replaces the in-memory state.
pub struct CycleTracker<S: RecordStore> {
    storage: S,
    state: CycleStore,
    clock: Box<dyn Clock>,
}

impl<S: RecordStore> CycleTracker<S> {
    pub async fn load(storage: S, clock: Box<dyn Clock>) -> Result<Self> {
        let state = load_cycle_store(&storage).await?;
        debug!(
            "Loaded {} cycles, active: {}",
            state.cycles.len(),
            state.is_active()
        );
        Ok(Self {
            storage,
            state,
            clock,
        })
    }

    pub fn state(&self) -> &CycleStore {
        &self.state
    }

    async fn commit<T>(
        &mut self,
        operation: impl FnOnce(&mut CycleStore) -> TrackerResult<T>,
    ) -> TrackerResult<T> {
        let mut next = self.state.clone();
        let output = operation(&mut next)?;
        save_cycle_store(&self.storage, &next).await?;
        self.state = next;
        Ok(output)
    }

    #[instrument(skip(self))]
    pub async fn start_period(&mut self) -> TrackerResult<()> {
        let now = self.clock.time();
        self.commit(|store| store.start_period(now)).await?;
        info!("Period started at {now}");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn end_period(&mut self) -> TrackerResult<()> {
        let now = self.clock.time();
        self.commit(|store| store.end_period(now)).await?;
        info!("Period ended at {now}");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn log_symptoms(
        &mut self,
        symptoms: BTreeSet<String>,
        flow: Option<FlowLevel>,
        note: Option<String>,
    ) -> TrackerResult<SymptomLog> {
        let now = self.clock.time();
        let log = self
            .commit(|store| Ok(store.log_symptoms(now, symptoms, flow, note)))
            .await?;
        info!("Logged {} symptoms", log.symptoms.len());
        Ok(log)
    }

    #[instrument(skip(self))]
    pub async fn delete_cycle(&mut self, index: usize) -> TrackerResult<()> {
        self.commit(|store| store.delete_cycle(index)).await?;
        info!("Deleted cycle {index}");
        Ok(())
    }

    pub fn phase(&self) -> Option<PhaseReport> {
        classify_phase(&self.state, self.clock.time())
    }

    pub fn stats(&self) -> CycleStats {
        compute_stats(&self.state, self.clock.time())
    }

    /// Day of the running period, if there is one.
    pub fn active_day(&self) -> Option<i64> {
        self.state
            .current_period
            .as_ref()
            .map(|period| period.day(self.clock.time()))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeSet,
        sync::{Arc, Mutex},
    };

    use anyhow::Result;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tempfile::tempdir;

    use crate::{
        cycle::{
            entities::{CycleStore, FlowLevel},
            phase::Phase,
            stats::Countdown,
        },
        error::TrackerError,
        storage::{
            keys::StorageKey,
            record_store::{memory::MemoryRecordStore, FileRecordStore, RecordStore},
        },
        utils::{
            clock::{Clock, FixedClock, MockClock},
            logging::TEST_LOGGING,
        },
    };

    use super::{load_cycle_store, CycleTracker};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap() + Duration::days(n)
    }

    /// Clock whose time can be moved by the test while the tracker owns it.
    #[derive(Clone)]
    struct SharedClock(Arc<Mutex<DateTime<Utc>>>);

    impl SharedClock {
        fn set(&self, value: DateTime<Utc>) {
            *self.0.lock().unwrap() = value;
        }
    }

    impl Clock for SharedClock {
        fn time(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    #[tokio::test]
    async fn test_tracker_persists_every_mutation() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let storage = Arc::new(FileRecordStore::new(dir.path().to_owned())?);
        let clock = SharedClock(Arc::new(Mutex::new(day(0))));

        let mut tracker = CycleTracker::load(storage.clone(), Box::new(clock.clone())).await?;
        tracker.start_period().await?;
        clock.set(day(1));
        let log = tracker
            .log_symptoms(
                BTreeSet::from(["cramps".to_string()]),
                Some(FlowLevel::Heavy),
                None,
            )
            .await?;
        clock.set(day(4));
        tracker.end_period().await?;

        let stored = load_cycle_store(&storage).await?;
        assert_eq!(&stored, tracker.state());
        assert_eq!(stored.cycles.len(), 1);
        assert_eq!(stored.cycles[0].symptom_logs, vec![log.clone()]);
        assert_eq!(stored.symptoms, vec![log]);
        assert_eq!(stored.cycles[0].period_length_days(), Some(5));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_operation_writes_nothing() -> Result<()> {
        let storage = Arc::new(MemoryRecordStore::new());
        let mut tracker =
            CycleTracker::load(storage.clone(), Box::new(FixedClock(day(0)))).await?;

        let result = tracker.end_period().await;
        assert!(matches!(result, Err(TrackerError::NoActivePeriod)));
        assert_eq!(storage.get(StorageKey::Period).await?, None);

        let result = tracker.delete_cycle(0).await;
        assert!(matches!(
            result,
            Err(TrackerError::IndexOutOfRange { index: 0, len: 0 })
        ));
        assert_eq!(storage.get(StorageKey::Period).await?, None);

        tracker.start_period().await?;
        let persisted = storage.get(StorageKey::Period).await?;
        let result = tracker.start_period().await;
        assert!(matches!(result, Err(TrackerError::AlreadyActive)));
        assert_eq!(storage.get(StorageKey::Period).await?, persisted);

        tracker.end_period().await?;
        let persisted = storage.get(StorageKey::Period).await?;
        let result = tracker.start_period().await;
        assert!(matches!(result, Err(TrackerError::InvalidMoment(_))));
        assert_eq!(storage.get(StorageKey::Period).await?, persisted);
        assert!(tracker.state().current_period.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_phase_and_stats_follow_clock() -> Result<()> {
        let storage = MemoryRecordStore::new();
        let mut history = CycleStore::default();
        for (start, end) in [(0, 4), (30, 35), (58, 62), (87, 91)] {
            history.start_period(day(start))?;
            history.end_period(day(end))?;
        }
        storage
            .set(StorageKey::Period, serde_json::to_string(&history)?)
            .await?;

        let mut clock = MockClock::new();
        clock.expect_time().returning(|| day(87 + 19));

        let tracker = CycleTracker::load(storage, Box::new(clock)).await?;

        let phase = tracker.phase().unwrap();
        assert_eq!(phase.current_day, 20);
        assert_eq!(phase.cycle_length, 29);
        assert_eq!(phase.phase, Some(Phase::Luteal));

        let stats = tracker.stats();
        assert_eq!(stats.total_cycles, 4);
        assert_eq!(stats.average_cycle_length, Some(29));
        assert_eq!(stats.average_period_length, Some(5));
        let next = stats.next_period.unwrap();
        assert_eq!(next.predicted, day(116));
        assert_eq!(next.countdown(), Countdown::InDays(10));
        assert_eq!(tracker.active_day(), None);
        Ok(())
    }
}

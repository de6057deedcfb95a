//! Menstrual cycle tracking.
//!  - [entities] holds the persisted model, rooted at [entities::CycleStore].
//!  - [lifecycle] starts and ends periods, logs symptoms, deletes history entries.
//!  - [phase] and [stats] derive everything displayed from a store and a moment in time.
//!  - [tracker::CycleTracker] persists the whole store after every mutation.

pub mod entities;
pub mod lifecycle;
pub mod phase;
pub mod stats;
pub mod tracker;

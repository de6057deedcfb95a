//! Local personal tracker. Keeps mood, journal, study, budget and note collections on disk and
//! implements menstrual cycle tracking on top of them: period lifecycle, symptom logs, phase
//! classification, statistics and next period prediction.
//!

pub mod cli;
pub mod cycle;
pub mod error;
pub mod storage;
pub mod utils;

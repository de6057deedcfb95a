//!  Storage is organized through [record_store::RecordStore].
//!  The basic idea is:
//!   - Every collection (moods, journals, period data...) lives under one [keys::StorageKey].
//!   - A collection is read and written whole, as JSON text.
//!   - [backup] moves all collections in and out of a single document.

pub mod backup;
pub mod keys;
pub mod record_store;

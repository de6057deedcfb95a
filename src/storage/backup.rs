use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{
    cycle::entities::CycleStore,
    error::{TrackerError, TrackerResult},
    utils::time::date_to_file_name,
};

use super::{keys::StorageKey, record_store::RecordStore};

pub const BACKUP_VERSION: &str = "1.0";
pub const APP_NAME: &str = "bloomlog";

/// Which kind of document a backup file holds. Only used for naming the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKind {
    All,
    Single(StorageKey),
    Branches,
}

pub fn backup_file_name(kind: BackupKind, date: NaiveDate) -> String {
    let date = date_to_file_name(date);
    match kind {
        BackupKind::All => format!("{APP_NAME}-backup-{date}.json"),
        BackupKind::Single(key) => format!("{APP_NAME}-{key}-{date}.json"),
        BackupKind::Branches => format!("{APP_NAME}-complete-backup-{date}.json"),
    }
}

async fn read_collection(storage: &impl RecordStore, key: StorageKey) -> Result<Value> {
    match storage.get(key).await? {
        Some(content) => serde_json::from_str(&content)
            .with_context(|| format!("Stored {key} collection is not valid JSON")),
        None => Ok(Value::Null),
    }
}

/// Every collection by name. Collections that were never written are `null`.
pub async fn export_all(storage: &impl RecordStore) -> Result<Map<String, Value>> {
    let mut document = Map::new();
    for key in StorageKey::ALL {
        document.insert(key.name().into(), read_collection(storage, key).await?);
    }
    Ok(document)
}

pub async fn export_one(storage: &impl RecordStore, key: StorageKey) -> Result<Map<String, Value>> {
    let mut document = Map::new();
    document.insert(key.name().into(), read_collection(storage, key).await?);
    Ok(document)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchMetadata {
    pub export_date: DateTime<Utc>,
    pub version: String,
    pub app: String,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchSummary {
    pub total_moods: usize,
    pub total_journals: usize,
    pub total_cycles: usize,
    pub total_study_tasks: usize,
    pub total_transactions: usize,
    pub total_notes: usize,
}

#[derive(Debug, Serialize)]
pub struct BranchRoot {
    pub metadata: BranchMetadata,
    pub summary: BranchSummary,
}

/// Backup layout with export metadata and a summary of how much every collection holds.
#[derive(Debug, Serialize)]
pub struct BranchDocument {
    pub root: BranchRoot,
    pub branches: Map<String, Value>,
}

fn array_len(value: &Value) -> usize {
    value.as_array().map_or(0, Vec::len)
}

pub async fn export_branches(
    storage: &impl RecordStore,
    now: DateTime<Utc>,
) -> Result<BranchDocument> {
    let mut branches = export_all(storage).await?;

    for (name, value) in branches.iter_mut() {
        if !value.is_null() {
            continue;
        }
        *value = if name == StorageKey::Period.name() {
            serde_json::to_value(CycleStore::default())?
        } else {
            Value::Array(vec![])
        };
    }

    let branch = |key: StorageKey| branches.get(key.name()).unwrap_or(&Value::Null);
    let summary = BranchSummary {
        total_moods: array_len(branch(StorageKey::Moods)),
        total_journals: array_len(branch(StorageKey::Journals)),
        total_cycles: branch(StorageKey::Period)
            .get("cycles")
            .map_or(0, array_len),
        total_study_tasks: array_len(branch(StorageKey::Study)),
        total_transactions: array_len(branch(StorageKey::Budget)),
        total_notes: array_len(branch(StorageKey::Notes)),
    };

    Ok(BranchDocument {
        root: BranchRoot {
            metadata: BranchMetadata {
                export_date: now,
                version: BACKUP_VERSION.into(),
                app: APP_NAME.into(),
            },
            summary,
        },
        branches,
    })
}

/// Restores collections from a document produced by any of the exports. Only known collections
/// with a non-null value are written; the rest of the stored data is left untouched. The whole
/// document is checked before the first write.
pub async fn import_document(
    storage: &impl RecordStore,
    content: &str,
) -> TrackerResult<Vec<StorageKey>> {
    let document: Value = serde_json::from_str(content)
        .map_err(|e| TrackerError::MalformedImport(e.to_string()))?;

    let Value::Object(mut document) = document else {
        return Err(TrackerError::MalformedImport(
            "expected a JSON object at the top level".into(),
        ));
    };

    let collections = match document.remove("branches") {
        Some(Value::Object(branches)) => branches,
        Some(_) => {
            return Err(TrackerError::MalformedImport(
                "branches must be a JSON object".into(),
            ))
        }
        None => document,
    };

    let mut writes = vec![];
    for (name, value) in collections {
        let Some(key) = StorageKey::from_name(&name) else {
            warn!("Ignoring unknown collection {name:?} during import");
            continue;
        };
        if value.is_null() {
            debug!("Skipping empty {key} collection");
            continue;
        }
        if key == StorageKey::Period {
            let store = serde_json::from_value::<CycleStore>(value.clone())
                .map_err(|e| TrackerError::MalformedImport(format!("period: {e}")))?;
            if let Some(index) = store.inverted_cycle() {
                return Err(TrackerError::MalformedImport(format!(
                    "period: cycle {index} ends before it starts"
                )));
            }
        }
        writes.push((key, serde_json::to_string(&value).context("Serializing collection")?));
    }

    let mut imported = vec![];
    for (key, content) in writes {
        storage.set(key, content).await?;
        imported.push(key);
    }
    info!("Imported {} collections", imported.len());
    Ok(imported)
}

pub async fn clear_all(storage: &impl RecordStore) -> Result<()> {
    for key in StorageKey::ALL {
        storage.remove(key).await?;
    }
    info!("Cleared all collections");
    Ok(())
}

use std::{io::ErrorKind, path::PathBuf};

use ansi_term::Colour::{Green, Yellow};
use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use tracing::info;

use crate::{
    error::{TrackerError, TrackerResult},
    storage::{
        backup::{
            backup_file_name, clear_all, export_all, export_branches, export_one,
            import_document, BackupKind,
        },
        keys::StorageKey,
        record_store::RecordStore,
    },
};

/// Writes a backup document. Without `output` the file is named after the export kind and the
/// current date and placed in the working directory.
pub async fn export(
    storage: &impl RecordStore,
    only: Option<StorageKey>,
    branches: bool,
    output: Option<PathBuf>,
    now: DateTime<Utc>,
) -> Result<()> {
    let (kind, document) = match (only, branches) {
        (_, true) => (
            BackupKind::Branches,
            serde_json::to_string_pretty(&export_branches(storage, now).await?)?,
        ),
        (Some(key), false) => (
            BackupKind::Single(key),
            serde_json::to_string_pretty(&export_one(storage, key).await?)?,
        ),
        (None, false) => (
            BackupKind::All,
            serde_json::to_string_pretty(&export_all(storage).await?)?,
        ),
    };

    let path = output.unwrap_or_else(|| {
        PathBuf::from(backup_file_name(kind, now.with_timezone(&Local).date_naive()))
    });
    tokio::fs::write(&path, document).await?;
    info!("Exported {kind:?} into {path:?}");
    println!("{} {}", Green.paint("Exported data into"), path.display());
    Ok(())
}

pub async fn import(storage: &impl RecordStore, file: PathBuf) -> TrackerResult<()> {
    let content = tokio::fs::read_to_string(&file)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidData => TrackerError::MalformedImport(e.to_string()),
            _ => TrackerError::Storage(e.into()),
        })?;
    let imported = import_document(storage, &content).await?;
    if imported.is_empty() {
        println!("{}", Yellow.paint("Nothing to import"));
    } else {
        let names = imported.iter().map(|v| v.name()).collect::<Vec<_>>();
        println!(
            "{} {}",
            Green.paint("Data imported successfully:"),
            names.join(", ")
        );
    }
    Ok(())
}

pub async fn clear(storage: &impl RecordStore, confirmed: bool) -> Result<()> {
    if !confirmed {
        println!(
            "{}",
            Yellow.paint("This removes every stored collection. Run again with --yes to confirm")
        );
        return Ok(());
    }
    clear_all(storage).await?;
    println!("{}", Green.paint("All data cleared"));
    Ok(())
}

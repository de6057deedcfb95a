use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::debug;

use super::keys::StorageKey;

/// Interface for abstracting storage of record collections. Each key holds one whole collection
/// serialized as JSON text; there are no partial updates.
pub trait RecordStore {
    /// Returns the stored text, or `None` if the key was never written.
    fn get(&self, key: StorageKey) -> impl Future<Output = Result<Option<String>>>;

    /// Replaces the whole collection stored under `key`.
    fn set(&self, key: StorageKey, value: String) -> impl Future<Output = Result<()>>;

    fn remove(&self, key: StorageKey) -> impl Future<Output = Result<()>>;
}

impl<T: Deref> RecordStore for T
where
    T::Target: RecordStore,
{
    fn get(&self, key: StorageKey) -> impl Future<Output = Result<Option<String>>> {
        self.deref().get(key)
    }

    fn set(&self, key: StorageKey, value: String) -> impl Future<Output = Result<()>> {
        self.deref().set(key, value)
    }

    fn remove(&self, key: StorageKey) -> impl Future<Output = Result<()>> {
        self.deref().remove(key)
    }
}

/// The main realization of [RecordStore]. Every key is a `<storage key>.json` file inside
/// `record_dir`.
pub struct FileRecordStore {
    record_dir: PathBuf,
}

impl FileRecordStore {
    pub fn new(record_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&record_dir)?;

        Ok(Self { record_dir })
    }

    fn path_for(&self, key: StorageKey) -> PathBuf {
        self.record_dir.join(format!("{}.json", key.storage_key()))
    }

    /// Every access to a key holds a lock on its `.lock` file. The file is never renamed or
    /// removed, so all processes contend on the same inode.
    async fn open_lock(&self, key: StorageKey) -> std::io::Result<File> {
        let path = self.record_dir.join(format!("{}.json.lock", key.storage_key()));
        File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .await
    }

    async fn write_staging(path: &Path, value: &[u8]) -> std::io::Result<()> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .await?;
        file.set_len(0).await?;
        file.write_all(value).await?;
        file.flush().await?;
        file.sync_all().await
    }
}

impl RecordStore for FileRecordStore {
    async fn get(&self, key: StorageKey) -> Result<Option<String>> {
        let path = self.path_for(key);
        debug!("Reading {path:?}");
        let lock = self.open_lock(key).await?;
        lock.lock_shared()?;
        let result = tokio::fs::read_to_string(&path).await;
        lock.unlock_async().await?;
        match result {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: StorageKey, value: String) -> Result<()> {
        // Written next to the target, then renamed over it.
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        debug!("Writing {} bytes into {path:?}", value.len());
        let lock = self.open_lock(key).await?;
        lock.lock_exclusive()?;
        let result = async {
            Self::write_staging(&staging, value.as_bytes()).await?;
            tokio::fs::rename(&staging, &path).await
        }
        .await;
        lock.unlock_async().await?;
        result?;
        Ok(())
    }

    async fn remove(&self, key: StorageKey) -> Result<()> {
        let path = self.path_for(key);
        let lock = self.open_lock(key).await?;
        lock.lock_exclusive()?;
        let result = tokio::fs::remove_file(&path).await;
        lock.unlock_async().await?;
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

use std::{fmt::Debug, pin::Pin, sync::Arc};

use async_trait::async_trait;
use camino::Utf8PathBuf as PathBuf;
use chrono::{DateTime, Utc};
use eyre::{eyre, Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

pub type BoxedReader = Pin<Box<dyn AsyncRead + Send>>;
pub type BoxedWriter = Pin<Box<dyn AsyncWrite + Send>>;

/// Shared handle to whatever backs the asset store.
pub type Storage = Arc<dyn StorageProvider>;

#[derive(Debug, thiserror::Error)]
pub enum StorageReadError {
    #[error("no object with key '{0}'")]
    FileNotFound(String),
    #[error(transparent)]
    Other(#[from] eyre::Report),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    /// Last key segment, i.e. the file name
    pub name: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Abstraction for storing data files in any backing store.
/// This interface is basically a blob store, where every object has
/// a `key` used to store and retrieve it.
/// The `key` has to also be a valid relative path, so that `LocalFileStorage`
/// can just use the `key` as a path without any fuss.
/// Directories are the `/`-separated prefixes of keys.
#[async_trait]
pub trait StorageProvider: Debug + Send + Sync {
    async fn open_read_stream(&self, key: &str) -> Result<BoxedReader, StorageReadError>;

    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageReadError> {
        let mut reader = self.open_read_stream(key).await?;
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .await
            .wrap_err_with(|| format!("error reading object '{}'", key))?;
        Ok(buf)
    }

    /// Fails if an object with this key already exists.
    async fn open_write_stream(&self, key: &str) -> Result<BoxedWriter>;

    /// Create or overwrite an object.
    async fn put(&self, key: &str, data: &[u8]) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;

    async fn stat(&self, key: &str) -> Result<Option<ObjectInfo>>;

    /// Returns whether there was anything to remove.
    /// A directory at `key` is not an object and is left alone.
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Objects directly inside `dir` (`""` for the root), in whatever order
    /// the backing store yields them. Subdirectories are not included.
    async fn list(&self, dir: &str) -> Result<Vec<ObjectInfo>>;

    async fn ensure_dir(&self, dir: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: PathBuf) -> LocalFileStorage {
        LocalFileStorage { root }
    }

    pub fn root(&self) -> &camino::Utf8Path {
        &self.root
    }

    fn path(&self, key: &str) -> PathBuf {
        if key.is_empty() {
            self.root.clone()
        } else {
            self.root.join(key)
        }
    }
}

fn join_key(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_owned()
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), name)
    }
}

#[async_trait]
impl StorageProvider for LocalFileStorage {
    async fn open_read_stream(&self, key: &str) -> Result<BoxedReader, StorageReadError> {
        match tokio::fs::File::open(self.path(key)).await {
            Ok(file) => Ok(Box::pin(file)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageReadError::FileNotFound(key.to_owned()))
            }
            Err(err) => Err(eyre::Report::new(err)
                .wrap_err("error opening file for reading")
                .into()),
        }
    }

    async fn open_write_stream(&self, key: &str) -> Result<BoxedWriter> {
        let file = tokio::fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(self.path(key))
            .await
            .wrap_err("error opening file for writing")?;
        Ok(Box::pin(file))
    }

    async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        tokio::fs::write(self.path(key), data)
            .await
            .wrap_err_with(|| format!("error writing file {}", self.path(key)))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        tokio::fs::try_exists(self.path(key))
            .await
            .wrap_err("error checking if path exists")
    }

    async fn stat(&self, key: &str) -> Result<Option<ObjectInfo>> {
        let path = self.path(key);
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err).wrap_err_with(|| format!("error reading metadata of {}", path)),
        };
        if !metadata.is_file() {
            return Ok(None);
        }
        let name = path
            .file_name()
            .ok_or_else(|| eyre!("key '{}' has no file name", key))?
            .to_owned();
        Ok(Some(ObjectInfo {
            key: key.to_owned(),
            name,
            size: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        }))
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let path = self.path(key);
        if tokio::fs::symlink_metadata(&path)
            .await
            .is_ok_and(|metadata| metadata.is_dir())
        {
            return Ok(false);
        }
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err).wrap_err_with(|| format!("error removing {}", path)),
        }
    }

    async fn list(&self, dir: &str) -> Result<Vec<ObjectInfo>> {
        let dir_path = self.path(dir);
        let mut read_dir = tokio::fs::read_dir(&dir_path)
            .await
            .wrap_err_with(|| format!("error listing directory {}", dir_path))?;
        let mut objects = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .wrap_err_with(|| format!("error listing directory {}", dir_path))?
        {
            let metadata = entry.metadata().await.wrap_err("error reading metadata")?;
            if !metadata.is_file() {
                continue;
            }
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(name) => {
                    tracing::warn!(?name, "skipping non unicode file name");
                    continue;
                }
            };
            objects.push(ObjectInfo {
                key: join_key(dir, &name),
                name,
                size: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }
        Ok(objects)
    }

    async fn ensure_dir(&self, dir: &str) -> Result<()> {
        tokio::fs::create_dir_all(self.path(dir))
            .await
            .wrap_err_with(|| format!("error creating directory {}", self.path(dir)))
    }
}

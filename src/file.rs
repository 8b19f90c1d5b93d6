//! Output file that can be swapped for a fresh descriptor at the same path.

use crate::error::{OpenError, ReopenError, WriteError};
use camino::{Utf8Path, Utf8PathBuf};
use std::io;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// permission bits for a newly created output file
pub const MODE: u32 = 0o644;

/// Holds at most one current descriptor for `path`, always opened write-only for appending and
/// created with [`MODE`] if missing
pub struct FileHandle {
    path: Utf8PathBuf,
    current: Option<File>,
}

impl FileHandle {
    /// creates a handle without opening anything yet
    pub fn new(path: impl Into<Utf8PathBuf>) -> FileHandle {
        FileHandle {
            path: path.into(),
            current: None,
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    async fn open_file(&self) -> io::Result<File> {
        OpenOptions::new()
            .write(true)
            .append(true)
            .create(true)
            .mode(MODE)
            .open(&self.path)
            .await
    }

    /// Opens the configured path
    ///
    /// Meant for a handle without a current descriptor, use [`reopen`](Self::reopen) otherwise.
    pub async fn open(&mut self) -> Result<(), OpenError> {
        let file = self.open_file().await.map_err(|source| OpenError {
            path: self.path.clone(),
            source,
        })?;
        self.current = Some(file);
        debug!(path = %self.path, "opened output file");
        Ok(())
    }

    /// Appends `bytes` and flushes them to the OS
    pub async fn write(&mut self, bytes: &[u8]) -> Result<(), WriteError> {
        let file = match self.current.as_mut() {
            Some(file) => file,
            None => {
                return Err(WriteError::Closed {
                    path: self.path.clone(),
                })
            }
        };
        append(file, bytes).await.map_err(|source| WriteError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Opens `path` again and only then retires the previous descriptor
    ///
    /// If the open fails the previous descriptor stays current.
    pub async fn reopen(&mut self) -> Result<(), ReopenError> {
        let file = self.open_file().await.map_err(|source| ReopenError {
            path: self.path.clone(),
            source,
        })?;
        if let Some(mut old) = self.current.replace(file) {
            if let Err(err) = old.flush().await {
                warn!(path = %self.path, error = %err, "flush retired output file");
            }
        }
        debug!(path = %self.path, "reopened output file");
        Ok(())
    }

    /// Releases the current descriptor, no-op when there is none
    pub async fn close(&mut self) {
        if let Some(mut file) = self.current.take() {
            if let Err(err) = file.flush().await {
                warn!(path = %self.path, error = %err, "flush output file on close");
            }
            debug!(path = %self.path, "closed output file");
        }
    }
}

async fn append(file: &mut File, bytes: &[u8]) -> io::Result<()> {
    file.write_all(bytes).await?;
    // tokio finishes writes in the background, flushing surfaces their errors here
    file.flush().await
}

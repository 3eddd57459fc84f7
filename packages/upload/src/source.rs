//! Access to source file bytes.
//!
//! Workers never touch the filesystem directly; they go through
//! [`SourceFiles`] so a batch can be driven against in-memory sources.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncReadExt as _;

/// Opens source files for reading.
#[async_trait]
pub trait SourceFiles: Send + Sync {
    /// Opens the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened.
    async fn open(&self, path: &Path) -> io::Result<Box<dyn SourceReader>>;
}

/// An open source file.
#[async_trait]
pub trait SourceReader: Send {
    /// Reads the whole remaining content.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading fails.
    async fn read_all(&mut self) -> io::Result<Vec<u8>>;

    /// Releases the handle.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the handle cannot be released.
    async fn close(self: Box<Self>) -> io::Result<()>;
}

/// [`SourceFiles`] backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFiles;

#[async_trait]
impl SourceFiles for LocalFiles {
    async fn open(&self, path: &Path) -> io::Result<Box<dyn SourceReader>> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Box::new(LocalReader { file }))
    }
}

struct LocalReader {
    file: tokio::fs::File,
}

#[async_trait]
impl SourceReader for LocalReader {
    async fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.file.read_to_end(&mut bytes).await?;
        Ok(bytes)
    }

    // Read-only handle, nothing to flush.
    async fn close(self: Box<Self>) -> io::Result<()> {
        drop(self.file);
        Ok(())
    }
}

//! Local file source for the parsers.
//!
//! Parsing always runs over an in-memory buffer; this only gets the bytes
//! there, synchronously or through tokio with the `async` feature.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Local file implementation.
#[derive(Debug, Clone)]
pub struct LocalFileMedia {
    path: PathBuf,
    name: String,
    length: u64,
}

impl LocalFileMedia {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            path: path.to_path_buf(),
            name,
            length: metadata.len(),
        })
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sync read of the whole file.
    pub fn read_all(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(&self.path)?)
    }

    /// Async read of the whole file.
    #[cfg(feature = "async")]
    #[cfg_attr(docsrs, doc(cfg(feature = "async")))]
    pub async fn read_all_async(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

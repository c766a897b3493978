use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::app::ports::SheetSourcePort;
use crate::document::SourceInfo;
use crate::error::Result;

/// A CSV export saved on disk, for offline runs.
pub struct LocalCsvSource {
    path: PathBuf,
}

impl LocalCsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SheetSourcePort for LocalCsvSource {
    fn describe(&self) -> SourceInfo {
        SourceInfo {
            fonte: format!("Arquivo CSV - {}", self.path.display()),
            origem: self.path.display().to_string(),
        }
    }

    fn fetch(&self) -> Result<String> {
        let text = fs::read_to_string(&self.path)?;
        info!("Read {} bytes from {}", text.len(), self.path.display());
        Ok(text)
    }
}

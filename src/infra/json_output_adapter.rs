use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::app::ports::DocumentSinkPort;
use crate::document::OutputDocument;
use crate::error::Result;

/// Writes the document as pretty JSON, replacing any previous file.
///
/// The content goes to a sibling temp file first and is renamed into place, so
/// readers never see a half-written document.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "document.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DocumentSinkPort for JsonFileSink {
    fn write(&self, document: &OutputDocument) -> Result<PathBuf> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let mut json = serde_json::to_string_pretty(document)?;
        json.push('\n');

        let tmp = self.temp_path();
        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        info!("Saved document to {}", self.path.display());
        Ok(self.path.clone())
    }
}

use std::path::PathBuf;

use crate::document::{OutputDocument, SourceInfo};
use crate::error::Result;

/// Where the sheet text comes from (export endpoint, local file).
pub trait SheetSourcePort {
    fn describe(&self) -> SourceInfo;
    fn fetch(&self) -> Result<String>;
}

/// Where the finished document goes.
pub trait DocumentSinkPort {
    /// Persist the document and return its location.
    fn write(&self, document: &OutputDocument) -> Result<PathBuf>;
}

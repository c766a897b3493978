use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument};

use crate::app::ports::{DocumentSinkPort, SheetSourcePort};
use crate::config::ColumnsConfig;
use crate::document::{validate_document, OutputDocument};
use crate::error::Result;
use crate::pipeline::processing::aggregate::{aggregate, AggregateColumns};
use crate::pipeline::processing::normalize::Normalizer;
use crate::pipeline::processing::parser::parse_sheet;

/// Result of a complete sync run
#[derive(Debug, Serialize)]
pub struct SyncResult {
    pub source_rows: usize,
    pub records: usize,
    pub dropped: usize,
    pub duplicates: usize,
    pub statuses: usize,
    pub months: usize,
    pub missing_columns: Vec<String>,
    pub output_file: PathBuf,
}

/// Fetch, normalize, aggregate and write the document.
pub struct SyncUseCase {
    source: Box<dyn SheetSourcePort>,
    sink: Box<dyn DocumentSinkPort>,
    normalizer: Normalizer,
    aggregate_columns: AggregateColumns,
}

impl SyncUseCase {
    pub fn new(
        source: Box<dyn SheetSourcePort>,
        sink: Box<dyn DocumentSinkPort>,
        columns: &ColumnsConfig,
    ) -> Self {
        Self {
            source,
            sink,
            normalizer: Normalizer::from_config(columns),
            aggregate_columns: AggregateColumns::from(columns),
        }
    }

    /// Run the stages up to the finished document without writing it.
    #[instrument(skip(self))]
    pub fn build_document(&self) -> Result<OutputDocument> {
        let source = self.source.describe();

        info!("Fetching sheet from {}", source.origem);
        let payload = self.source.fetch()?;

        let sheet = parse_sheet(&payload)?;
        let normalized = self.normalizer.normalize(sheet);
        let analysis = aggregate(&normalized.filtered, &self.aggregate_columns);

        Ok(OutputDocument::assemble(&source, &payload, normalized, analysis, Utc::now()))
    }

    pub fn run(&self) -> Result<SyncResult> {
        let document = self.build_document()?;

        // Nothing is written unless the document passes validation
        validate_document(&document.to_json_value()?)?;
        let output_file = self.sink.write(&document)?;

        let metadata = &document.metadata;
        Ok(SyncResult {
            source_rows: metadata.total_registros_completos,
            records: metadata.total_registros,
            dropped: metadata.registros_descartados,
            duplicates: metadata.duplicatas_removidas,
            statuses: document.analysis.status_distribution.len(),
            months: document.analysis.processos_por_mes.len(),
            missing_columns: self.missing_columns(&document),
            output_file,
        })
    }

    fn missing_columns(&self, document: &OutputDocument) -> Vec<String> {
        self.normalizer
            .allow_list()
            .iter()
            .filter(|rule| !document.metadata.colunas.iter().any(|c| c == rule.target()))
            .map(|rule| rule.source.clone())
            .collect()
    }
}

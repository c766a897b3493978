use chrono::{DateTime, Utc};
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{Result, SyncError};
use crate::pipeline::processing::aggregate::AggregateReport;
use crate::pipeline::processing::normalize::NormalizedSheet;
use crate::types::Record;

static DOCUMENT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../schemas/processos_document.v1.json"))
        .expect("embedded document schema is valid JSON")
});

/// Where the sheet text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    /// Human label shown on the site, e.g. `Google Sheets - Todos processos`
    pub fonte: String,
    /// Export URL or file path
    pub origem: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub ultima_atualizacao: DateTime<Utc>,
    pub fonte: String,
    pub origem: String,
    pub colunas: Vec<String>,
    pub total_registros: usize,
    pub total_processos: usize,
    pub total_registros_completos: usize,
    pub registros_descartados: usize,
    pub duplicatas_removidas: usize,
    pub payload_sha256: String,
}

/// The JSON file the site reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub metadata: DocumentMetadata,
    pub processos: Vec<Record>,
    pub processos_completos: Vec<Record>,
    pub analysis: AggregateReport,
}

impl OutputDocument {
    /// Build the document; record counts are taken from the lists themselves.
    pub fn assemble(
        source: &SourceInfo,
        payload: &str,
        normalized: NormalizedSheet,
        analysis: AggregateReport,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let NormalizedSheet {
            full,
            filtered,
            columns,
            stats,
        } = normalized;

        let metadata = DocumentMetadata {
            ultima_atualizacao: generated_at,
            fonte: source.fonte.clone(),
            origem: source.origem.clone(),
            colunas: columns,
            total_registros: filtered.len(),
            total_processos: filtered.len(),
            total_registros_completos: full.len(),
            registros_descartados: stats.missing_identity,
            duplicatas_removidas: stats.duplicates(),
            payload_sha256: payload_sha256(payload),
        };

        Self {
            metadata,
            processos: filtered,
            processos_completos: full,
            analysis,
        }
    }

    pub fn to_json_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

pub fn payload_sha256(payload: &str) -> String {
    hex::encode(Sha256::digest(payload.as_bytes()))
}

pub fn document_schema() -> &'static Value {
    &DOCUMENT_SCHEMA
}

/// Validate a document against the embedded schema and its count invariants.
pub fn validate_document(instance: &Value) -> Result<()> {
    validate_with_schema(document_schema(), instance)
}

pub fn validate_with_schema(schema: &Value, instance: &Value) -> Result<()> {
    let compiled = JSONSchema::options()
        .compile(schema)
        .map_err(|e| SyncError::Config(format!("Failed to compile JSON Schema: {}", e)))?;

    let mut problems: Vec<String> = match compiled.validate(instance) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|error| format!("{} at {}", error, error.instance_path))
            .collect(),
    };
    problems.extend(count_mismatches(instance));

    if problems.is_empty() {
        Ok(())
    } else {
        Err(SyncError::InvalidDocument(problems))
    }
}

/// Count fields that disagree with the lists they describe.
fn count_mismatches(instance: &Value) -> Vec<String> {
    let len_of = |key: &str| instance.get(key).and_then(Value::as_array).map(Vec::len);
    let count_at = |pointer: &str| instance.pointer(pointer).and_then(Value::as_u64);

    let processos = len_of("processos");
    let completos = len_of("processos_completos");

    let checks = [
        ("/metadata/total_registros", processos, "processos"),
        ("/metadata/total_processos", processos, "processos"),
        ("/analysis/total_processos", processos, "processos"),
        ("/metadata/total_registros_completos", completos, "processos_completos"),
    ];

    let mut problems = Vec::new();
    for (pointer, actual, list) in checks {
        if let (Some(declared), Some(actual)) = (count_at(pointer), actual) {
            if declared != actual as u64 {
                problems.push(format!(
                    "{} is {} but {} has {} entries",
                    pointer, declared, list, actual
                ));
            }
        }
    }
    problems
}

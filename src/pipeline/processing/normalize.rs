use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::{ColumnRule, ColumnsConfig};
use crate::pipeline::processing::parser::ParsedSheet;
use crate::pipeline::processing::values::parse_sync_date;
use crate::types::{Record, RecordKey};

/// Output of the normalize stage.
#[derive(Debug, Clone, Default)]
pub struct NormalizedSheet {
    /// Every parsed row with all source columns
    pub full: Vec<Record>,
    /// Allow-listed, renamed, identity-checked and deduplicated rows
    pub filtered: Vec<Record>,
    /// Output column names, in allow-list order, that exist in the sheet
    pub columns: Vec<String>,
    pub stats: NormalizeStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    pub source_rows: usize,
    pub missing_identity: usize,
    pub duplicates_replaced: usize,
    pub duplicates_discarded: usize,
    /// Duplicate pairs where a date failed to parse, so the kept record stayed
    pub unparsable_tie_breaks: usize,
    pub missing_columns: Vec<String>,
}

impl NormalizeStats {
    pub fn duplicates(&self) -> usize {
        self.duplicates_replaced + self.duplicates_discarded
    }
}

/// Which filtered columns identify and date a record.
#[derive(Debug, Clone)]
pub struct IdentityColumns {
    pub protocol: String,
    pub name: String,
    pub sync_date: String,
}

impl From<&ColumnsConfig> for IdentityColumns {
    fn from(columns: &ColumnsConfig) -> Self {
        Self {
            protocol: columns.protocol.clone(),
            name: columns.name.clone(),
            sync_date: columns.sync_date.clone(),
        }
    }
}

/// Result of matching the allow-list against a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnMatch {
    Exact,
    /// Only a header that differs by surrounding whitespace exists
    WhitespaceMismatch(String),
    Missing,
}

pub struct Normalizer {
    allow: Vec<ColumnRule>,
    identity: IdentityColumns,
}

impl Normalizer {
    pub fn new(allow: Vec<ColumnRule>, identity: IdentityColumns) -> Self {
        Self { allow, identity }
    }

    pub fn from_config(columns: &ColumnsConfig) -> Self {
        Self::new(columns.allow.clone(), IdentityColumns::from(columns))
    }

    pub fn allow_list(&self) -> &[ColumnRule] {
        &self.allow
    }

    /// Match each allow-list entry against the header row.
    pub fn match_columns(&self, headers: &[String]) -> Vec<(ColumnRule, ColumnMatch)> {
        self.allow
            .iter()
            .map(|rule| {
                let status = if headers.iter().any(|h| *h == rule.source) {
                    ColumnMatch::Exact
                } else if let Some(near) = headers.iter().find(|h| h.trim() == rule.source.trim()) {
                    ColumnMatch::WhitespaceMismatch(near.clone())
                } else {
                    ColumnMatch::Missing
                };
                (rule.clone(), status)
            })
            .collect()
    }

    /// Restrict a full record to the allow-list, renaming and trimming values.
    pub fn project(&self, record: &Record) -> Record {
        self.allow
            .iter()
            .filter_map(|rule| {
                record
                    .get(&rule.source)
                    .map(|value| (rule.target(), value.trim()))
            })
            .collect()
    }

    #[instrument(skip(self, sheet), fields(rows = sheet.rows.len()))]
    pub fn normalize(&self, sheet: ParsedSheet) -> NormalizedSheet {
        let mut stats = NormalizeStats {
            source_rows: sheet.rows.len(),
            ..Default::default()
        };

        let mut columns = Vec::new();
        for (rule, status) in self.match_columns(&sheet.headers) {
            match status {
                ColumnMatch::Exact => columns.push(rule.target().to_string()),
                ColumnMatch::WhitespaceMismatch(found) => {
                    warn!(
                        "Allow-listed column {:?} not found; sheet has {:?} (whitespace differs)",
                        rule.source, found
                    );
                    stats.missing_columns.push(rule.source.clone());
                }
                ColumnMatch::Missing => {
                    warn!("Allow-listed column {:?} not found in sheet header", rule.source);
                    stats.missing_columns.push(rule.source.clone());
                }
            }
        }

        let projected: Vec<Record> = sheet.rows.iter().map(|row| self.project(row)).collect();
        let filtered = self.deduplicate(projected, &mut stats);

        info!(
            "Normalized {} rows into {} records ({} without identity, {} duplicates)",
            stats.source_rows,
            filtered.len(),
            stats.missing_identity,
            stats.duplicates()
        );

        NormalizedSheet {
            full: sheet.rows,
            filtered,
            columns,
            stats,
        }
    }

    /// Drop rows without identity and keep one record per key, in first-seen order.
    pub fn deduplicate(&self, records: Vec<Record>, stats: &mut NormalizeStats) -> Vec<Record> {
        let mut index: HashMap<RecordKey, usize> = HashMap::new();
        let mut kept: Vec<Record> = Vec::new();

        for record in records {
            let Some(key) = RecordKey::from_record(&record, &self.identity.protocol, &self.identity.name)
            else {
                stats.missing_identity += 1;
                continue;
            };

            match index.get(&key) {
                None => {
                    index.insert(key, kept.len());
                    kept.push(record);
                }
                Some(&pos) => match self.newer_than(&record, &kept[pos]) {
                    Some(true) => {
                        debug!("Replacing {} with a more recent row", key);
                        kept[pos] = record;
                        stats.duplicates_replaced += 1;
                    }
                    Some(false) => {
                        stats.duplicates_discarded += 1;
                    }
                    None => {
                        debug!("Keeping first row for {}: sync date did not parse", key);
                        stats.unparsable_tie_breaks += 1;
                        stats.duplicates_discarded += 1;
                    }
                },
            }
        }

        kept
    }

    /// Whether `candidate` should replace `current`. `None` when a date is malformed.
    fn newer_than(&self, candidate: &Record, current: &Record) -> Option<bool> {
        let new_raw = candidate.value(&self.identity.sync_date).trim();
        let current_raw = current.value(&self.identity.sync_date).trim();

        if new_raw.is_empty() {
            return Some(false);
        }
        if current_raw.is_empty() {
            return Some(true);
        }

        let new_date = parse_sync_date(new_raw).ok()?;
        let current_date = parse_sync_date(current_raw).ok()?;
        Some(new_date.cmp(&current_date) == Ordering::Greater)
    }
}

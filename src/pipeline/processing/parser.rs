use crate::error::ParseError;
use crate::types::Record;
use tracing::{debug, info, instrument};

/// Header row plus every non-blank row of the sheet, with all columns.
#[derive(Debug, Clone, Default)]
pub struct ParsedSheet {
    /// Header cells exactly as exported, whitespace included
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}

/// Parse CSV export text that starts with a header row.
///
/// Short rows are padded with empty values, fields past the header are
/// ignored, columns with an empty header are skipped and rows with only empty
/// cells are dropped.
#[instrument(skip(csv_text), fields(bytes = csv_text.len()))]
pub fn parse_sheet(csv_text: &str) -> Result<ParsedSheet, ParseError> {
    let text = csv_text.trim_start_matches('\u{feff}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ParseError::MissingHeader);
    }

    let mut rows = Vec::new();
    let mut blank = 0usize;
    let mut overflowing = 0usize;

    for result in reader.records() {
        let row = result?;
        if row.len() > headers.len() {
            overflowing += 1;
        }

        let record: Record = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(i, header)| (header.as_str(), row.get(i).unwrap_or("")))
            .collect();

        if record.is_blank() {
            blank += 1;
            continue;
        }
        rows.push(record);
    }

    if overflowing > 0 {
        debug!("{} rows had more fields than the header; extra fields ignored", overflowing);
    }
    info!(
        "Parsed {} rows with {} columns ({} blank rows skipped)",
        rows.len(),
        headers.len(),
        blank
    );

    Ok(ParsedSheet { headers, rows })
}

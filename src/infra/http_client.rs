use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use tracing::{info, instrument};

use crate::app::ports::SheetSourcePort;
use crate::config::SourceConfig;
use crate::document::SourceInfo;
use crate::error::{Result, SyncError};

/// Google Sheets "gviz" CSV export of one sheet.
pub struct GvizSheetSource {
    client: Client,
    url: Url,
    sheet_name: String,
}

impl GvizSheetSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let url = export_url(&config.base_url, &config.spreadsheet_id, &config.sheet_name)?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| SyncError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            client,
            url,
            sheet_name: config.sheet_name.clone(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// `{base}/spreadsheets/d/{id}/gviz/tq?tqx=out:csv&sheet={sheet}`
pub fn export_url(base_url: &str, spreadsheet_id: &str, sheet_name: &str) -> Result<Url> {
    let raw = format!(
        "{}/spreadsheets/d/{}/gviz/tq",
        base_url.trim_end_matches('/'),
        spreadsheet_id.trim()
    );
    Url::parse_with_params(&raw, &[("tqx", "out:csv"), ("sheet", sheet_name)])
        .map_err(|e| SyncError::Config(format!("Invalid export URL '{}': {}", raw, e)))
}

impl SheetSourcePort for GvizSheetSource {
    fn describe(&self) -> SourceInfo {
        SourceInfo {
            fonte: format!("Google Sheets - {}", self.sheet_name),
            origem: self.url.to_string(),
        }
    }

    #[instrument(skip(self), fields(url = %self.url))]
    fn fetch(&self) -> Result<String> {
        let network_error = |message: String| SyncError::Network {
            url: self.url.to_string(),
            message,
        };

        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .map_err(|e| network_error(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(network_error(format!("HTTP status {}", status)));
        }

        let text = resp.text().map_err(|e| network_error(e.to_string()))?;
        info!("Fetched {} bytes from sheet export", text.len());
        Ok(text)
    }
}

use crate::constants;
use crate::error::{Result, SyncError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub columns: ColumnsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub base_url: String,
    /// Request timeout; the HTTP client default applies when unset
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    /// Directory for the rolling JSON log; console only when unset
    pub log_dir: Option<PathBuf>,
}

/// One allow-listed column: exact source header and optional output name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnRule {
    pub source: String,
    #[serde(default)]
    pub rename: Option<String>,
}

impl ColumnRule {
    pub fn new(source: impl Into<String>, rename: impl Into<String>) -> Self {
        let source = source.into();
        let rename = rename.into();
        let rename = if rename == source { None } else { Some(rename) };
        Self { source, rename }
    }

    pub fn target(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.source)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub allow: Vec<ColumnRule>,
    pub protocol: String,
    pub name: String,
    pub status: String,
    pub sync_date: String,
    pub return_days: String,
    pub monetary: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: constants::DEFAULT_SPREADSHEET_ID.to_string(),
            sheet_name: constants::DEFAULT_SHEET_NAME.to_string(),
            base_url: constants::DEFAULT_SHEETS_BASE_URL.to_string(),
            timeout_seconds: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(constants::DEFAULT_OUTPUT_FILE),
            log_dir: None,
        }
    }
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            allow: constants::DEFAULT_ALLOWED_COLUMNS
                .iter()
                .map(|(source, target)| ColumnRule::new(*source, *target))
                .collect(),
            protocol: constants::PROTOCOL_COLUMN.to_string(),
            name: constants::NAME_COLUMN.to_string(),
            status: constants::STATUS_COLUMN.to_string(),
            sync_date: constants::SYNC_DATE_COLUMN.to_string(),
            return_days: constants::RETURN_DAYS_COLUMN.to_string(),
            monetary: constants::DEFAULT_MONETARY_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Load defaults, then the TOML file, then environment overrides.
    ///
    /// An explicit `path` must exist. Without one, `gs_sync.toml` in the working
    /// directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(constants::DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; blank values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(constants::ENV_SPREADSHEET_ID) {
            self.source.spreadsheet_id = v;
        }
        if let Some(v) = get(constants::ENV_SHEET_NAME) {
            self.source.sheet_name = v;
        }
        if let Some(v) = get(constants::ENV_SHEETS_BASE_URL) {
            self.source.base_url = v;
        }
        if let Some(v) = get(constants::ENV_OUTPUT_FILE) {
            self.output.path = PathBuf::from(v);
        }
        if let Some(v) = get(constants::ENV_LOG_DIR) {
            self.output.log_dir = Some(PathBuf::from(v));
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.spreadsheet_id.trim().is_empty() {
            return Err(SyncError::Config("spreadsheet_id must not be empty".to_string()));
        }
        if self.source.sheet_name.trim().is_empty() {
            return Err(SyncError::Config("sheet_name must not be empty".to_string()));
        }
        if self.columns.allow.is_empty() {
            return Err(SyncError::Config("column allow-list must not be empty".to_string()));
        }

        let targets: Vec<&str> = self.columns.allow.iter().map(ColumnRule::target).collect();
        let required = [
            ("protocol", &self.columns.protocol),
            ("name", &self.columns.name),
            ("sync_date", &self.columns.sync_date),
        ];
        for (role, column) in required {
            if !targets.contains(&column.as_str()) {
                return Err(SyncError::Config(format!(
                    "{} column '{}' is not produced by the allow-list",
                    role, column
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.source.sheet_name, "Todos processos");
        assert_eq!(config.output.path, PathBuf::from("data/processos.json"));
        assert!(config
            .columns
            .allow
            .iter()
            .any(|rule| rule.source == "Valor da Causa " && rule.target() == "Valor da Causa"));
    }

    #[test]
    fn test_toml_overrides_only_given_fields() {
        let config = Config::from_toml_str(
            r#"
            [source]
            sheet_name = "Controle de Prazos GS"
            timeout_seconds = 20

            [[columns.allow]]
            source = "Protocolo GS"

            [[columns.allow]]
            source = "Nome "
            rename = "Nome"

            [[columns.allow]]
            source = "Data Sincronismo"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.sheet_name, "Controle de Prazos GS");
        assert_eq!(config.source.spreadsheet_id, constants::DEFAULT_SPREADSHEET_ID);
        assert_eq!(config.source.timeout_seconds, Some(20));
        assert_eq!(config.columns.allow.len(), 3);
        assert_eq!(config.columns.allow[1].target(), "Nome");
        assert_eq!(config.columns.protocol, "Protocolo GS");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("GS_SHEET_NAME", "Outra aba"),
            ("GS_OUTPUT_FILE", "out/doc.json"),
            ("GS_SPREADSHEET_ID", "   "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.source.sheet_name, "Outra aba");
        assert_eq!(config.output.path, PathBuf::from("out/doc.json"));
        // blank values do not override
        assert_eq!(config.source.spreadsheet_id, constants::DEFAULT_SPREADSHEET_ID);
    }

    #[test]
    fn test_validate_rejects_unmapped_identity_column() {
        let mut config = Config::default();
        config.columns.protocol = "Protocolo".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Protocolo"));
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let err = Config::load(Some(Path::new("does/not/exist.toml"))).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
    }
}

//! Defaults for the Gestão Segura sheet. Everything here can be overridden from
//! `gs_sync.toml`, the environment or the command line.

// Source spreadsheet
pub const DEFAULT_SPREADSHEET_ID: &str = "1X0zBNRqsqUSh1roe2svI5JrkY-AeKCM941JRDKWsizw";
pub const DEFAULT_SHEET_NAME: &str = "Todos processos";
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://docs.google.com";

// Files
pub const DEFAULT_CONFIG_FILE: &str = "gs_sync.toml";
pub const DEFAULT_OUTPUT_FILE: &str = "data/processos.json";

// Environment overrides
pub const ENV_SPREADSHEET_ID: &str = "GS_SPREADSHEET_ID";
pub const ENV_SHEET_NAME: &str = "GS_SHEET_NAME";
pub const ENV_SHEETS_BASE_URL: &str = "GS_SHEETS_BASE_URL";
pub const ENV_OUTPUT_FILE: &str = "GS_OUTPUT_FILE";
pub const ENV_LOG_DIR: &str = "GS_LOG_DIR";

// Output column names used by the stages
pub const PROTOCOL_COLUMN: &str = "Protocolo GS";
pub const NAME_COLUMN: &str = "Nome";
pub const STATUS_COLUMN: &str = "Status";
pub const SYNC_DATE_COLUMN: &str = "Data Sincronismo";
pub const RETURN_DAYS_COLUMN: &str = "Dias de retorno";
pub const CLAIM_VALUE_COLUMN: &str = "Valor da Causa";
pub const SETTLEMENT_VALUE_COLUMN: &str = "Valor Acordo";

/// Status bucket for records with an empty status cell
pub const UNKNOWN_STATUS: &str = "Desconhecido";

/// Cell content the sheet uses for "no value"
pub const PLACEHOLDER_VALUE: &str = "-";

/// Allow-listed source headers and the name each one gets in the filtered output.
/// Source headers are matched exactly; some carry stray whitespace in the sheet.
pub const DEFAULT_ALLOWED_COLUMNS: &[(&str, &str)] = &[
    ("Protocolo GS", PROTOCOL_COLUMN),
    ("Nome", NAME_COLUMN),
    ("Tipo de Processo", "Tipo de Processo"),
    ("Status", STATUS_COLUMN),
    ("Data Sincronismo", SYNC_DATE_COLUMN),
    ("Dias de retorno", RETURN_DAYS_COLUMN),
    ("Valor da Causa ", CLAIM_VALUE_COLUMN),
    (" Valor Acordo", SETTLEMENT_VALUE_COLUMN),
];

pub const DEFAULT_MONETARY_COLUMNS: &[&str] = &[CLAIM_VALUE_COLUMN, SETTLEMENT_VALUE_COLUMN];

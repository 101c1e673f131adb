use school_core::config::{configuration_directory, load_layered};
use school_core::error::AppError;
use school_core::retry::RetryConfig;
use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub sheets: SheetsSettings,
    #[serde(default)]
    pub access: AccessSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub observability: ObservabilitySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Idle time after which a login session expires.
    #[serde(default = "default_session_idle_hours")]
    pub session_idle_hours: i64,
}

fn default_session_idle_hours() -> i64 {
    24
}

#[derive(Deserialize, Clone)]
pub struct SheetsSettings {
    /// Spreadsheet REST endpoint, without the spreadsheet id.
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,
    pub spreadsheet_id: String,
    pub api_key: Secret<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub names: SheetNames,
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com/v4/spreadsheets".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Tab names inside the spreadsheet.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct SheetNames {
    pub students: String,
    pub classes: String,
    pub teachers: String,
    pub parents: String,
    pub attendance: String,
    pub grades: String,
    pub messages: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            students: "Élèves".to_string(),
            classes: "Classes".to_string(),
            teachers: "Enseignants".to_string(),
            parents: "Parents".to_string(),
            attendance: "Présences".to_string(),
            grades: "Notes".to_string(),
            messages: "Messages".to_string(),
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct AccessSettings {
    /// Emails granted the admin role, compared case-insensitively.
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

impl RetrySettings {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ObservabilitySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let configuration_directory = configuration_directory("school-portal")?;
    load_layered(&configuration_directory, "base")
}

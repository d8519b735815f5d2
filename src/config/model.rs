//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a sensible default so the client works without a file.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::views::date_range::DateLimits;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub dates: DatesConfig,
    #[serde(default)]
    pub hours: HoursConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the PTO server lives and how to talk to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Root URL of the PTO site; endpoint paths are joined onto it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Remembered login name, prefilled on the login page.
    #[serde(default)]
    pub username: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            accept_invalid_certs: false,
            username: None,
        }
    }
}

/// UI appearance and behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// `chrono` format of date inputs on the list page.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// First column of the calendar grid, 0 = Sunday.
    #[serde(default)]
    pub first_day: u8,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_flash_seconds")]
    pub flash_seconds: u64,
    #[serde(default = "default_autocomplete_delay_ms")]
    pub autocomplete_delay_ms: u64,
    #[serde(default = "default_autocomplete_min_length")]
    pub autocomplete_min_length: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            first_day: 0,
            page_size: default_page_size(),
            flash_seconds: default_flash_seconds(),
            autocomplete_delay_ms: default_autocomplete_delay_ms(),
            autocomplete_min_length: default_autocomplete_min_length(),
        }
    }
}

/// Picker bounds of the list filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatesConfig {
    #[serde(default)]
    pub date_min: Option<NaiveDate>,
    #[serde(default)]
    pub date_max: Option<NaiveDate>,
    #[serde(default)]
    pub filed_min: Option<NaiveDate>,
    /// Unset means today.
    #[serde(default)]
    pub filed_max: Option<NaiveDate>,
}

impl DatesConfig {
    pub fn limits(&self, today: NaiveDate) -> DateLimits {
        DateLimits {
            date_min: self.date_min,
            date_max: self.date_max,
            filed_min: self.filed_min,
            filed_max: Some(self.filed_max.unwrap_or(today)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoursConfig {
    /// Hours in a full working day.
    #[serde(default = "default_work_day")]
    pub work_day: i32,
}

impl Default for HoursConfig {
    fn default() -> Self {
        Self {
            work_day: default_work_day(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Store the login name in `[server] username` after logging in.
    #[serde(default = "default_true")]
    pub remember_username: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            remember_username: true,
        }
    }
}

/// Diagnostic log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            level: default_level(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_date_format() -> String {
    "%-d %B %Y".to_string()
}
fn default_page_size() -> usize {
    10
}
fn default_flash_seconds() -> u64 {
    10
}
fn default_autocomplete_delay_ms() -> u64 {
    300
}
fn default_autocomplete_min_length() -> usize {
    2
}
fn default_work_day() -> i32 {
    8
}
fn default_log_dir() -> String {
    "~/.local/share/ptoterm/logs".to_string()
}
fn default_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.ui.date_format, "%-d %B %Y");
        assert_eq!(config.ui.page_size, 10);
        assert_eq!(config.hours.work_day, 8);
        assert!(config.behavior.remember_username);
        assert!(!config.logging.enabled);
    }

    #[test]
    fn test_partial_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            base_url = "https://pto.example.com/"
            username = "peter"

            [dates]
            date_min = "2010-01-01"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.base_url, "https://pto.example.com/");
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.server.username.as_deref(), Some("peter"));
        assert_eq!(config.dates.date_min, NaiveDate::from_ymd_opt(2010, 1, 1));
    }

    #[test]
    fn test_filed_max_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let limits = DatesConfig::default().limits(today);
        assert_eq!(limits.filed_max, Some(today));
        assert_eq!(limits.date_max, None);
    }
}

use std::path::PathBuf;

use scraper_app::domain::schedule::{DailySchedule, InvalidSchedule};

pub const DEFAULT_URL: &str = "https://dhan.co/all-stocks-list/";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} env var not set")]
    Missing(&'static str),
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error(transparent)]
    Schedule(#[from] InvalidSchedule),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sender_email: String,
    pub email_password: String,
    pub recipient_email: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub scraper_url: String,
    pub csv_file: PathBuf,
    pub screenshot_dir: PathBuf,
    pub webdriver_url: String,
    pub chrome_binary: Option<String>,
    pub http_port: u16,
    pub daily_schedule: Option<DailySchedule>,
    pub log_file: PathBuf,
    pub log_archive_pattern: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let or_default = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        let port = |name: &'static str, default: u16| -> Result<u16, ConfigError> {
            match lookup(name) {
                None => Ok(default),
                Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                    name,
                    expected: "u16",
                    value,
                }),
            }
        };

        Ok(Self {
            sender_email: required("SENDER_EMAIL")?,
            email_password: required("EMAIL_PASSWORD")?,
            recipient_email: required("RECIPIENT_EMAIL")?,
            smtp_host: or_default("SMTP_HOST", "smtp.gmail.com"),
            smtp_port: port("SMTP_PORT", 587)?,
            scraper_url: or_default("SCRAPER_URL", DEFAULT_URL),
            csv_file: PathBuf::from(or_default("CSV_FILE", "dhan_stocks.csv")),
            screenshot_dir: PathBuf::from(or_default("SCREENSHOT_DIR", ".")),
            webdriver_url: or_default("WEBDRIVER_URL", "http://localhost:9515"),
            chrome_binary: lookup("GOOGLE_CHROME_BIN").filter(|v| !v.trim().is_empty()),
            http_port: port("PORT", 10000)?,
            daily_schedule: DailySchedule::parse(&or_default("DAILY_SCRAPE_AT", "03:00"))?,
            log_file: PathBuf::from(or_default("LOG_FILE_PATH", "dhan_scraper.log")),
            log_archive_pattern: or_default("LOG_ARCHIVE_PATTERN", "dhan_scraper.{}.log.gz"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const SECRETS: [(&str, &str); 3] = [
        ("SENDER_EMAIL", "bot@example.com"),
        ("EMAIL_PASSWORD", "hunter2"),
        ("RECIPIENT_EMAIL", "ops@example.com"),
    ];

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&SECRETS)).unwrap();
        assert_eq!(config.smtp_host, "smtp.gmail.com");
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.scraper_url, DEFAULT_URL);
        assert_eq!(config.csv_file, PathBuf::from("dhan_stocks.csv"));
        assert_eq!(config.http_port, 10000);
        assert_eq!(config.chrome_binary, None);
        assert_eq!(config.daily_schedule, Some(DailySchedule::default()));
        assert_eq!(config.log_file, PathBuf::from("dhan_scraper.log"));
        assert_eq!(config.log_archive_pattern, "dhan_scraper.{}.log.gz");
    }

    #[test]
    fn test_missing_secret() {
        let err = AppConfig::from_lookup(lookup(&SECRETS[..2])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("RECIPIENT_EMAIL")));
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let mut pairs = SECRETS.to_vec();
        pairs.push(("PORT", "8080"));
        pairs.push(("DAILY_SCRAPE_AT", "off"));
        pairs.push(("GOOGLE_CHROME_BIN", "/usr/bin/chromium"));
        pairs.push(("LOG_FILE_PATH", "/var/log/dhan/scraper.log"));
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.log_file, PathBuf::from("/var/log/dhan/scraper.log"));
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.daily_schedule, None);
        assert_eq!(config.chrome_binary.as_deref(), Some("/usr/bin/chromium"));

        pairs.push(("SMTP_PORT", "smtp"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "SMTP_PORT", .. }));
    }
}

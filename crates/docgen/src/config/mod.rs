use crate::pipeline::{PipelineConfig, StatusFilter};
use serde::Serialize;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration, read once at startup and passed down explicitly.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub reports: ReportConfig,
    pub mail: MailConfig,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("DOCGEN_ENV", "development"));

        let reports = ReportConfig {
            officials_list: PathBuf::from(var_or("DOCGEN_OFFICIALS_LIST", "./officials_list.xls")),
            report_directory: PathBuf::from(var_or("DOCGEN_REPORT_DIRECTORY", ".")),
            report_file: var_or("DOCGEN_REPORT_FILE", "officials-reports.html"),
            email_list_csv: var_or("DOCGEN_EMAIL_LIST_CSV", "docgen-email-list.csv"),
            report_title: var_or("DOCGEN_REPORT_TITLE", "2023/24 Officials Development"),
            include_invoice_pending: bool_var("DOCGEN_INCL_INV_PENDING", true)?,
            include_account_pending: bool_var("DOCGEN_INCL_ACCOUNT_PENDING", true)?,
            include_pso_pending: bool_var("DOCGEN_INCL_PSO_PENDING", true)?,
        };

        let mail = MailConfig {
            smtp_server: var_or("DOCGEN_SMTP_SERVER", "smtp.gmail.com"),
            smtp_port: var_or("DOCGEN_SMTP_PORT", "465")
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort("DOCGEN_SMTP_PORT"))?,
            smtp_user: var_or("DOCGEN_SMTP_USER", "username@gmail.com"),
            from: var_or("DOCGEN_EMAIL_FROM", "My Name <user@gmail.com>"),
            subject: var_or("DOCGEN_EMAIL_SUBJECT", "Officials Development Report"),
            body: var_or(
                "DOCGEN_EMAIL_BODY",
                "Attached is your Officials Development Report",
            ),
        };

        let host = var_or("DOCGEN_HOST", "127.0.0.1");
        let port = var_or("DOCGEN_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("DOCGEN_PORT"))?;

        let log_level = var_or("DOCGEN_LOG_LEVEL", "info");

        Ok(Self {
            environment,
            reports,
            mail,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn bool_var(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidBool { name, value: raw }),
        Err(_) => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Input location, output locations and status toggles for report runs.
#[derive(Debug, Clone, Serialize)]
pub struct ReportConfig {
    pub officials_list: PathBuf,
    pub report_directory: PathBuf,
    pub report_file: String,
    pub email_list_csv: String,
    pub report_title: String,
    pub include_invoice_pending: bool,
    pub include_account_pending: bool,
    pub include_pso_pending: bool,
}

impl ReportConfig {
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            report_directory: self.report_directory.clone(),
            report_file: self.report_file.clone(),
            email_list_csv: self.email_list_csv.clone(),
            report_title: self.report_title.clone(),
            statuses: StatusFilter {
                invoice_pending: self.include_invoice_pending,
                account_pending: self.include_account_pending,
                pso_pending: self.include_pso_pending,
            },
        }
    }
}

/// Settings handed to the external mailer alongside the manifest. Credentials
/// are not part of configuration.
#[derive(Debug, Clone, Serialize)]
pub struct MailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort(&'static str),
    InvalidBool { name: &'static str, value: String },
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort(name) => write!(f, "{name} must be a valid u16"),
            ConfigError::InvalidBool { name, value } => {
                write!(f, "{name} must be true or false, got '{value}'")
            }
            ConfigError::InvalidHost { .. } => {
                write!(f, "DOCGEN_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort(_) | ConfigError::InvalidBool { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "DOCGEN_ENV",
            "DOCGEN_OFFICIALS_LIST",
            "DOCGEN_REPORT_DIRECTORY",
            "DOCGEN_REPORT_FILE",
            "DOCGEN_EMAIL_LIST_CSV",
            "DOCGEN_REPORT_TITLE",
            "DOCGEN_INCL_INV_PENDING",
            "DOCGEN_INCL_ACCOUNT_PENDING",
            "DOCGEN_INCL_PSO_PENDING",
            "DOCGEN_SMTP_SERVER",
            "DOCGEN_SMTP_PORT",
            "DOCGEN_SMTP_USER",
            "DOCGEN_EMAIL_FROM",
            "DOCGEN_EMAIL_SUBJECT",
            "DOCGEN_EMAIL_BODY",
            "DOCGEN_HOST",
            "DOCGEN_PORT",
            "DOCGEN_LOG_LEVEL",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.reports.report_file, "officials-reports.html");
        assert_eq!(config.reports.email_list_csv, "docgen-email-list.csv");
        assert!(config.reports.include_invoice_pending);
        assert_eq!(config.mail.smtp_port, 465);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn status_toggles_feed_the_pipeline() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("DOCGEN_INCL_INV_PENDING", "No");
        env::set_var("DOCGEN_INCL_PSO_PENDING", "off");
        env::set_var("DOCGEN_REPORT_DIRECTORY", "/tmp/reports");
        let config = AppConfig::load().expect("config loads");
        let pipeline = PipelineConfig::from(&config);
        assert!(!pipeline.statuses.invoice_pending);
        assert!(pipeline.statuses.account_pending);
        assert!(!pipeline.statuses.pso_pending);
        assert_eq!(pipeline.report_directory, PathBuf::from("/tmp/reports"));
        reset_env();
    }

    #[test]
    fn rejects_unrecognised_booleans() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("DOCGEN_INCL_ACCOUNT_PENDING", "maybe");
        let error = AppConfig::load().expect_err("invalid bool");
        assert!(matches!(
            error,
            ConfigError::InvalidBool {
                name: "DOCGEN_INCL_ACCOUNT_PENDING",
                ..
            }
        ));
        reset_env();
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("DOCGEN_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }
}

use docgen::config::AppConfig;
use docgen::pipeline::{PipelineConfig, RunGate};
use docgen::report::DocumentStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) reports: ReportState,
}

/// Everything a report request needs besides its own body.
#[derive(Clone)]
pub(crate) struct ReportState {
    pub(crate) gate: RunGate,
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) officials_list: PathBuf,
    pub(crate) pipeline: PipelineConfig,
}

impl ReportState {
    pub(crate) fn new(config: &AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            gate: RunGate::new(),
            store,
            officials_list: config.reports.officials_list.clone(),
            pipeline: PipelineConfig::from(config),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config(report_directory: &std::path::Path) -> AppConfig {
    use docgen::config::{
        AppEnvironment, MailConfig, ReportConfig, ServerConfig, TelemetryConfig,
    };

    AppConfig {
        environment: AppEnvironment::Test,
        reports: ReportConfig {
            officials_list: report_directory.join("officials_list.xls"),
            report_directory: report_directory.to_path_buf(),
            report_file: "officials-reports.html".to_string(),
            email_list_csv: "docgen-email-list.csv".to_string(),
            report_title: "2023/24 Officials Development".to_string(),
            include_invoice_pending: true,
            include_account_pending: true,
            include_pso_pending: true,
        },
        mail: MailConfig {
            smtp_server: "smtp.example.com".to_string(),
            smtp_port: 465,
            smtp_user: "reports@example.com".to_string(),
            from: "Officials <reports@example.com>".to_string(),
            subject: "Officials Development Report".to_string(),
            body: "Attached is your Officials Development Report".to_string(),
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        telemetry: TelemetryConfig {
            log_level: "info".to_string(),
        },
    }
}

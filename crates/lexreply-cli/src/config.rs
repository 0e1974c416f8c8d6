//! Runtime settings from flags and environment, and logging setup.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use lexreply_ai::model::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use lexreply_ai::ModelConfig;
use lexreply_store::AuditLog;
use tracing_subscriber::EnvFilter;

/// Settings shared by every subcommand.
#[derive(Debug, Args)]
pub struct Settings {
    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Model used for analysis, parsing, and drafting.
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Per-request timeout for model calls, in seconds.
    #[arg(long, env = "LEXREPLY_TIMEOUT_SECS", default_value_t = 60, global = true)]
    pub timeout_secs: u64,

    /// Directory for audit entries.
    #[arg(long, env = "AUDIT_LOG_DIR", default_value = "static/audit_logs", global = true)]
    pub audit_dir: PathBuf,

    /// Skip writing audit entries.
    #[arg(long, global = true)]
    pub no_audit: bool,

    /// Log filter, e.g. `info` or `lexreply_ai=debug`.
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,
}

impl Settings {
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig::new(self.api_key.clone().unwrap_or_default())
            .with_model(&self.model)
            .with_base_url(&self.base_url)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }

    pub fn audit_log(&self) -> Option<AuditLog> {
        (!self.no_audit).then(|| AuditLog::new(&self.audit_dir))
    }
}

/// Install the global subscriber. Logs go to stderr; stdout carries JSON output.
pub fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(level).with_context(|| format!("invalid log level {level:?}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            api_key: Some("k".into()),
            model: "gemini-2.5-pro".into(),
            base_url: "http://localhost:8080".into(),
            timeout_secs: 5,
            audit_dir: PathBuf::from("/tmp/audit"),
            no_audit: false,
            log_level: "info".into(),
        }
    }

    #[test]
    fn model_config_from_settings() {
        let cfg = settings().model_config();
        assert_eq!(cfg.api_key, "k");
        assert_eq!(cfg.model, "gemini-2.5-pro");
        assert_eq!(cfg.base_url, "http://localhost:8080");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[test]
    fn missing_api_key_becomes_empty() {
        let s = Settings { api_key: None, ..settings() };
        assert_eq!(s.model_config().api_key, "");
    }

    #[test]
    fn no_audit_disables_sink() {
        assert!(settings().audit_log().is_some());
        let s = Settings { no_audit: true, ..settings() };
        assert!(s.audit_log().is_none());
    }
}

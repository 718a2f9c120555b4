//! Application settings loaded via OrthoConfig.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::mail::SmtpSettings;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_IDENTITY_KEY_FILE: &str = "/var/run/secrets/identity_service_account.json";
const DEFAULT_MAIL_FROM: &str = "\"Wayfare\" <no-reply@wayfare.app>";

/// Settings controlling the HTTP server and outbound adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "APP")]
pub struct AppSettings {
    /// Socket address to bind, e.g. `0.0.0.0:8080`.
    pub listen_addr: Option<String>,
    /// SMTP relay host.
    pub smtp_host: Option<String>,
    /// SMTP relay username.
    pub smtp_username: Option<String>,
    /// SMTP relay password.
    pub smtp_password: Option<String>,
    /// Sender mailbox for verification emails.
    pub mail_from: Option<String>,
    /// Path to the identity provider's service-account JSON key.
    pub identity_key_file: Option<PathBuf>,
    /// Bound for identity provider and mail relay calls, in seconds.
    #[ortho_config(default = 10)]
    pub upstream_timeout_seconds: u64,
}

impl AppSettings {
    /// Address the HTTP server binds to.
    pub fn listen_addr(&self) -> String {
        self.listen_addr
            .clone()
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned())
    }

    /// Location of the service-account key file.
    pub fn identity_key_file(&self) -> PathBuf {
        self.identity_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IDENTITY_KEY_FILE))
    }

    /// Timeout applied to every outbound provider and relay call.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds.max(1))
    }

    /// Relay settings when the SMTP triple is fully configured.
    pub fn smtp_settings(&self) -> Option<SmtpSettings> {
        let host = self.smtp_host.clone()?;
        let username = self.smtp_username.clone()?;
        let password = self.smtp_password.clone()?;
        Some(SmtpSettings {
            host,
            username,
            password,
            from: self
                .mail_from
                .clone()
                .unwrap_or_else(|| DEFAULT_MAIL_FROM.to_owned()),
            timeout: self.upstream_timeout(),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("backend")]).expect("settings should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("APP_LISTEN_ADDR", None::<String>),
            ("APP_SMTP_HOST", None::<String>),
            ("APP_SMTP_USERNAME", None::<String>),
            ("APP_SMTP_PASSWORD", None::<String>),
            ("APP_MAIL_FROM", None::<String>),
            ("APP_IDENTITY_KEY_FILE", None::<String>),
            ("APP_UPSTREAM_TIMEOUT_SECONDS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.listen_addr(), DEFAULT_LISTEN_ADDR);
        assert_eq!(
            settings.identity_key_file(),
            PathBuf::from(DEFAULT_IDENTITY_KEY_FILE)
        );
        assert_eq!(settings.upstream_timeout(), Duration::from_secs(10));
        assert!(settings.smtp_settings().is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("APP_LISTEN_ADDR", Some("127.0.0.1:9999".to_owned())),
            ("APP_SMTP_HOST", Some("smtp.test".to_owned())),
            ("APP_SMTP_USERNAME", Some("mailer".to_owned())),
            ("APP_SMTP_PASSWORD", Some("hunter2".to_owned())),
            ("APP_MAIL_FROM", None::<String>),
            ("APP_IDENTITY_KEY_FILE", Some("/tmp/key.json".to_owned())),
            ("APP_UPSTREAM_TIMEOUT_SECONDS", Some("3".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.listen_addr(), "127.0.0.1:9999");
        assert_eq!(settings.identity_key_file(), PathBuf::from("/tmp/key.json"));
        assert_eq!(settings.upstream_timeout(), Duration::from_secs(3));

        let smtp = settings.smtp_settings().expect("smtp configured");
        assert_eq!(smtp.host, "smtp.test");
        assert_eq!(smtp.from, DEFAULT_MAIL_FROM);
    }

    #[rstest]
    fn smtp_settings_require_the_full_triple() {
        let _guard = lock_env([
            ("APP_SMTP_HOST", Some("smtp.test".to_owned())),
            ("APP_SMTP_USERNAME", None::<String>),
            ("APP_SMTP_PASSWORD", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.smtp_settings().is_none());
    }
}

//! Backend entry-point: wires adapters, services, and REST endpoints.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use backend::domain::ports::{
    AccountRepository, Clock, IdentityProvider, Mailer, MatchLog, SystemClock,
    VerificationCodeStore,
};
use backend::domain::{ProfileService, RegistrationService, SocialGraphService};
use backend::inbound::http::health::HealthState;
use backend::inbound::http::state::HttpState;
use backend::outbound::identity::{FirebaseIdentityProvider, ServiceAccountKey};
use backend::outbound::mail::SmtpMailer;
use backend::outbound::persistence::{
    InMemoryAccountRepository, InMemoryMatchLog, InMemoryVerificationCodeStore,
};
use backend::server::config::AppSettings;
use backend::server::configure_app;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args: Vec<std::ffi::OsString> = std::env::args_os().collect();
    let settings = AppSettings::load_from_iter(args).map_err(std::io::Error::other)?;

    let key_path = settings.identity_key_file();
    let key_bytes = std::fs::read(&key_path).map_err(|e| {
        std::io::Error::other(format!(
            "failed to read service account key at {path}: {e}",
            path = key_path.display()
        ))
    })?;
    let key = ServiceAccountKey::from_json(&key_bytes).map_err(std::io::Error::other)?;
    let identity: Arc<dyn IdentityProvider> = Arc::new(
        FirebaseIdentityProvider::new(key, settings.upstream_timeout())
            .map_err(std::io::Error::other)?,
    );

    let smtp = settings.smtp_settings().ok_or_else(|| {
        std::io::Error::other(
            "SMTP relay configuration is required (APP_SMTP_HOST/_USERNAME/_PASSWORD)",
        )
    })?;
    let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(smtp).map_err(std::io::Error::other)?);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let accounts: Arc<dyn AccountRepository> = Arc::new(InMemoryAccountRepository::new());
    let codes: Arc<dyn VerificationCodeStore> =
        Arc::new(InMemoryVerificationCodeStore::new(Arc::clone(&clock)));
    let matches: Arc<dyn MatchLog> = Arc::new(InMemoryMatchLog::new());
    warn!("using in-process persistence; records do not survive a restart");

    let registration = Arc::new(RegistrationService::new(
        Arc::clone(&accounts),
        codes,
        Arc::clone(&identity),
        mailer,
        Arc::clone(&clock),
    ));
    let profiles = Arc::new(ProfileService::new(Arc::clone(&accounts), Arc::clone(&clock)));
    let social = Arc::new(SocialGraphService::new(
        Arc::clone(&accounts),
        matches,
        clock,
    ));

    let state = web::Data::new(HttpState::new(
        registration,
        profiles,
        social,
        identity,
        accounts,
    ));
    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness flag stays reachable.
    let server_health_state = health_state.clone();
    let server_state = state.clone();

    let server = HttpServer::new(move || {
        App::new().configure(configure_app(
            server_state.clone(),
            server_health_state.clone(),
        ))
    })
    .bind(settings.listen_addr())?;

    health_state.mark_ready();
    server.run().await
}

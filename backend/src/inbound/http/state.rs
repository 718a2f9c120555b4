//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` so they depend only on
//! domain services and ports and stay testable without real I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountRepository, IdentityProvider};
use crate::domain::{ProfileService, RegistrationService, SocialGraphService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registration: Arc<RegistrationService>,
    pub profiles: Arc<ProfileService>,
    pub social: Arc<SocialGraphService>,
    /// Used directly by the bearer gate and the profile-sync endpoint.
    pub identity: Arc<dyn IdentityProvider>,
    pub accounts: Arc<dyn AccountRepository>,
}

impl HttpState {
    /// Bundle the services and gate ports for handler injection.
    pub fn new(
        registration: Arc<RegistrationService>,
        profiles: Arc<ProfileService>,
        social: Arc<SocialGraphService>,
        identity: Arc<dyn IdentityProvider>,
        accounts: Arc<dyn AccountRepository>,
    ) -> Self {
        Self {
            registration,
            profiles,
            social,
            identity,
            accounts,
        }
    }
}

//! Identity provider adapters.

mod firebase;

pub use firebase::{FirebaseIdentityProvider, FirebaseInitError, ServiceAccountKey};

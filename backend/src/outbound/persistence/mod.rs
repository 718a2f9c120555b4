//! Persistence adapters for the repository and store ports.

mod memory;

pub use memory::{InMemoryAccountRepository, InMemoryMatchLog, InMemoryVerificationCodeStore};

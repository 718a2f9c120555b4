//! Outbound adapters implementing the domain's driven ports.

pub mod identity;
pub mod mail;
pub mod persistence;

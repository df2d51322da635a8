//! Side-effecting adapters: configuration, model provider, repository host.

pub mod config;
pub mod github;
pub mod provider;

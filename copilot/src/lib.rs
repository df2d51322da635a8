//! DevOps copilot: prompt-driven generation of DevOps artifacts, reviews and docs.
//!
//! The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (prompt rendering, the offline
//!   responder, artifact validation, wire payloads). No I/O.
//! - **[`io`]**: Side-effecting adapters (configuration, the live model
//!   provider, the GitHub client). Behind traits so tests can swap them out.
//!
//! [`engine`] applies the live/fallback policy and [`service`] wires a request
//! through prompt, generation and validation for both the CLI and the server.

pub mod core;
pub mod engine;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod service;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

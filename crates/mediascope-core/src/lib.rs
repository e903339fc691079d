//! Mediascope Core: title and record models, matching config, errors.

pub mod config;
pub mod error;
pub mod models;

pub use config::MatchConfig;
pub use error::{MediascopeError, Result};
pub use models::*;

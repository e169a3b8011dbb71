//! ## Service Configuration
//!
//! This module holds the configuration needed to reach the hosted table service:
//! the service endpoint URL and the API key. The configuration is built once at
//! process start, validated eagerly, and never mutated afterwards. Both values are
//! read from the process environment (`SUPABASE_URL` and `SUPABASE_KEY`); a missing
//! or empty variable surfaces as [`ReportFactoryError::MissingConfig`] before any
//! network call is attempted.
//!
//! ### Example
//!
//! ```rust,no_run
//! use report_factory::config::ServiceConfig;
//!
//! let config = ServiceConfig::from_env().expect("SUPABASE_URL and SUPABASE_KEY must be set");
//! ```

use crate::exceptions::{ReportFactoryError, ReportFactoryResult};

/// Environment variable naming the service endpoint URL.
pub const ENDPOINT_VAR: &str = "SUPABASE_URL";

/// Environment variable naming the API key used to authenticate reads.
pub const API_KEY_VAR: &str = "SUPABASE_KEY";

/// Endpoint and credential for the hosted table service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL of the service, without a trailing slash.
    pub endpoint: String,
    /// API key sent with every read request.
    pub api_key: String,
}

impl ServiceConfig {
    /// Creates a validated configuration from explicit values.
    ///
    /// Returns `MissingConfig` if either value is empty. A trailing slash on the
    /// endpoint is stripped so request paths can be joined uniformly.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> ReportFactoryResult<Self> {
        let endpoint = endpoint.into();
        let api_key = api_key.into();
        if endpoint.trim().is_empty() {
            return Err(ReportFactoryError::MissingConfig(ENDPOINT_VAR.to_string()));
        }
        if api_key.trim().is_empty() {
            return Err(ReportFactoryError::MissingConfig(API_KEY_VAR.to_string()));
        }
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Builds the configuration from the process environment.
    pub fn from_env() -> ReportFactoryResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// This keeps environment handling testable: tests pass a closure over a map
    /// instead of mutating the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ReportFactoryResult<Self> {
        let endpoint = lookup(ENDPOINT_VAR)
            .ok_or_else(|| ReportFactoryError::MissingConfig(ENDPOINT_VAR.to_string()))?;
        let api_key = lookup(API_KEY_VAR)
            .ok_or_else(|| ReportFactoryError::MissingConfig(API_KEY_VAR.to_string()))?;
        Self::new(endpoint, api_key)
    }
}

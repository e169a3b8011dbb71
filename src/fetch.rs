//! ## Remote Table Reads
//!
//! This module implements the bounded read against the hosted table service. A read
//! is the logical operation `SELECT * FROM <table_name> LIMIT 50`, issued over the
//! service's REST interface and authenticated with the configured API key. Rows come
//! back as JSON objects mapping column names to scalar values, in whatever order the
//! service provides.
//!
//! The [`RowSource`] trait is the seam between the network and the loader: the
//! binaries use [`TableClient`], while tests substitute canned rows.
//!
//! There is no retry policy. A failure to reach the service surfaces immediately as
//! `ConnectionFailed`, and an unknown table surfaces as `TableNotFound`.

use crate::config::ServiceConfig;
use crate::exceptions::{ReportFactoryError, ReportFactoryResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

/// Maximum number of rows returned by a single table read.
pub const ROW_LIMIT: usize = 50;

/// One fetched row: a mapping from column name to a scalar JSON value.
pub type Record = serde_json::Map<String, Value>;

/// A source of table rows.
#[async_trait]
pub trait RowSource {
    /// Returns at most [`ROW_LIMIT`] records from the named table.
    async fn select_rows(&self, table_name: &str) -> ReportFactoryResult<Vec<Record>>;
}

/// HTTP client for the hosted table service's REST interface.
pub struct TableClient {
    http: reqwest::Client,
    config: ServiceConfig,
}

impl TableClient {
    /// Creates a client from a validated configuration.
    pub fn new(config: ServiceConfig) -> ReportFactoryResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(ReportFactoryError::HttpError)?;
        Ok(Self { http, config })
    }

    fn table_url(&self, table_name: &str) -> String {
        format!(
            "{}/rest/v1/{}?select=*&limit={}",
            self.config.endpoint, table_name, ROW_LIMIT
        )
    }
}

#[async_trait]
impl RowSource for TableClient {
    async fn select_rows(&self, table_name: &str) -> ReportFactoryResult<Vec<Record>> {
        if table_name.trim().is_empty() {
            return Err(ReportFactoryError::InvalidParameter(
                "table name must be a non-empty identifier".to_string(),
            ));
        }

        let url = self.table_url(table_name);
        debug!(table = table_name, url = %url, "fetching rows");

        let response = self
            .http
            .get(&url)
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ReportFactoryError::ConnectionFailed(e.to_string())
                } else {
                    ReportFactoryError::HttpError(e)
                }
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ReportFactoryError::TableNotFound(table_name.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // PostgREST reports an unknown relation as a 4xx with code 42P01 in the body.
            if body.contains("42P01") {
                return Err(ReportFactoryError::TableNotFound(table_name.to_string()));
            }
            return Err(ReportFactoryError::ConnectionFailed(format!(
                "service answered {} for table '{}'",
                status, table_name
            )));
        }

        let payload: Value = response.json().await?;
        let rows = match payload {
            Value::Array(rows) => rows,
            other => {
                return Err(ReportFactoryError::ParseFailure(format!(
                    "expected a JSON array of rows, got {}",
                    value_kind(&other)
                )))
            }
        };

        let mut records = Vec::with_capacity(rows.len());
        for (idx, row) in rows.into_iter().enumerate() {
            match row {
                Value::Object(map) => records.push(map),
                other => {
                    return Err(ReportFactoryError::ParseFailure(format!(
                        "row {} is not a JSON object, got {}",
                        idx,
                        value_kind(&other)
                    )))
                }
            }
        }
        debug!(table = table_name, rows = records.len(), "fetched rows");
        Ok(records)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

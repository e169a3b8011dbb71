//! # Report Factory
//!
//! Report Factory is a small reporting library built on Apache DataFusion. It pulls rows
//! from a hosted table service, loads them into DataFrames, derives grouped and counted
//! summary views (hourly histograms, daily series, location clusters, category rankings),
//! and maps those summaries onto Vega-Lite chart specifications that can be assembled
//! into a self-contained HTML dashboard.
//!
//! ## Modules
//!
//! - [`config`]: service endpoint and credential configuration, validated eagerly.
//! - [`exceptions`]: the crate's error type and result alias.
//! - [`fetch`]: the bounded remote table read (`RowSource` and its HTTP client).
//! - [`load`]: turning fetched records and downloaded CSV datasets into DataFrames.
//! - [`reports`]: the aggregation operations that produce chart-ready summaries.
//! - [`charts`]: chart specifications and the categorical color mapping.
//! - [`dashboard`]: assembling charts and tables into a renderable HTML page.
//!
//! ## Example
//!
//! ```rust,no_run
//! use datafusion::prelude::SessionContext;
//! use report_factory::config::ServiceConfig;
//! use report_factory::fetch::{RowSource, TableClient};
//! use report_factory::load::records_to_dataframe;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig::from_env()?;
//! let client = TableClient::new(config)?;
//! let rows = client.select_rows("puffles").await?;
//!
//! let ctx = SessionContext::new();
//! let df = records_to_dataframe(&ctx, &rows)?;
//! df.show().await?;
//! # Ok(())
//! # }
//! ```

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod exceptions;
pub mod fetch;
pub mod load;
pub mod logging;
pub mod reports;

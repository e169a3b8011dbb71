//! ## Tabular Loading
//!
//! This module turns raw inputs into DataFusion DataFrames:
//!
//! - [`records_to_dataframe`] converts fetched JSON records into an in-memory frame
//!   whose columns are the union of the record keys, with per-column types inferred
//!   from the values.
//! - [`with_index`] re-keys a frame by a designated column, sorting rows ascending by it.
//! - [`fetch_csv_dataset`] downloads a (possibly gzipped) CSV dataset once per run,
//!   stages it in the temp directory, and reads it through DataFusion's CSV reader
//!   with lowercased column names.
//! - [`parse_timestamp_column`] parses a text column into timestamps with an explicit
//!   format, materializing the frame so malformed values surface eagerly.
//!
//! Errors are returned as `ReportFactoryError` and results are wrapped in
//! `ReportFactoryResult`.

use crate::exceptions::{ReportFactoryError, ReportFactoryResult};
use crate::fetch::Record;
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use datafusion::datasource::MemTable;
use datafusion::functions_aggregate::expr_fn::count;
use datafusion::prelude::*;
use datafusion_functions::datetime::to_timestamp;
use flate2::read::GzDecoder;
use serde_json::Value;
use std::io::Read;
use std::sync::Arc;
use tracing::debug;

/// Per-column value kind observed while scanning records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Unknown,
    Bool,
    Int,
    Float,
    Text,
}

impl ColumnKind {
    /// Widens the current kind with the kind of one more value.
    fn widen(self, value: &Value, column: &str) -> ReportFactoryResult<Self> {
        let observed = match value {
            Value::Null => return Ok(self),
            Value::Bool(_) => Self::Bool,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    Self::Int
                } else {
                    Self::Float
                }
            }
            Value::String(_) => Self::Text,
            Value::Array(_) | Value::Object(_) => {
                return Err(ReportFactoryError::ParseFailure(format!(
                    "column '{}' contains a non-scalar value",
                    column
                )))
            }
        };
        match (self, observed) {
            (Self::Unknown, kind) => Ok(kind),
            (current, kind) if current == kind => Ok(current),
            (Self::Int, Self::Float) | (Self::Float, Self::Int) => Ok(Self::Float),
            (current, kind) => Err(ReportFactoryError::SchemaMismatch(format!(
                "column '{}' mixes {:?} and {:?} values",
                column, current, kind
            ))),
        }
    }

    fn data_type(self) -> DataType {
        match self {
            // A column with only nulls carries no type information; default to text.
            Self::Unknown | Self::Text => DataType::Utf8,
            Self::Bool => DataType::Boolean,
            Self::Int => DataType::Int64,
            Self::Float => DataType::Float64,
        }
    }
}

/// Converts fetched records into a DataFrame.
///
/// The columns are the keys of the first record; every subsequent record must carry
/// exactly the same key set, otherwise `SchemaMismatch` is returned. Column types are
/// inferred from the values (Boolean, Int64, Float64, or Utf8), with JSON nulls
/// becoming Arrow nulls. An empty record slice is rejected with `InvalidParameter`.
pub fn records_to_dataframe(
    ctx: &SessionContext,
    records: &[Record],
) -> ReportFactoryResult<DataFrame> {
    let first = records.first().ok_or_else(|| {
        ReportFactoryError::InvalidParameter(
            "at least one record is required to build a DataFrame".to_string(),
        )
    })?;
    let columns: Vec<String> = first.keys().cloned().collect();

    for (idx, record) in records.iter().enumerate() {
        if record.len() != columns.len() || !columns.iter().all(|c| record.contains_key(c)) {
            return Err(ReportFactoryError::SchemaMismatch(format!(
                "record {} does not share the column set of the first record",
                idx
            )));
        }
    }

    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());
    for column in &columns {
        let mut kind = ColumnKind::Unknown;
        for record in records {
            kind = kind.widen(&record[column], column)?;
        }
        fields.push(Field::new(column, kind.data_type(), true));
        arrays.push(build_column(records, column, kind)?);
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;
    let table = MemTable::try_new(schema, vec![vec![batch]])?;
    debug!(rows = records.len(), columns = columns.len(), "loaded records");
    ctx.read_table(Arc::new(table)).map_err(Into::into)
}

fn build_column(records: &[Record], column: &str, kind: ColumnKind) -> ReportFactoryResult<ArrayRef> {
    let array: ArrayRef = match kind {
        ColumnKind::Bool => Arc::new(
            records
                .iter()
                .map(|r| r[column].as_bool())
                .collect::<BooleanArray>(),
        ),
        ColumnKind::Int => {
            let mut values = Vec::with_capacity(records.len());
            for record in records {
                let value = &record[column];
                if value.is_null() {
                    values.push(None);
                } else {
                    let parsed = value.as_i64().ok_or_else(|| {
                        ReportFactoryError::ParseFailure(format!(
                            "column '{}' holds an integer out of the signed 64-bit range",
                            column
                        ))
                    })?;
                    values.push(Some(parsed));
                }
            }
            Arc::new(Int64Array::from(values))
        }
        ColumnKind::Float => Arc::new(
            records
                .iter()
                .map(|r| r[column].as_f64())
                .collect::<Float64Array>(),
        ),
        ColumnKind::Unknown | ColumnKind::Text => Arc::new(
            records
                .iter()
                .map(|r| r[column].as_str().map(|s| s.to_string()))
                .collect::<StringArray>(),
        ),
    };
    Ok(array)
}

/// Re-keys a DataFrame by the designated column.
///
/// The column must exist and hold unique values; otherwise `InvalidKey` is returned.
/// Rows come back sorted ascending by the key.
pub async fn with_index(df: DataFrame, key: &str) -> ReportFactoryResult<DataFrame> {
    df.schema().field_with_name(None, key).map_err(|_| {
        ReportFactoryError::InvalidKey(format!("column '{}' not found", key))
    })?;

    let duplicates = df
        .clone()
        .aggregate(vec![ident(key)], vec![count(lit(1)).alias("cnt")])?
        .filter(col("cnt").gt(lit(1)))?
        .count()
        .await?;
    if duplicates > 0 {
        return Err(ReportFactoryError::InvalidKey(format!(
            "column '{}' contains duplicate values",
            key
        )));
    }

    df.sort(vec![ident(key).sort(true, false)])
        .map_err(Into::into)
}

/// Downloads a CSV dataset from a public URL and reads it into a DataFrame.
///
/// A URL ending in `.gz` is decompressed before reading. The file is staged in the
/// system temp directory because DataFusion's CSV reader works from paths. Column
/// names are lowercased and the frame is truncated to `nrows` rows.
pub async fn fetch_csv_dataset(
    ctx: &SessionContext,
    http: &reqwest::Client,
    url: &str,
    nrows: usize,
) -> ReportFactoryResult<DataFrame> {
    debug!(url, nrows, "downloading CSV dataset");
    let response = http.get(url).send().await.map_err(|e| {
        if e.is_connect() || e.is_timeout() {
            ReportFactoryError::ConnectionFailed(e.to_string())
        } else {
            ReportFactoryError::HttpError(e)
        }
    })?;
    if !response.status().is_success() {
        return Err(ReportFactoryError::ConnectionFailed(format!(
            "dataset download answered {}",
            response.status()
        )));
    }
    let body = response.bytes().await?;

    let bytes = if url.ends_with(".gz") {
        let mut decoded = Vec::new();
        GzDecoder::new(body.as_ref()).read_to_end(&mut decoded)?;
        decoded
    } else {
        body.to_vec()
    };

    let staged = std::env::temp_dir().join(format!("report_factory_{}.csv", std::process::id()));
    std::fs::write(&staged, &bytes)?;
    let path = staged.to_str().ok_or_else(|| {
        ReportFactoryError::InvalidParameter("temp path is not valid UTF-8".to_string())
    })?;

    let df = ctx.read_csv(path, CsvReadOptions::new()).await?;
    let lowercased: Vec<Expr> = df
        .schema()
        .fields()
        .iter()
        .map(|f| ident(f.name()).alias(f.name().to_lowercase()))
        .collect();
    df.select(lowercased)?
        .limit(0, Some(nrows))
        .map_err(Into::into)
}

/// Parses a text column into `Timestamp(Nanosecond)` values using an explicit
/// chrono format string, replacing the column in place.
///
/// The frame is materialized so that a malformed value fails here, as a
/// `ParseFailure`, instead of surfacing later inside an aggregation.
pub async fn parse_timestamp_column(
    ctx: &SessionContext,
    df: DataFrame,
    column: &str,
    format: &str,
) -> ReportFactoryResult<DataFrame> {
    df.schema().field_with_name(None, column).map_err(|_| {
        ReportFactoryError::MissingColumn(format!("column '{}' not found", column))
    })?;

    let exprs: Vec<Expr> = df
        .schema()
        .fields()
        .iter()
        .map(|f| {
            if f.name() == column {
                to_timestamp()
                    .call(vec![ident(column), lit(format)])
                    .alias(column)
            } else {
                ident(f.name())
            }
        })
        .collect();

    let parsed = df.select(exprs)?;
    let schema = Arc::new(Schema::from(parsed.schema()));
    let batches = parsed.collect().await.map_err(|e| {
        ReportFactoryError::ParseFailure(format!(
            "column '{}' does not match format '{}': {}",
            column, format, e
        ))
    })?;

    let table = MemTable::try_new(schema, vec![batches])?;
    ctx.read_table(Arc::new(table)).map_err(Into::into)
}

//! ## Time-based report operations
//!
//! This module implements the summary views derived from a timestamp column:
//!
//! - **Hourly histogram:** counts per hour-of-day (0-23), with explicit zeros for
//!   empty hours, so the 24 values always sum to the frame's row count.
//! - **Daily counts:** one row per distinct calendar date, ascending, with a
//!   human-readable label (month name plus day-of-month without a leading zero).
//! - **Hour filter:** the subset of rows whose timestamp falls in a given hour,
//!   feeding the pickup map.
//!
//! Errors are returned as `ReportFactoryError` and results are wrapped in
//! `ReportFactoryResult`.

use crate::exceptions::{ReportFactoryError, ReportFactoryResult};
use arrow::array::{
    Array, ArrayRef, Float64Array, Int32Array, Int64Array, TimestampMicrosecondArray,
    TimestampMillisecondArray, TimestampNanosecondArray, TimestampSecondArray,
};
use chrono::{DateTime, NaiveDate};
use datafusion::arrow::datatypes::DataType;
use datafusion::functions_aggregate::expr_fn::count;
use datafusion::prelude::*;
use datafusion_expr::{lit, Expr};
use datafusion_functions::datetime::{date_part, date_trunc};
use serde::Serialize;

/// Number of buckets in the hourly histogram.
pub const HOURS_PER_DAY: usize = 24;

/// Validates that a column exists and is of a datetime type (Timestamp, Date32, or Date64).
fn validate_timestamp_column(df: &DataFrame, col_name: &str) -> ReportFactoryResult<()> {
    let field = df.schema().field_with_name(None, col_name).map_err(|_| {
        ReportFactoryError::MissingColumn(format!("Column '{}' not found", col_name))
    })?;
    match field.data_type() {
        DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => Ok(()),
        dt => Err(ReportFactoryError::InvalidParameter(format!(
            "Column '{}' must be a datetime type (Timestamp, Date32, or Date64), but found {:?}",
            col_name, dt
        ))),
    }
}

/// Reads a numeric group-key array as i64, accepting the integer and float widths
/// DataFusion produces for `date_part`.
fn group_key_as_i64(array: &ArrayRef, idx: usize, what: &str) -> ReportFactoryResult<i64> {
    if array.is_null(idx) {
        return Err(ReportFactoryError::ParseFailure(format!(
            "null {} in aggregation output",
            what
        )));
    }
    if let Some(arr) = array.as_any().downcast_ref::<Int32Array>() {
        Ok(arr.value(idx) as i64)
    } else if let Some(arr) = array.as_any().downcast_ref::<Int64Array>() {
        Ok(arr.value(idx))
    } else if let Some(arr) = array.as_any().downcast_ref::<Float64Array>() {
        Ok(arr.value(idx) as i64)
    } else {
        Err(ReportFactoryError::ParseFailure(format!(
            "unexpected array type for {}: {:?}",
            what,
            array.data_type()
        )))
    }
}

/// Reads a timestamp array value as nanoseconds since the epoch, whatever the unit.
fn timestamp_as_nanos(array: &ArrayRef, idx: usize) -> ReportFactoryResult<i64> {
    if array.is_null(idx) {
        return Err(ReportFactoryError::ParseFailure(
            "null timestamp in aggregation output".to_string(),
        ));
    }
    if let Some(arr) = array.as_any().downcast_ref::<TimestampNanosecondArray>() {
        Ok(arr.value(idx))
    } else if let Some(arr) = array.as_any().downcast_ref::<TimestampMicrosecondArray>() {
        Ok(arr.value(idx) * 1_000)
    } else if let Some(arr) = array.as_any().downcast_ref::<TimestampMillisecondArray>() {
        Ok(arr.value(idx) * 1_000_000)
    } else if let Some(arr) = array.as_any().downcast_ref::<TimestampSecondArray>() {
        Ok(arr.value(idx) * 1_000_000_000)
    } else {
        Err(ReportFactoryError::ParseFailure(format!(
            "unexpected array type for date group: {:?}",
            array.data_type()
        )))
    }
}

fn counts_column(array: &ArrayRef) -> ReportFactoryResult<&Int64Array> {
    array
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| {
            ReportFactoryError::ParseFailure(format!(
                "expected Int64 counts, got {:?}",
                array.data_type()
            ))
        })
}

/// Counts rows per hour-of-day.
///
/// Returns 24 counts indexed by hour, including zeros for hours with no rows, so the
/// values sum exactly to the frame's row count.
pub async fn hourly_histogram(
    df: &DataFrame,
    ts_col: &str,
) -> ReportFactoryResult<[u64; HOURS_PER_DAY]> {
    validate_timestamp_column(df, ts_col)?;

    let hour_expr: Expr = date_part()
        .call(vec![lit("hour"), ident(ts_col)])
        .alias("hour");
    let grouped = df
        .clone()
        .aggregate(vec![hour_expr], vec![count(lit(1)).alias("cnt")])?;
    let batches = grouped.collect().await?;

    let mut counts = [0u64; HOURS_PER_DAY];
    for batch in &batches {
        let cnt = counts_column(batch.column(1))?;
        for i in 0..batch.num_rows() {
            let hour = group_key_as_i64(batch.column(0), i, "hour")?;
            if !(0..HOURS_PER_DAY as i64).contains(&hour) {
                return Err(ReportFactoryError::ParseFailure(format!(
                    "hour {} out of range",
                    hour
                )));
            }
            counts[hour as usize] += cnt.value(i) as u64;
        }
    }
    Ok(counts)
}

/// One calendar date with its row count and display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    /// The calendar date rows were grouped by.
    pub date: NaiveDate,
    /// Month name plus day-of-month, no leading zero (e.g. "September 1").
    pub label: String,
    /// Number of rows on that date.
    pub count: i64,
}

/// Counts rows per calendar date, ascending by date.
pub async fn daily_counts(df: &DataFrame, ts_col: &str) -> ReportFactoryResult<Vec<DailyCount>> {
    validate_timestamp_column(df, ts_col)?;

    let date_expr: Expr = date_trunc()
        .call(vec![lit("day"), ident(ts_col)])
        .alias("date");
    let grouped = df
        .clone()
        .aggregate(vec![date_expr], vec![count(lit(1)).alias("cnt")])?
        .sort(vec![col("date").sort(true, false)])?;
    let batches = grouped.collect().await?;

    let mut out = Vec::new();
    for batch in &batches {
        let cnt = counts_column(batch.column(1))?;
        for i in 0..batch.num_rows() {
            let nanos = timestamp_as_nanos(batch.column(0), i)?;
            let secs = nanos.div_euclid(1_000_000_000);
            let date = DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| {
                    ReportFactoryError::ParseFailure(format!(
                        "timestamp {} out of range for a calendar date",
                        nanos
                    ))
                })?
                .date_naive();
            out.push(DailyCount {
                date,
                label: date.format("%B %-d").to_string(),
                count: cnt.value(i),
            });
        }
    }
    Ok(out)
}

/// Returns the rows whose timestamp falls in the given hour-of-day.
pub fn filter_by_hour(df: &DataFrame, ts_col: &str, hour: u32) -> ReportFactoryResult<DataFrame> {
    if hour as usize >= HOURS_PER_DAY {
        return Err(ReportFactoryError::InvalidParameter(format!(
            "hour must be in 0..{}, got {}",
            HOURS_PER_DAY, hour
        )));
    }
    validate_timestamp_column(df, ts_col)?;
    let predicate = date_part()
        .call(vec![lit("hour"), ident(ts_col)])
        .eq(lit(hour as i64));
    df.clone().filter(predicate).map_err(Into::into)
}

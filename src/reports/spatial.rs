//! ## Location-based report operations
//!
//! Latitude/longitude pairs are very precise; before grouping, both coordinates are
//! rounded to 3 decimal digits so nearby points merge into one cluster. Rounding uses
//! DataFusion's `round` (half away from zero) and is applied identically to every row.
//!
//! Clusters are ordered by count descending. Ties are broken by the rounded
//! (latitude, longitude) pair ascending, so the selection is deterministic.

use crate::exceptions::{ReportFactoryError, ReportFactoryResult};
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array};
use datafusion::arrow::datatypes::DataType;
use datafusion::functions_aggregate::expr_fn::count;
use datafusion::prelude::*;
use datafusion_expr::lit;
use datafusion_functions::math::round;
use serde::Serialize;

/// How many clusters the top-N selection keeps.
pub const TOP_CLUSTER_COUNT: usize = 5;

/// Decimal digits kept when truncating coordinates before grouping.
pub const COORDINATE_DECIMALS: i32 = 3;

/// One rounded coordinate pair with its row count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationCluster {
    /// Latitude rounded to [`COORDINATE_DECIMALS`] digits.
    pub lat: f64,
    /// Longitude rounded to [`COORDINATE_DECIMALS`] digits.
    pub lon: f64,
    /// Number of rows in the cluster.
    pub count: i64,
}

/// Validates that a column exists and is numeric.
fn validate_numeric_column(df: &DataFrame, col_name: &str) -> ReportFactoryResult<()> {
    let field = df.schema().field_with_name(None, col_name).map_err(|_| {
        ReportFactoryError::MissingColumn(format!("Column '{}' not found", col_name))
    })?;
    if field.data_type().is_numeric() {
        Ok(())
    } else {
        Err(ReportFactoryError::InvalidParameter(format!(
            "Column '{}' must be numeric, but found {:?}",
            col_name,
            field.data_type()
        )))
    }
}

fn float_column<'a>(array: &'a ArrayRef, what: &str) -> ReportFactoryResult<&'a Float64Array> {
    array
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| {
            ReportFactoryError::ParseFailure(format!(
                "expected Float64 {}, got {:?}",
                what,
                array.data_type()
            ))
        })
}

/// Returns the `n` most populated coordinate clusters, count descending.
pub async fn top_location_clusters(
    df: &DataFrame,
    lat_col: &str,
    lon_col: &str,
    n: usize,
) -> ReportFactoryResult<Vec<LocationCluster>> {
    if n == 0 {
        return Err(ReportFactoryError::InvalidParameter(
            "cluster count must be at least 1".to_string(),
        ));
    }
    validate_numeric_column(df, lat_col)?;
    validate_numeric_column(df, lon_col)?;

    let lat_bucket = round()
        .call(vec![ident(lat_col), lit(COORDINATE_DECIMALS)])
        .alias("lat_bucket");
    let lon_bucket = round()
        .call(vec![ident(lon_col), lit(COORDINATE_DECIMALS)])
        .alias("lon_bucket");

    let grouped = df
        .clone()
        .aggregate(vec![lat_bucket, lon_bucket], vec![count(lit(1)).alias("cnt")])?
        .sort(vec![
            col("cnt").sort(false, false),
            col("lat_bucket").sort(true, false),
            col("lon_bucket").sort(true, false),
        ])?
        .limit(0, Some(n))?;
    let batches = grouped.collect().await?;

    let mut clusters = Vec::new();
    for batch in &batches {
        let lats = float_column(batch.column(0), "latitude buckets")?;
        let lons = float_column(batch.column(1), "longitude buckets")?;
        let cnts = batch
            .column(2)
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| {
                ReportFactoryError::ParseFailure(format!(
                    "expected Int64 counts, got {:?}",
                    batch.column(2).data_type()
                ))
            })?;
        for i in 0..batch.num_rows() {
            if lats.is_null(i) || lons.is_null(i) {
                return Err(ReportFactoryError::ParseFailure(
                    "null coordinate in aggregation output".to_string(),
                ));
            }
            clusters.push(LocationCluster {
                lat: lats.value(i),
                lon: lons.value(i),
                count: cnts.value(i),
            });
        }
    }
    Ok(clusters)
}

/// Materializes the (latitude, longitude) pairs of a frame for the scatter map.
pub async fn collect_points(
    df: &DataFrame,
    lat_col: &str,
    lon_col: &str,
) -> ReportFactoryResult<Vec<(f64, f64)>> {
    validate_numeric_column(df, lat_col)?;
    validate_numeric_column(df, lon_col)?;

    let selected = df
        .clone()
        .select(vec![ident(lat_col), ident(lon_col)])?;
    let batches = selected.collect().await?;

    let mut points = Vec::new();
    for batch in &batches {
        let lats = float_column(batch.column(0), "latitudes")?;
        let lons = float_column(batch.column(1), "longitudes")?;
        for i in 0..batch.num_rows() {
            if lats.is_null(i) || lons.is_null(i) {
                return Err(ReportFactoryError::ParseFailure(
                    "null coordinate in frame".to_string(),
                ));
            }
            points.push((lats.value(i), lons.value(i)));
        }
    }
    Ok(points)
}

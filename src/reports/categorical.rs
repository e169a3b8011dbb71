//! ## Categorical report operations
//!
//! Groups rows by a text column and ranks the categories by how many rows each one
//! holds. All categories are returned, ordered by count descending; ties are broken
//! by category name ascending so re-runs yield identical output.

use crate::exceptions::{ReportFactoryError, ReportFactoryResult};
use arrow::array::{Array, Int64Array, StringArray};
use datafusion::arrow::datatypes::DataType;
use datafusion::functions_aggregate::expr_fn::count;
use datafusion::prelude::*;
use datafusion_expr::lit;
use serde::Serialize;

/// One category with its row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// The category value.
    pub category: String,
    /// Number of rows in the category.
    pub count: i64,
}

/// Validates that a column exists and holds text values.
fn validate_text_column(df: &DataFrame, col_name: &str) -> ReportFactoryResult<()> {
    let field = df.schema().field_with_name(None, col_name).map_err(|_| {
        ReportFactoryError::MissingColumn(format!("Column '{}' not found", col_name))
    })?;
    match field.data_type() {
        DataType::Utf8 => Ok(()),
        dt => Err(ReportFactoryError::InvalidParameter(format!(
            "Column '{}' must be a text column, but found {:?}",
            col_name, dt
        ))),
    }
}

/// Counts rows per category, ordered by count descending.
pub async fn category_counts(
    df: &DataFrame,
    column: &str,
) -> ReportFactoryResult<Vec<CategoryCount>> {
    validate_text_column(df, column)?;

    let grouped = df
        .clone()
        .aggregate(vec![ident(column)], vec![count(lit(1)).alias("cnt")])?
        .sort(vec![
            col("cnt").sort(false, false),
            ident(column).sort(true, false),
        ])?;
    let batches = grouped.collect().await?;

    let mut out = Vec::new();
    for batch in &batches {
        let categories = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| {
                ReportFactoryError::ParseFailure(format!(
                    "expected Utf8 categories, got {:?}",
                    batch.column(0).data_type()
                ))
            })?;
        let counts = batch
            .column(1)
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| {
                ReportFactoryError::ParseFailure(format!(
                    "expected Int64 counts, got {:?}",
                    batch.column(1).data_type()
                ))
            })?;
        for i in 0..batch.num_rows() {
            // A null category carries no label to chart; it is left out of the ranking.
            if categories.is_null(i) {
                continue;
            }
            out.push(CategoryCount {
                category: categories.value(i).to_string(),
                count: counts.value(i),
            });
        }
    }
    Ok(out)
}

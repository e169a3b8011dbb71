use arrow::array::{ArrayRef, Float64Array, TimestampNanosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit as ArrowTimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use datafusion::datasource::MemTable;
use datafusion::prelude::*;
use report_factory::exceptions::ReportFactoryError;
use report_factory::reports::temporal::{
    daily_counts, filter_by_hour, hourly_histogram, HOURS_PER_DAY,
};
use std::sync::Arc;

const NANOS_PER_SEC: i64 = 1_000_000_000;

// 2014-09-01T00:00:00Z
const SEP_1: i64 = 1_409_529_600;
// 2014-09-02T00:00:00Z
const SEP_2: i64 = 1_409_616_000;

/// Create a DataFrame with one timestamp column "ts" from epoch seconds.
async fn create_timestamp_df(seconds: &[i64]) -> DataFrame {
    let schema = Arc::new(Schema::new(vec![Field::new(
        "ts",
        DataType::Timestamp(ArrowTimeUnit::Nanosecond, None),
        false,
    )]));
    let ts_values: Vec<i64> = seconds.iter().map(|s| s * NANOS_PER_SEC).collect();
    let ts_array = TimestampNanosecondArray::from(ts_values);
    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(ts_array) as ArrayRef]).unwrap();
    let mem_table = MemTable::try_new(schema, vec![vec![batch]]).unwrap();

    let ctx = SessionContext::new();
    ctx.register_table("pickups", Arc::new(mem_table)).unwrap();
    ctx.table("pickups").await.unwrap()
}

/// ------------------ Normal Operation Tests ------------------

#[tokio::test]
async fn test_hourly_histogram_buckets() {
    // Three rows on the same date: 09:00, 09:30, 14:00.
    let df = create_timestamp_df(&[
        SEP_1 + 9 * 3600,
        SEP_1 + 9 * 3600 + 30 * 60,
        SEP_1 + 14 * 3600,
    ])
    .await;

    let histogram = hourly_histogram(&df, "ts").await.unwrap();
    assert_eq!(histogram.len(), HOURS_PER_DAY);
    assert_eq!(histogram[9], 2);
    assert_eq!(histogram[14], 1);
    for (hour, count) in histogram.iter().enumerate() {
        if hour != 9 && hour != 14 {
            assert_eq!(*count, 0, "hour {} should be empty", hour);
        }
    }
    assert_eq!(histogram.iter().sum::<u64>(), 3);
}

#[tokio::test]
async fn test_hourly_histogram_sums_to_row_count() {
    let seconds: Vec<i64> = (0..100).map(|i| SEP_1 + i * 977).collect();
    let df = create_timestamp_df(&seconds).await;
    let histogram = hourly_histogram(&df, "ts").await.unwrap();
    assert_eq!(histogram.iter().sum::<u64>(), 100);
}

#[tokio::test]
async fn test_daily_counts_order_and_labels() {
    // Two rows on September 2nd, one on September 1st.
    let df = create_timestamp_df(&[
        SEP_2 + 8 * 3600,
        SEP_1 + 12 * 3600,
        SEP_2 + 20 * 3600,
    ])
    .await;

    let daily = daily_counts(&df, "ts").await.unwrap();
    assert_eq!(daily.len(), 2);

    assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2014, 9, 1).unwrap());
    assert_eq!(daily[0].label, "September 1");
    assert_eq!(daily[0].count, 1);

    assert_eq!(daily[1].date, NaiveDate::from_ymd_opt(2014, 9, 2).unwrap());
    assert_eq!(daily[1].label, "September 2");
    assert_eq!(daily[1].count, 2);

    // Counts sum to the row count and dates are strictly increasing.
    assert_eq!(daily.iter().map(|d| d.count).sum::<i64>(), 3);
    assert!(daily.windows(2).all(|w| w[0].date < w[1].date));
}

#[tokio::test]
async fn test_daily_counts_deterministic_rerun() {
    let seconds: Vec<i64> = (0..50).map(|i| SEP_1 + i * 3671).collect();
    let df = create_timestamp_df(&seconds).await;
    let first = daily_counts(&df, "ts").await.unwrap();
    let second = daily_counts(&df, "ts").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_filter_by_hour_keeps_matching_rows() {
    let df = create_timestamp_df(&[
        SEP_1 + 17 * 3600,
        SEP_1 + 17 * 3600 + 59 * 60,
        SEP_1 + 18 * 3600,
    ])
    .await;

    let filtered = filter_by_hour(&df, "ts", 17).unwrap();
    let rows: usize = filtered
        .collect()
        .await
        .unwrap()
        .iter()
        .map(|b| b.num_rows())
        .sum();
    assert_eq!(rows, 2);
}

/// ------------------ Error and Edge Case Tests ------------------

#[tokio::test]
async fn test_hourly_histogram_missing_column() {
    let df = create_timestamp_df(&[SEP_1]).await;
    let err = hourly_histogram(&df, "nonexistent").await.unwrap_err();
    assert!(matches!(err, ReportFactoryError::MissingColumn(_)));
}

#[tokio::test]
async fn test_hourly_histogram_non_timestamp_column() {
    let schema = Arc::new(Schema::new(vec![Field::new("ts", DataType::Float64, false)]));
    let values: ArrayRef = Arc::new(Float64Array::from(vec![1.0_f64, 2.0_f64]));
    let batch = RecordBatch::try_new(schema.clone(), vec![values]).unwrap();
    let mem_table = MemTable::try_new(schema, vec![vec![batch]]).unwrap();
    let ctx = SessionContext::new();
    ctx.register_table("t", Arc::new(mem_table)).unwrap();
    let df = ctx.table("t").await.unwrap();

    let err = hourly_histogram(&df, "ts").await.unwrap_err();
    assert!(matches!(err, ReportFactoryError::InvalidParameter(_)));
}

#[tokio::test]
async fn test_filter_by_hour_rejects_out_of_range_hour() {
    let df = create_timestamp_df(&[SEP_1]).await;
    let err = filter_by_hour(&df, "ts", 24).unwrap_err();
    assert!(matches!(err, ReportFactoryError::InvalidParameter(_)));
}

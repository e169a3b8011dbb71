//! Builds the "Uber pickups in NYC" dashboard: downloads the public pickup dataset,
//! derives the hourly histogram, the 17:00 pickup map, the daily count series, and
//! the five most popular pickup clusters, then fetches the hosted `puffles` table and
//! ranks its colors. The result is written to `dashboard.html` as a self-contained
//! page of Vega-Lite charts.

use datafusion::prelude::SessionContext;
use report_factory::charts::{
    category_counts_chart, daily_counts_chart, hourly_histogram_chart, pickup_map_chart,
    top_locations_chart, DEFAULT_MARKER_COLOR,
};
use report_factory::config::ServiceConfig;
use report_factory::dashboard::{table_section_body, Dashboard};
use report_factory::fetch::{RowSource, TableClient};
use report_factory::load::{
    fetch_csv_dataset, parse_timestamp_column, records_to_dataframe, with_index,
};
use report_factory::reports::categorical::category_counts;
use report_factory::reports::spatial::{collect_points, top_location_clusters, TOP_CLUSTER_COUNT};
use report_factory::reports::temporal::{daily_counts, filter_by_hour, hourly_histogram};
use std::error::Error;
use std::process::ExitCode;

const DATA_URL: &str =
    "https://s3-us-west-2.amazonaws.com/streamlit-demo-data/uber-raw-data-sep14.csv.gz";
const DATASET_ROWS: usize = 10_000;
const DATE_COLUMN: &str = "date/time";
const DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";
const MAP_HOUR: u32 = 17;
const PUFFLE_TABLE: &str = "puffles";
const OUTPUT_PATH: &str = "dashboard.html";

// Looked up by hand from the rounded coordinates of the September 2014 dataset.
const LOCATION_LABELS: [&str; TOP_CLUSTER_COUNT] = [
    "John F. Kennedy International Airport, Terminal 4",
    "LaGuardia Airport",
    "Chelsea Market",
    "Newark Liberty International Airport",
    "John F. Kennedy International Airport, Terminal 5",
];

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pickups-dashboard: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let ctx = SessionContext::new();
    let http = reqwest::Client::new();
    let mut dash = Dashboard::new("Uber pickups in NYC!");

    println!("Loading data...");
    let data = fetch_csv_dataset(&ctx, &http, DATA_URL, DATASET_ROWS).await?;
    let data = parse_timestamp_column(&ctx, data, DATE_COLUMN, DATE_FORMAT).await?;
    println!("Done!");

    let histogram = hourly_histogram(&data, DATE_COLUMN).await?;
    dash.push_chart(hourly_histogram_chart(
        "Number of pickups by hour",
        &histogram,
    ));

    let filtered = filter_by_hour(&data, DATE_COLUMN, MAP_HOUR)?;
    let points = collect_points(&filtered, "lat", "lon").await?;
    dash.push_chart(pickup_map_chart(
        format!("Map of all pickups at {}:00", MAP_HOUR),
        &points,
    ));

    let daily = daily_counts(&data, DATE_COLUMN).await?;
    dash.push_chart(daily_counts_chart(
        "Number of pickups per day",
        &daily,
        DEFAULT_MARKER_COLOR,
    ));

    let clusters = top_location_clusters(&data, "lat", "lon", TOP_CLUSTER_COUNT).await?;
    let labels: Option<&[&str]> = if clusters.len() == LOCATION_LABELS.len() {
        Some(&LOCATION_LABELS)
    } else {
        None
    };
    dash.push_chart(top_locations_chart(
        "Top 5 most popular pickup destinations",
        &clusters,
        labels,
        DEFAULT_MARKER_COLOR,
    ));

    dash.push_heading("Supabase Integration");
    let config = ServiceConfig::from_env()?;
    let client = TableClient::new(config)?;
    let rows = client.select_rows(PUFFLE_TABLE).await?;
    let puffles = records_to_dataframe(&ctx, &rows)?;
    let puffles = with_index(puffles, "id").await?;
    dash.push_table("Puffles", table_section_body(&puffles).await?);

    let colors = category_counts(&puffles, "color").await?;
    let mut color_chart = category_counts_chart("Most popular puffle colors", &colors);
    color_chart.x_title = Some("Puffle Color".to_string());
    color_chart.y_title = Some("Number of Puffles".to_string());
    dash.push_chart(color_chart);

    std::fs::write(OUTPUT_PATH, dash.render_html())?;
    println!("Dashboard written to {}", OUTPUT_PATH);
    Ok(())
}

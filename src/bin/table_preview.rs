//! Fetches up to 50 rows from the hosted `puffles` table and prints them as a
//! DataFrame. Configuration comes from the `SUPABASE_URL` and `SUPABASE_KEY`
//! environment variables.

use datafusion::prelude::SessionContext;
use report_factory::config::ServiceConfig;
use report_factory::fetch::{RowSource, TableClient};
use report_factory::load::records_to_dataframe;
use std::error::Error;
use std::process::ExitCode;

const PUFFLE_TABLE: &str = "puffles";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("table-preview: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = ServiceConfig::from_env()?;
    let client = TableClient::new(config)?;

    println!("Reading in data and loading it as a DataFrame.");
    let rows = client.select_rows(PUFFLE_TABLE).await?;

    let ctx = SessionContext::new();
    let df = records_to_dataframe(&ctx, &rows)?;
    df.show().await?;
    Ok(())
}

use std::io::{self, Read};

use anyhow::{Context, Result};
use salary_dashboard::{Dashboard, DashboardConfig, DashboardError, FilterRequest};

/// Reads a JSON `FilterRequest` on stdin (empty input means no filters) and
/// writes the JSON `QueryResponse` to stdout.
fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::from_env()?;

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("reading request from stdin")?;
    let request: FilterRequest = if input.trim().is_empty() {
        FilterRequest::default()
    } else {
        serde_json::from_str(&input).context("parsing request JSON")?
    };

    let mut dashboard = Dashboard::new(config);
    let response = match dashboard.query(&request) {
        Ok(response) => response,
        Err(e @ DashboardError::NoDataFiles { .. }) => {
            log::error!("{e}. Please upload a valid file.");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    for warning in &response.warnings {
        log::warn!("{warning}");
    }
    for table in &response.tables {
        match table.empty_message() {
            Some(message) => log::info!("{}: {message}", table.title()),
            None => log::info!("{}: {}", table.title(), table.caption()),
        }
    }

    let json = serde_json::to_string_pretty(&response).context("serializing response")?;
    println!("{json}");
    Ok(())
}

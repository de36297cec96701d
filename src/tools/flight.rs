use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::info;

use super::Tool;
use crate::amadeus::{DateWindow, TravelData, inspiration_or_sample};

/// Flight inspiration search from the configured origin, with sample-data fallback
pub struct FlightInspirationTool {
    data: Arc<dyn TravelData>,
    origin: String,
    window: DateWindow,
    sample_path: PathBuf,
}

impl FlightInspirationTool {
    pub fn new(
        data: Arc<dyn TravelData>,
        origin: impl Into<String>,
        window: DateWindow,
        sample_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            data,
            origin: origin.into(),
            window,
            sample_path: sample_path.into(),
        }
    }
}

#[async_trait]
impl Tool for FlightInspirationTool {
    fn name(&self) -> &str {
        "search_flight_inspiration"
    }

    fn description(&self) -> &str {
        "Search round-trip flight destinations from the user's home airport for next week. \
         Returns a JSON list of destinations with IATA codes, dates, prices and booking links."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _params: Value) -> Result<String> {
        info!(origin = %self.origin, departure = %self.window.departure, "searching flight inspiration");

        let records = inspiration_or_sample(
            self.data.as_ref(),
            &self.origin,
            &self.window,
            &self.sample_path,
        )
        .await
        .context("flight search failed and sample data could not be loaded")?;

        info!(count = records.len(), "found flight inspirations");
        serde_json::to_string(&records).context("failed to serialise flight inspirations")
    }
}

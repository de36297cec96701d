use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Value, json};
use tracing::info;

use super::{NO_RESULT, Tool};
use crate::amadeus::{TravelData, summarize_offers};

/// Most hotel offers handed to the model per search
pub const HOTEL_RESULT_LIMIT: usize = 3;

/// Priced hotel offers in a city for a given stay
pub struct HotelOffersTool {
    data: Arc<dyn TravelData>,
    currency: String,
}

impl HotelOffersTool {
    pub fn new(data: Arc<dyn TravelData>, currency: impl Into<String>) -> Self {
        Self {
            data,
            currency: currency.into(),
        }
    }
}

fn date_param(params: &Value, name: &str) -> Result<NaiveDate> {
    let raw = params[name]
        .as_str()
        .with_context(|| format!("missing '{}' parameter", name))?;
    // accept full timestamps as well as plain dates
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .with_context(|| format!("'{}' must be a YYYY-MM-DD date, got '{}'", name, raw))
}

#[async_trait]
impl Tool for HotelOffersTool {
    fn name(&self) -> &str {
        "search_hotel_offers"
    }

    fn description(&self) -> &str {
        "Search hotel offers in a city for the given stay. Returns up to 3 offers \
         (name, price, currency, check_in, check_out) or null when nothing is available."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city_code": {
                    "type": "string",
                    "description": "IATA city code, e.g. PAR"
                },
                "check_in": {
                    "type": "string",
                    "description": "Check-in date (YYYY-MM-DD)"
                },
                "check_out": {
                    "type": "string",
                    "description": "Check-out date (YYYY-MM-DD)"
                }
            },
            "required": ["city_code", "check_in", "check_out"]
        })
    }

    async fn execute(&self, params: Value) -> Result<String> {
        let city_code = params["city_code"]
            .as_str()
            .context("missing 'city_code' parameter")?
            .trim()
            .to_uppercase();
        let check_in = date_param(&params, "check_in")?;
        let check_out = date_param(&params, "check_out")?;

        info!(city_code = %city_code, %check_in, %check_out, "searching hotel offers");

        let offers = self
            .data
            .search_hotels_by_city(&city_code, check_in, check_out)
            .await
            .with_context(|| format!("hotel offer search failed for {}", city_code))?;

        let summaries = offers
            .map(|offers| summarize_offers(&offers, HOTEL_RESULT_LIMIT, &self.currency))
            .unwrap_or_default();

        info!(city_code = %city_code, count = summaries.len(), "found hotel offers");
        if summaries.is_empty() {
            return Ok(NO_RESULT.to_string());
        }
        serde_json::to_string(&summaries).context("failed to serialise hotel offers")
    }
}

use std::sync::Arc;

use tracing::{error, info};

use super::runner::agent_loop;
use super::{HotelSearchResult, agent_error};
use crate::amadeus::TravelData;
use crate::config::Settings;
use crate::error::EvBotError;
use crate::llm::{LlmProvider, Message, parse_structured};
use crate::tools::{ErrorPolicy, HOTEL_RESULT_LIMIT, HotelOffersTool, ToolRegistry};

pub const HOTEL_AGENT_NAME: &str = "hotel";
const MAX_ITERATIONS: usize = 6;

/// Finds up to three hotel offers for one city and stay
pub struct HotelAgent {
    provider: Arc<dyn LlmProvider>,
    tools: ToolRegistry,
    language: String,
    currency: String,
}

impl HotelAgent {
    pub fn new(provider: Arc<dyn LlmProvider>, data: Arc<dyn TravelData>, settings: &Settings) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(
            HotelOffersTool::new(data, settings.currency.clone()),
            ErrorPolicy::Trap,
        );

        Self {
            provider,
            tools,
            language: settings.language.clone(),
            currency: settings.currency.clone(),
        }
    }

    pub fn system_prompt(&self) -> String {
        format!(
            r#"You are a helpful AI hotel assistant.

Your task is to suggest up to 3 hotel offers based on the hotel search results.
Only suggest hotels with complete and valid information (name, address, price, rating).
Do not suggest duplicate hotel names or invalid entries.

Tools:
- `search_hotel_offers`: returns hotel offers for a city code and stay dates, or null when nothing is available.
  Search each city at most once.

Answer with a single JSON object of this shape:
{{
  "city_name": "city name",
  "city_code": "IATA city code",
  "hotels": [
    {{
      "hotel_name": "name",
      "address": "full address",
      "rating": "star or customer rating, omit if unknown",
      "total_price": "total price for the whole stay",
      "check_in_date": "YYYY-MM-DD",
      "check_out_date": "YYYY-MM-DD",
      "booking_link": "absolute URL where the hotel can be booked"
    }}
  ]
}}
Use an empty "hotels" list when the search returned null.

All text must be in **{language}**, and all prices in **{currency}**.
Return a single valid JSON response (no markdown or explanation)."#,
            language = self.language,
            currency = self.currency,
        )
    }

    /// Run the agent and validate its answer
    pub async fn run(&self, prompt: &str) -> Result<HotelSearchResult, EvBotError> {
        info!(agent = HOTEL_AGENT_NAME, prompt, "running hotel agent");

        let answer = agent_loop(
            HOTEL_AGENT_NAME,
            &self.system_prompt(),
            vec![Message::user(prompt)],
            self.provider.as_ref(),
            &self.tools,
            MAX_ITERATIONS,
        )
        .await
        .map_err(|e| agent_error(HOTEL_AGENT_NAME, e))?;

        let result = parse_structured::<HotelSearchResult>(&answer)
            .and_then(|result| result.validate(HOTEL_RESULT_LIMIT))
            .inspect_err(|e| {
                error!(agent = HOTEL_AGENT_NAME, error = %e, raw = %answer, "hotel agent answer rejected");
            })?;

        info!(
            agent = HOTEL_AGENT_NAME,
            city_code = %result.city_code,
            hotels = result.hotels.len(),
            "parsed hotel offers"
        );
        Ok(result)
    }
}

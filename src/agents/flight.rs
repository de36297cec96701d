use std::sync::Arc;

use tracing::{error, info};

use super::runner::agent_loop;
use super::{FlightAgentOutput, agent_error};
use crate::amadeus::{DateWindow, TravelData};
use crate::config::Settings;
use crate::error::EvBotError;
use crate::images::ImageLookup;
use crate::llm::{LlmProvider, Message, parse_structured};
use crate::tools::{DestinationImageTool, ErrorPolicy, FlightInspirationTool, ToolRegistry};

pub const FLIGHT_AGENT_NAME: &str = "flight";
const MAX_ITERATIONS: usize = 10;

/// Turns flight inspiration results into a batch of distinct travel ideas
pub struct FlightAgent {
    provider: Arc<dyn LlmProvider>,
    tools: ToolRegistry,
    language: String,
    currency: String,
}

impl FlightAgent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        data: Arc<dyn TravelData>,
        images: Arc<dyn ImageLookup>,
        settings: &Settings,
        window: DateWindow,
    ) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(
            FlightInspirationTool::new(
                data,
                settings.origin.clone(),
                window,
                settings.sample_data_path.clone(),
            ),
            ErrorPolicy::Propagate,
        );
        tools.register(DestinationImageTool::new(images), ErrorPolicy::Trap);

        Self {
            provider,
            tools,
            language: settings.language.clone(),
            currency: settings.currency.clone(),
        }
    }

    pub fn system_prompt(&self) -> String {
        format!(
            r#"You are a helpful AI travel assistant.

Your task is to suggest three compelling travel ideas based on available flights from the user's location.
Prioritize destinations that are cheap, interesting, or unique.
Each idea must highlight a distinct destination. Never suggest two ideas for the same city or for nearby, similar places;
the destinations should clearly differ in geography, culture or travel experience.

Tools:
- `search_flight_inspiration`: returns flight data (price, route, dates, links).
  Ignore destinations with invalid or unknown IATA codes (test codes, train stations and the like).
  Use only real airport or city codes that map to known city names, and decode both origin and destination codes to city names.
- `get_destination_image`: returns a representative image URL for a city, or null.

For each idea:
- Look up a destination image with `get_destination_image` and put it in `image_url` (omit the field when the tool returns null).
- Write a catchy title, a travel motivation and a short destination description.

Answer with a single JSON object of this shape:
{{
  "ideas": [
    {{
      "header": "catchy title",
      "motivation": "reason to go",
      "destination_description": "short description of the destination",
      "travel_summary": {{
        "flight_number": "flight number if known, otherwise omit",
        "flight_price": "price as shown by the flight search",
        "flight_currency": "currency code of that price as reported by the flight search",
        "starting_point": "origin city name",
        "starting_point_code": "origin IATA code",
        "destination": "destination city name",
        "destination_code": "destination IATA code",
        "travel_dates": "human readable travel dates",
        "travel_start_date": "YYYY-MM-DD",
        "travel_end_date": "YYYY-MM-DD",
        "booking_link": "absolute URL where the flight can be booked"
      }},
      "image_url": "https://..."
    }}
  ]
}}

Respond with valid JSON only. No markdown and no commentary.

All text must be in **{language}**.
Quote flight prices exactly as the flight search reports them and never convert them.
Each price carries its currency code; when one is missing, the currency is **{currency}**."#,
            language = self.language,
            currency = self.currency,
        )
    }

    /// Run the agent and validate its answer
    pub async fn run(&self, prompt: &str) -> Result<FlightAgentOutput, EvBotError> {
        info!(agent = FLIGHT_AGENT_NAME, prompt, "running flight agent");

        let answer = agent_loop(
            FLIGHT_AGENT_NAME,
            &self.system_prompt(),
            vec![Message::user(prompt)],
            self.provider.as_ref(),
            &self.tools,
            MAX_ITERATIONS,
        )
        .await
        .map_err(|e| agent_error(FLIGHT_AGENT_NAME, e))?;

        let output = parse_structured::<FlightAgentOutput>(&answer)
            .and_then(FlightAgentOutput::validate)
            .inspect_err(|e| {
                error!(agent = FLIGHT_AGENT_NAME, error = %e, raw = %answer, "flight agent answer rejected");
            })?;

        info!(
            agent = FLIGHT_AGENT_NAME,
            ideas = output.ideas.len(),
            "parsed travel ideas"
        );
        Ok(output)
    }
}

use std::fmt;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::agents::{CombinedSuggestion, FlightAgent, HotelAgent, HotelSummary, TravelIdea};
use crate::error::EvBotError;

/// User prompt for the flight stage
pub const FLIGHT_PROMPT: &str = "find best travel ideas";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Flight,
    Hotel,
    Merge,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flight => write!(f, "flight"),
            Self::Hotel => write!(f, "hotel"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

fn enter(stage: Stage) {
    info!(stage = %stage, "=== STAGE: {} ===", stage.to_string().to_uppercase());
}

/// Hotels found for one destination; empty when the lookup failed
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationHotels {
    pub destination_code: String,
    pub hotels: Vec<HotelSummary>,
}

/// Runs the flight stage, one hotel search per idea, then merges the two.
///
/// Stages run strictly in sequence and hotel searches follow the order of the ideas.
/// A failed hotel search only empties that idea's hotel list.
pub struct Orchestrator {
    flight: FlightAgent,
    hotel: HotelAgent,
}

impl Orchestrator {
    pub fn new(flight: FlightAgent, hotel: HotelAgent) -> Self {
        Self { flight, hotel }
    }

    pub async fn run(&self) -> Result<Vec<CombinedSuggestion>, EvBotError> {
        info!("starting travel agent orchestration");

        enter(Stage::Flight);
        let ideas = self.flight.run(FLIGHT_PROMPT).await?.ideas;
        info!(ideas = ideas.len(), "flight agent returned ideas");

        enter(Stage::Hotel);
        let hotel_results = self.hotel_stage(&ideas).await;

        enter(Stage::Merge);
        let merged = merge_suggestions(ideas, &hotel_results);
        info!(
            suggestions = merged.len(),
            "merged travel suggestions with hotel data"
        );

        Ok(merged)
    }

    async fn hotel_stage(&self, ideas: &[TravelIdea]) -> Vec<DestinationHotels> {
        let mut results = Vec::with_capacity(ideas.len());

        for idea in ideas {
            let summary = &idea.travel_summary;
            let code = summary.destination_code.as_str();
            let (check_in, check_out) = (summary.travel_start_date, summary.travel_end_date);
            info!(destination = code, %check_in, %check_out, "querying hotels");

            let hotels = match self.hotel.run(&hotel_prompt(code, check_in, check_out)).await {
                Ok(result) => {
                    let hotels = matching_stay(result.hotels, check_in, check_out);
                    if hotels.is_empty() {
                        warn!(destination = code, %check_in, %check_out, "no hotels found");
                    }
                    hotels
                }
                Err(e) => {
                    error!(destination = code, error = %e, "hotel agent failed");
                    Vec::new()
                }
            };

            results.push(DestinationHotels {
                destination_code: code.to_string(),
                hotels,
            });
        }

        results
    }
}

/// Per-destination prompt for the hotel agent
pub fn hotel_prompt(city_code: &str, check_in: NaiveDate, check_out: NaiveDate) -> String {
    format!(
        "Find 3 good hotels in {} from {} to {}",
        city_code,
        check_in.format("%Y-%m-%d"),
        check_out.format("%Y-%m-%d")
    )
}

/// Hotels must cover exactly the idea's travel dates.
fn matching_stay(
    hotels: Vec<HotelSummary>,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Vec<HotelSummary> {
    hotels
        .into_iter()
        .filter(|hotel| {
            let matches = hotel.check_in_date == check_in && hotel.check_out_date == check_out;
            if !matches {
                warn!(
                    hotel = %hotel.hotel_name,
                    check_in = %hotel.check_in_date,
                    check_out = %hotel.check_out_date,
                    "dropping hotel with mismatched stay dates"
                );
            }
            matches
        })
        .collect()
}

/// Pair every idea with the first hotel result for its destination code.
///
/// Output order and length always equal those of `ideas`.
pub fn merge_suggestions(
    ideas: Vec<TravelIdea>,
    hotel_results: &[DestinationHotels],
) -> Vec<CombinedSuggestion> {
    ideas
        .into_iter()
        .map(|idea| {
            let hotels = hotel_results
                .iter()
                .find(|r| r.destination_code == idea.travel_summary.destination_code)
                .map(|r| r.hotels.clone())
                .unwrap_or_default();
            CombinedSuggestion { idea, hotels }
        })
        .collect()
}

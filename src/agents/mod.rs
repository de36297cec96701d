mod flight;
mod hotel;
pub(crate) mod runner;
mod schema;

pub use flight::{FLIGHT_AGENT_NAME, FlightAgent};
pub use hotel::{HOTEL_AGENT_NAME, HotelAgent};
pub use schema::{
    CombinedSuggestion, FlightAgentOutput, HotelSearchResult, HotelSummary, OutputError,
    TravelIdea, TravelSummary,
};

use crate::error::EvBotError;

fn agent_error(agent_name: &str, err: anyhow::Error) -> EvBotError {
    EvBotError::Agent {
        agent_name: agent_name.to_string(),
        message: format!("{:#}", err),
    }
}

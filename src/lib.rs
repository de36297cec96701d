pub mod agents;
pub mod amadeus;
pub mod config;
pub mod error;
pub mod images;
pub mod llm;
pub mod pipeline;
pub mod retry;
pub mod runner;
pub mod telegram;
pub mod tools;

pub use agents::{CombinedSuggestion, FlightAgent, HotelAgent, TravelIdea};
pub use amadeus::{AmadeusClient, DateWindow, TravelData};
pub use config::{Settings, SettingsOverrides};
pub use error::EvBotError;
pub use images::{ImageLookup, WikipediaImages};
pub use llm::{LlmProvider, LlmResponse, Message, ToolCall};
pub use pipeline::Orchestrator;
pub use runner::{ChannelOutcome, RunSummary, run_channels, run_once, run_with};
pub use telegram::{ChatSender, DeliveryReport, TelegramBot};
pub use tools::{Tool, ToolRegistry};

use crate::agents::OutputError;
use crate::amadeus::ProviderError;
use crate::config::ConfigError;
use crate::telegram::DeliveryError;

#[derive(Debug, thiserror::Error)]
pub enum EvBotError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("agent error: {agent_name}: {message}")]
    Agent { agent_name: String, message: String },

    #[error("invalid agent output: {0}")]
    Output(#[from] OutputError),

    #[error("delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

mod deliver;
mod format;
mod sender;
mod translations;

pub use deliver::{DeliveryReport, MAX_CAPTION_CHARS, deliver};
pub use format::{OutgoingMessage, escape_html, format_suggestions, is_direct_image_url, render_caption};
pub use sender::{ChatSender, TelegramBot};
pub use translations::Translations;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("telegram request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("telegram rejected {method}: {description}")]
    Rejected {
        method: &'static str,
        description: String,
    },

    #[error("none of the {attempted} messages could be delivered")]
    NothingDelivered { attempted: usize },
}

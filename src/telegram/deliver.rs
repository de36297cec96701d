use tracing::{debug, error, info, warn};

use super::{ChatSender, DeliveryError, OutgoingMessage, is_direct_image_url};

/// Telegram refuses photo captions longer than this many characters
pub const MAX_CAPTION_CHARS: usize = 1024;

/// Outcome of delivering a batch of messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

impl DeliveryReport {
    /// A non-empty batch where nothing got through
    pub fn nothing_delivered(&self) -> bool {
        self.delivered == 0 && self.failed > 0
    }
}

/// Deliver messages in order, one chat message per suggestion.
///
/// A message goes out as photo + caption when it has a direct image link and the caption fits,
/// otherwise (or when the photo is refused) as text. A message that cannot be sent at all is
/// logged and skipped.
pub async fn deliver(sender: &dyn ChatSender, messages: &[OutgoingMessage]) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    info!(count = messages.len(), "sending messages to Telegram");

    for (i, message) in messages.iter().enumerate() {
        match deliver_one(sender, message).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                error!(message = i + 1, error = %e, "failed to deliver message, skipping");
                report.failed += 1;
            }
        }
    }

    info!(
        delivered = report.delivered,
        failed = report.failed,
        "delivery finished"
    );
    report
}

async fn deliver_one(sender: &dyn ChatSender, message: &OutgoingMessage) -> Result<(), DeliveryError> {
    if let Some(url) = photo_url(message) {
        match sender.send_photo(url, &message.caption).await {
            Ok(()) => {
                info!("sent photo + caption");
                return Ok(());
            }
            Err(DeliveryError::Rejected { description, .. })
                if description.contains("wrong type of the web page content") =>
            {
                warn!(url, "Telegram rejected image URL content, falling back to text");
            }
            Err(e) => {
                warn!(url, error = %e, "photo delivery failed, falling back to text");
            }
        }
    }

    sender.send_message(&message.caption).await?;
    info!("sent text message");
    Ok(())
}

fn photo_url(message: &OutgoingMessage) -> Option<&str> {
    let Some(url) = message.image_url.as_deref() else {
        debug!("no image URL for message");
        return None;
    };
    if !is_direct_image_url(url) {
        info!(url, "image URL is not a direct image, sending text");
        return None;
    }
    if message.caption.chars().count() > MAX_CAPTION_CHARS {
        info!(
            chars = message.caption.chars().count(),
            "caption too long for a photo, sending text"
        );
        return None;
    }
    Some(url)
}

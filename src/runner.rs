use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use futures::future::join_all;
use tokio::time::Duration;
use tracing::{error, info, warn};

use crate::agents::{FlightAgent, HotelAgent};
use crate::amadeus::{AmadeusClient, DateWindow, TravelData};
use crate::config::{Settings, SettingsOverrides};
use crate::error::EvBotError;
use crate::images::{ImageLookup, WikipediaImages};
use crate::llm::{LlmProvider, create_provider};
use crate::pipeline::Orchestrator;
use crate::telegram::{
    ChatSender, DeliveryError, DeliveryReport, TelegramBot, deliver, format_suggestions,
};

/// Run the whole bot once for one channel against the live services.
pub async fn run_once(settings: &Settings) -> Result<DeliveryReport, EvBotError> {
    info!(
        origin = %settings.origin,
        language = %settings.language,
        currency = %settings.currency,
        channel = %settings.telegram.channel_id,
        provider = %settings.llm.backend,
        "starting travel bot run"
    );

    let data: Arc<dyn TravelData> = Arc::new(AmadeusClient::connect(settings).await?);
    let images: Arc<dyn ImageLookup> = Arc::new(WikipediaImages::new(settings.image_thumb_size));
    let provider = create_provider(&settings.llm);
    let sender = TelegramBot::new(&settings.telegram)?;
    let today = chrono::Local::now().date_naive();

    run_with(settings, provider, data, images, &sender, today).await
}

/// Pipeline, formatting and delivery over injected services.
pub async fn run_with(
    settings: &Settings,
    provider: Arc<dyn LlmProvider>,
    data: Arc<dyn TravelData>,
    images: Arc<dyn ImageLookup>,
    sender: &dyn ChatSender,
    today: NaiveDate,
) -> Result<DeliveryReport, EvBotError> {
    let window = DateWindow::next_week(today);
    let flight = FlightAgent::new(provider.clone(), data.clone(), images, settings, window);
    let hotel = HotelAgent::new(provider, data, settings);

    let suggestions = Orchestrator::new(flight, hotel).run().await?;
    if suggestions.is_empty() {
        warn!("no travel ideas to send");
        return Ok(DeliveryReport::default());
    }

    let messages = format_suggestions(&suggestions, &settings.language, &settings.currency);
    let report = deliver(sender, &messages).await;
    if report.nothing_delivered() {
        return Err(DeliveryError::NothingDelivered {
            attempted: messages.len(),
        }
        .into());
    }

    info!(delivered = report.delivered, "travel ideas sent");
    Ok(report)
}

/// Result of running one channel
#[derive(Debug)]
pub struct ChannelOutcome {
    pub channel: String,
    pub result: Result<DeliveryReport, EvBotError>,
}

impl ChannelOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Totals over a multi-channel run
#[derive(Debug)]
pub struct RunSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub elapsed: Duration,
    pub outcomes: Vec<ChannelOutcome>,
}

impl RunSummary {
    fn from_outcomes(outcomes: Vec<ChannelOutcome>, elapsed: Duration) -> Self {
        let successful = outcomes.iter().filter(|o| o.succeeded()).count();
        Self {
            total: outcomes.len(),
            successful,
            failed: outcomes.len() - successful,
            elapsed,
            outcomes,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Run every channel, each layered over `base`.
///
/// Channels run one after another, or as separate tokio tasks when `parallel` is set. A channel
/// whose settings do not build, or whose run fails, is recorded and does not affect the others.
pub async fn run_channels<F, Fut>(
    base: &SettingsOverrides,
    channels: Vec<SettingsOverrides>,
    parallel: bool,
    runner: F,
) -> RunSummary
where
    F: Fn(Settings) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<DeliveryReport, EvBotError>> + Send + 'static,
{
    let started = Instant::now();
    info!(channels = channels.len(), parallel, "starting multi-channel run");

    let prepared: Vec<(String, Result<Settings, EvBotError>)> = channels
        .into_iter()
        .enumerate()
        .map(|(i, channel)| {
            let label = channel
                .telegram_channel_id
                .clone()
                .unwrap_or_else(|| format!("channel {}", i + 1));
            let settings = base.clone().merge(channel).build().map_err(EvBotError::from);
            (label, settings)
        })
        .collect();

    let outcomes = if parallel {
        let tasks = prepared.into_iter().map(|(channel, settings)| {
            let runner = runner.clone();
            let label = channel.clone();
            let handle = tokio::spawn(run_channel(channel, settings, runner));
            async move {
                handle.await.unwrap_or_else(|e| ChannelOutcome {
                    channel: label,
                    result: Err(EvBotError::Internal(anyhow::anyhow!("channel task failed: {e}"))),
                })
            }
        });
        join_all(tasks).await
    } else {
        let mut outcomes = Vec::new();
        for (channel, settings) in prepared {
            outcomes.push(run_channel(channel, settings, runner.clone()).await);
        }
        outcomes
    };

    let summary = RunSummary::from_outcomes(outcomes, started.elapsed());
    info!(
        total = summary.total,
        successful = summary.successful,
        failed = summary.failed,
        elapsed_secs = summary.elapsed.as_secs_f64(),
        "multi-channel run finished"
    );
    summary
}

async fn run_channel<F, Fut>(
    channel: String,
    settings: Result<Settings, EvBotError>,
    runner: F,
) -> ChannelOutcome
where
    F: Fn(Settings) -> Fut,
    Fut: Future<Output = Result<DeliveryReport, EvBotError>>,
{
    info!("=== CHANNEL: {channel} ===");
    let result = match settings {
        Ok(settings) => runner(settings).await,
        Err(e) => Err(e),
    };
    match &result {
        Ok(report) => info!(%channel, delivered = report.delivered, "channel completed"),
        Err(e) => error!(%channel, error = %e, "channel failed"),
    }
    ChannelOutcome { channel, result }
}

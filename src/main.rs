use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ev_bot::config::{ChannelSource, SettingsOverrides, load_channels};
use ev_bot::{RunSummary, Settings, run_channels, run_once};

#[derive(Parser)]
#[command(name = "ev-bot")]
#[command(version, about = "Posts AI-curated travel ideas with hotel options to Telegram", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with default settings (overridden by environment and flags)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate travel ideas and post them to one channel
    Send(SendArgs),

    /// Run the bot for several channels
    #[command(group(
        ArgGroup::new("source")
            .required(true)
            .args(["config", "from_env", "channels"])
    ))]
    Multi {
        /// JSON file with channel configurations
        #[arg(long)]
        config: Option<PathBuf>,

        /// Read channel configurations from the CHANNELS_CONFIG environment variable
        #[arg(long)]
        from_env: bool,

        /// Channel configurations as inline JSON
        #[arg(long)]
        channels: Option<String>,

        /// Run channels concurrently
        #[arg(long)]
        parallel: bool,
    },
}

#[derive(Args)]
struct SendArgs {
    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    bot_token: Option<String>,

    /// Telegram channel id (@name or numeric id)
    #[arg(long, env = "TELEGRAM_CHANNEL_ID")]
    channel_id: Option<String>,

    /// IATA code of the departure airport or city
    #[arg(long, env = "ORIGIN")]
    origin: Option<String>,

    /// Language of the generated posts
    #[arg(long, env = "LANGUAGE")]
    language: Option<String>,

    /// Currency for prices
    #[arg(long, env = "CURRENCY")]
    currency: Option<String>,

    /// Amadeus API client id
    #[arg(long, env = "AMADEUS_CLIENT_ID", hide_env_values = true)]
    amadeus_client_id: Option<String>,

    /// Amadeus API client secret
    #[arg(long, env = "AMADEUS_CLIENT_SECRET", hide_env_values = true)]
    amadeus_client_secret: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_key: Option<String>,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    anthropic_key: Option<String>,

    /// LLM provider to use (openai, anthropic)
    #[arg(long, env = "LLM_PROVIDER")]
    provider: Option<String>,

    /// Model to use (provider-specific)
    #[arg(long, env = "LLM_MODEL")]
    model: Option<String>,
}

impl SendArgs {
    fn into_overrides(self) -> SettingsOverrides {
        SettingsOverrides {
            telegram_bot_token: self.bot_token,
            telegram_channel_id: self.channel_id,
            origin: self.origin,
            language: self.language,
            currency: self.currency,
            amadeus_client_id: self.amadeus_client_id,
            amadeus_client_secret: self.amadeus_client_secret,
            openai_key: self.openai_key,
            anthropic_key: self.anthropic_key,
            llm_provider: self.provider,
            llm_model: self.model,
            ..Default::default()
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive("info".parse().expect("valid log directive"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Settings file layer under the environment layer
fn base_overrides(settings_file: Option<&PathBuf>) -> Result<SettingsOverrides> {
    let file = match settings_file {
        Some(path) => SettingsOverrides::from_toml_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => SettingsOverrides::default(),
    };
    let env = SettingsOverrides::from_env().context("invalid environment configuration")?;
    Ok(file.merge(env))
}

fn print_summary(summary: &RunSummary) {
    let rule = "=".repeat(60);
    println!("\n{rule}\nSUMMARY\n{rule}");
    for outcome in &summary.outcomes {
        match &outcome.result {
            Ok(report) => println!("✓ {} ({} sent)", outcome.channel, report.delivered),
            Err(e) => println!("✗ {}: {}", outcome.channel, e),
        }
    }
    println!("Total channels: {}", summary.total);
    println!("Successful: {}", summary.successful);
    println!("Failed: {}", summary.failed);
    println!("Time elapsed: {:.2} seconds", summary.elapsed.as_secs_f64());
    println!("{rule}");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let base = base_overrides(cli.settings.as_ref())?;

    match cli.command {
        Commands::Send(args) => {
            let settings = base
                .merge(args.into_overrides())
                .build()
                .context("invalid configuration")?;

            match run_once(&settings).await {
                Ok(report) => {
                    println!(
                        "Sent {} travel ideas to {}",
                        report.delivered, settings.telegram.channel_id
                    );
                }
                Err(e) => {
                    error!(error = %e, "run failed");
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Multi {
            config,
            from_env,
            channels,
            parallel,
        } => {
            let source = match (config, channels) {
                (Some(path), None) if !from_env => ChannelSource::File(path),
                (None, Some(json)) if !from_env => ChannelSource::Inline(json),
                (None, None) if from_env => ChannelSource::Env,
                _ => anyhow::bail!("exactly one of --config, --from-env or --channels is required"),
            };
            let channels =
                load_channels(&source).context("failed to load channel configuration")?;
            info!(channels = channels.len(), parallel, "loaded channel configurations");

            let summary = run_channels(&base, channels, parallel, |settings: Settings| async move {
                run_once(&settings).await
            })
            .await;

            print_summary(&summary);
            if !summary.all_succeeded() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

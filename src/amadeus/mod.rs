mod client;
mod sample;
mod types;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

pub use client::AmadeusClient;
pub use sample::{inspiration_or_sample, load_sample};
pub use types::{
    DestinationLinks, FlightDestination, HotelListing, HotelOffer, HotelOfferSummary, OfferHotel,
    Price, RoomOffer, summarize_offers,
};

/// Errors raised by the flight/hotel data provider
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode provider response: {0}")]
    Decode(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("sample data unavailable at {}: {reason}", path.display())]
    Sample { path: PathBuf, reason: String },
}

impl ProviderError {
    /// Whether retrying the same request may succeed.
    ///
    /// Connection problems, timeouts, rate limiting and 5xx responses are transient.
    /// Client errors such as an unknown city code are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Decode(_) | Self::Auth(_) | Self::Sample { .. } => false,
        }
    }
}

/// Departure date and trip length for an inspiration search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub departure: NaiveDate,
    pub duration_days: u32,
}

impl DateWindow {
    /// A week-long round trip departing seven days after `today`
    pub fn next_week(today: NaiveDate) -> Self {
        Self {
            departure: today + Duration::days(7),
            duration_days: 7,
        }
    }

    pub fn return_date(&self) -> NaiveDate {
        self.departure + Duration::days(i64::from(self.duration_days))
    }
}

/// Typed search operations against the flight/hotel data provider
#[async_trait]
pub trait TravelData: Send + Sync {
    /// Candidate destinations with indicative prices departing from `origin`
    async fn search_flight_inspiration(
        &self,
        origin: &str,
        window: &DateWindow,
    ) -> Result<Vec<FlightDestination>, ProviderError>;

    /// Priced offers for a stay in `city_code`.
    ///
    /// Returns `Ok(None)` when the provider has no offers for otherwise valid input.
    async fn search_hotels_by_city(
        &self,
        city_code: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Option<Vec<HotelOffer>>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_week_window() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 28).unwrap();
        let window = DateWindow::next_week(today);

        assert_eq!(window.departure, NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
        assert_eq!(window.return_date(), NaiveDate::from_ymd_opt(2024, 6, 11).unwrap());
    }

    #[test]
    fn client_errors_are_not_transient() {
        let bad_city = ProviderError::Status {
            status: 400,
            body: "INVALID FORMAT".to_string(),
        };
        assert!(!bad_city.is_transient());

        let overloaded = ProviderError::Status {
            status: 503,
            body: String::new(),
        };
        assert!(overloaded.is_transient());

        let throttled = ProviderError::Status {
            status: 429,
            body: String::new(),
        };
        assert!(throttled.is_transient());

        assert!(!ProviderError::Decode("eof".to_string()).is_transient());
    }
}

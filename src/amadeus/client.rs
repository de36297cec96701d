use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::time::Duration;
use tracing::{debug, info};

use super::types::{DataEnvelope, FlightDestination, HotelListing, HotelOffer};
use super::{DateWindow, ProviderError, TravelData};
use crate::config::{AmadeusSettings, Settings};
use crate::retry::{RetryConfig, retry_with_backoff};

const TOKEN_PATH: &str = "/v1/security/oauth2/token";
const INSPIRATION_PATH: &str = "/v1/shopping/flight-destinations";
const HOTELS_BY_CITY_PATH: &str = "/v1/reference-data/locations/hotels/by-city";
const HOTEL_OFFERS_PATH: &str = "/v3/shopping/hotel-offers";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

/// Authenticated client for the Amadeus self-service APIs
pub struct AmadeusClient {
    http: Client,
    base_url: String,
    token: SecretString,
    currency: String,
    hotel_candidate_limit: usize,
    retry: RetryConfig,
}

impl AmadeusClient {
    /// Authenticate with the client-credentials flow and return a ready client.
    pub async fn connect(settings: &Settings) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let token = Self::authenticate(&http, &settings.amadeus, &settings.retry).await?;
        info!(base_url = %settings.amadeus.base_url, "authenticated with Amadeus");

        Ok(Self {
            http,
            base_url: settings.amadeus.base_url.clone(),
            token,
            currency: settings.currency.clone(),
            hotel_candidate_limit: settings.hotel_candidate_limit,
            retry: settings.retry.clone(),
        })
    }

    /// Exchange client credentials for a bearer token
    pub async fn authenticate(
        http: &Client,
        amadeus: &AmadeusSettings,
        retry: &RetryConfig,
    ) -> Result<SecretString, ProviderError> {
        let url = format!("{}{}", amadeus.base_url, TOKEN_PATH);
        let url = url.as_str();

        let token = retry_with_backoff(retry, "amadeus.authenticate", ProviderError::is_transient, || async move {
            let form = [
                ("grant_type", "client_credentials"),
                ("client_id", amadeus.client_id.expose_secret()),
                ("client_secret", amadeus.client_secret.expose_secret()),
            ];
            let response = http.post(url).form(&form).send().await?;
            let status = response.status();
            if status.is_client_error() && status.as_u16() != 429 {
                let body = response.text().await.unwrap_or_default();
                return Err(ProviderError::Auth(format!("HTTP {}: {}", status.as_u16(), body)));
            }
            let parsed: TokenResponse = decode(response).await?;
            Ok(parsed.access_token)
        })
        .await?;

        if token.is_empty() {
            return Err(ProviderError::Auth("token response had no access_token".to_string()));
        }
        Ok(SecretString::from(token))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let url = url.as_str();

        retry_with_backoff(&self.retry, operation, ProviderError::is_transient, || async move {
            let response = self
                .http
                .get(url)
                .bearer_auth(self.token.expose_secret())
                .query(query)
                .send()
                .await?;
            decode(response).await
        })
        .await
    }

    async fn hotel_ids_in_city(&self, city_code: &str) -> Result<Vec<String>, ProviderError> {
        let query = [
            ("cityCode", city_code.to_string()),
            ("radius", "5".to_string()),
            ("radiusUnit", "KM".to_string()),
            ("ratings", "2,3,4".to_string()),
            ("hotelSource", "ALL".to_string()),
        ];
        let listings: DataEnvelope<HotelListing> = self
            .get_json("amadeus.hotels_by_city", HOTELS_BY_CITY_PATH, &query)
            .await?;

        Ok(listings
            .data
            .into_iter()
            .map(|listing| listing.hotel_id)
            .take(self.hotel_candidate_limit)
            .collect())
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
}

#[async_trait]
impl TravelData for AmadeusClient {
    async fn search_flight_inspiration(
        &self,
        origin: &str,
        window: &DateWindow,
    ) -> Result<Vec<FlightDestination>, ProviderError> {
        let query = [
            ("origin", origin.to_string()),
            ("departureDate", window.departure.format("%Y-%m-%d").to_string()),
            ("oneWay", "false".to_string()),
            ("duration", window.duration_days.to_string()),
            ("nonStop", "true".to_string()),
        ];
        let envelope: DataEnvelope<FlightDestination> = self
            .get_json("amadeus.flight_inspiration", INSPIRATION_PATH, &query)
            .await?;

        debug!(origin, count = envelope.data.len(), "inspiration search returned");
        Ok(envelope.into_priced())
    }

    async fn search_hotels_by_city(
        &self,
        city_code: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Option<Vec<HotelOffer>>, ProviderError> {
        let hotel_ids = self.hotel_ids_in_city(city_code).await?;
        if hotel_ids.is_empty() {
            debug!(city_code, "no hotels listed for city");
            return Ok(None);
        }

        let query = [
            ("hotelIds", hotel_ids.join(",")),
            ("checkInDate", check_in.format("%Y-%m-%d").to_string()),
            ("checkOutDate", check_out.format("%Y-%m-%d").to_string()),
            ("adults", "2".to_string()),
            ("currency", self.currency.clone()),
            ("paymentPolicy", "NONE".to_string()),
            ("includeClosed", "false".to_string()),
            ("bestRateOnly", "true".to_string()),
        ];
        let envelope: DataEnvelope<HotelOffer> = self
            .get_json("amadeus.hotel_offers", HOTEL_OFFERS_PATH, &query)
            .await?;

        debug!(city_code, count = envelope.data.len(), "hotel offers returned");
        if envelope.data.is_empty() {
            Ok(None)
        } else {
            Ok(Some(envelope.data))
        }
    }
}

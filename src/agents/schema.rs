//! Structured answers the agents must produce, and their validation.

use chrono::NaiveDate;
use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// The model's final answer did not match the expected shape
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("answer is not valid JSON for the expected schema ({reason}): {excerpt}")]
    InvalidJson { reason: String, excerpt: String },

    #[error("invalid {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl OutputError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelSummary {
    #[serde(default, deserialize_with = "optional_display_string")]
    pub flight_number: Option<String>,
    /// Provider-formatted price, kept verbatim
    #[serde(deserialize_with = "display_string")]
    pub flight_price: String,
    /// Currency the flight search quoted `flight_price` in
    #[serde(default, deserialize_with = "optional_display_string")]
    pub flight_currency: Option<String>,
    pub starting_point: String,
    pub starting_point_code: String,
    pub destination: String,
    /// Join key for hotel results
    pub destination_code: String,
    pub travel_dates: String,
    #[serde(deserialize_with = "calendar_date")]
    pub travel_start_date: NaiveDate,
    #[serde(deserialize_with = "calendar_date")]
    pub travel_end_date: NaiveDate,
    pub booking_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelIdea {
    pub header: String,
    pub motivation: String,
    pub destination_description: String,
    pub travel_summary: TravelSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightAgentOutput {
    pub ideas: Vec<TravelIdea>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelSummary {
    pub hotel_name: String,
    pub address: String,
    #[serde(default, deserialize_with = "optional_display_string")]
    pub rating: Option<String>,
    #[serde(deserialize_with = "display_string")]
    pub total_price: String,
    #[serde(deserialize_with = "calendar_date")]
    pub check_in_date: NaiveDate,
    #[serde(deserialize_with = "calendar_date")]
    pub check_out_date: NaiveDate,
    pub booking_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelSearchResult {
    pub city_name: String,
    pub city_code: String,
    #[serde(default)]
    pub hotels: Vec<HotelSummary>,
}

/// One travel idea paired with the hotels found for its destination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedSuggestion {
    pub idea: TravelIdea,
    pub hotels: Vec<HotelSummary>,
}

impl FlightAgentOutput {
    /// Normalise codes and links, rejecting ideas that cannot be joined or booked.
    pub fn validate(mut self) -> Result<Self, OutputError> {
        for (i, idea) in self.ideas.iter_mut().enumerate() {
            let summary = &mut idea.travel_summary;

            summary.destination_code = summary.destination_code.trim().to_uppercase();
            if summary.destination_code.is_empty() {
                return Err(OutputError::invalid(
                    format!("ideas[{}].travel_summary.destination_code", i),
                    "must not be empty",
                ));
            }
            summary.starting_point_code = summary.starting_point_code.trim().to_uppercase();
            summary.flight_number = summary
                .flight_number
                .take()
                .filter(|n| !n.trim().is_empty());

            check_link(
                &summary.booking_link,
                &format!("ideas[{}].travel_summary.booking_link", i),
            )?;

            idea.image_url = idea.image_url.take().filter(|url| {
                let usable = absolute_http_url(url);
                if !usable && !url.trim().is_empty() {
                    warn!(url = %url, "dropping unusable image URL");
                }
                usable
            });
        }
        Ok(self)
    }
}

impl HotelSearchResult {
    /// Normalise the city code and keep at most `limit` hotels.
    pub fn validate(mut self, limit: usize) -> Result<Self, OutputError> {
        self.city_code = self.city_code.trim().to_uppercase();
        for (i, hotel) in self.hotels.iter().enumerate() {
            check_link(&hotel.booking_link, &format!("hotels[{}].booking_link", i))?;
        }
        self.hotels.truncate(limit);
        Ok(self)
    }
}

fn absolute_http_url(raw: &str) -> bool {
    Url::parse(raw.trim())
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

fn check_link(raw: &str, field: &str) -> Result<(), OutputError> {
    if absolute_http_url(raw) {
        Ok(())
    } else {
        Err(OutputError::invalid(
            field,
            format!("'{}' is not an absolute http(s) URL", raw),
        ))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Int(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
        }
    }
}

/// Models sometimes emit prices and ratings as numbers.
fn display_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Scalar::deserialize(deserializer).map(Scalar::into_string)
}

fn optional_display_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}

/// Accepts `2024-06-01` as well as datetime forms such as `2024-06-01T00:00:00Z`.
fn calendar_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let date_part = raw.get(..10).unwrap_or(raw.as_str());
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| serde::de::Error::custom(format!("invalid date '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn idea_json() -> serde_json::Value {
        json!({
            "header": "Weekend in Lisbon",
            "motivation": "Sunshine and pastéis de nata",
            "destination_description": "Hilly capital on the Tagus",
            "travel_summary": {
                "flight_price": 84.53,
                "starting_point": "Madrid",
                "starting_point_code": "mad",
                "destination": "Lisbon",
                "destination_code": " lis ",
                "travel_dates": "June 1 - June 8",
                "travel_start_date": "2024-06-01T00:00:00",
                "travel_end_date": "2024-06-08",
                "booking_link": "https://www.google.com/flights?q=MAD-LIS"
            },
            "image_url": ""
        })
    }

    #[test]
    fn lenient_fields_are_normalised() {
        let output: FlightAgentOutput =
            serde_json::from_value(json!({"ideas": [idea_json()]})).unwrap();
        let output = output.validate().unwrap();
        let summary = &output.ideas[0].travel_summary;

        assert_eq!(summary.flight_price, "84.53");
        assert_eq!(summary.destination_code, "LIS");
        assert_eq!(summary.starting_point_code, "MAD");
        assert_eq!(summary.travel_start_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(summary.flight_number, None);
        assert_eq!(summary.flight_currency, None);
        assert_eq!(output.ideas[0].image_url, None);
    }

    #[test]
    fn quoted_flight_currency_is_kept() {
        let mut idea = idea_json();
        idea["travel_summary"]["flight_currency"] = json!("USD");
        let output: FlightAgentOutput = serde_json::from_value(json!({"ideas": [idea]})).unwrap();
        let output = output.validate().unwrap();

        assert_eq!(output.ideas[0].travel_summary.flight_currency.as_deref(), Some("USD"));
    }

    #[test]
    fn empty_destination_code_is_rejected() {
        let mut idea = idea_json();
        idea["travel_summary"]["destination_code"] = json!("  ");
        let output: FlightAgentOutput = serde_json::from_value(json!({"ideas": [idea]})).unwrap();

        let err = output.validate().unwrap_err();
        assert!(err.to_string().contains("destination_code"));
    }

    #[test]
    fn relative_booking_link_is_rejected() {
        let mut idea = idea_json();
        idea["travel_summary"]["booking_link"] = json!("/flights/MAD-LIS");
        let output: FlightAgentOutput = serde_json::from_value(json!({"ideas": [idea]})).unwrap();

        assert!(matches!(output.validate(), Err(OutputError::Invalid { .. })));
    }

    #[test]
    fn non_http_image_is_dropped() {
        let mut idea = idea_json();
        idea["image_url"] = json!("data:image/png;base64,AAAA");
        let output: FlightAgentOutput = serde_json::from_value(json!({"ideas": [idea]})).unwrap();

        assert_eq!(output.validate().unwrap().ideas[0].image_url, None);
    }

    #[test]
    fn hotel_results_are_capped() {
        let hotel = json!({
            "hotel_name": "Avenida Palace",
            "address": "R. 1º de Dezembro 123, Lisboa",
            "rating": 4,
            "total_price": "640.00",
            "check_in_date": "2024-06-01",
            "check_out_date": "2024-06-08",
            "booking_link": "https://www.booking.com/hotel/pt/avenida-palace.html"
        });
        let result: HotelSearchResult = serde_json::from_value(json!({
            "city_name": "Lisbon",
            "city_code": "lis",
            "hotels": [hotel.clone(), hotel.clone(), hotel.clone(), hotel]
        }))
        .unwrap();

        let result = result.validate(3).unwrap();
        assert_eq!(result.city_code, "LIS");
        assert_eq!(result.hotels.len(), 3);
        assert_eq!(result.hotels[0].rating.as_deref(), Some("4"));
    }

    #[test]
    fn missing_hotels_key_means_none() {
        let result: HotelSearchResult =
            serde_json::from_value(json!({"city_name": "Lisbon", "city_code": "LIS"})).unwrap();
        assert!(result.hotels.is_empty());
    }
}

//! Record types for the provider's JSON responses.
//!
//! Everything the agents see passes through these types first, so malformed provider data
//! is rejected (or normalised) before any business logic touches it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Response envelope shared by all search endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Option<ResponseMeta>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponseMeta {
    #[serde(default)]
    pub currency: Option<String>,
}

impl DataEnvelope<FlightDestination> {
    /// Inspiration records with the envelope's currency copied onto every price.
    ///
    /// Inspiration prices come without a per-record currency; the response `meta` names it.
    pub fn into_priced(self) -> Vec<FlightDestination> {
        let currency = self.meta.and_then(|meta| meta.currency);
        let mut records = self.data;
        if let Some(currency) = currency {
            for record in records.iter_mut().filter(|r| r.price.currency.is_none()) {
                record.price.currency = Some(currency.clone());
            }
        }
        records
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub total: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_dates: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_offers: Option<String>,
}

/// One record of a flight inspiration search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightDestination {
    #[serde(default)]
    pub origin: String,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    pub price: Price,
    #[serde(default)]
    pub links: DestinationLinks,
}

/// A hotel returned by the by-city reference lookup
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelListing {
    pub hotel_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub iata_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferHotel {
    #[serde(default)]
    pub hotel_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomOffer {
    #[serde(default)]
    pub id: Option<String>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub price: Price,
}

/// A hotel together with its priced offers for the requested stay
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HotelOffer {
    pub hotel: OfferHotel,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub offers: Vec<RoomOffer>,
}

/// The compact per-hotel view handed to the hotel agent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotelOfferSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotel_id: Option<String>,
    pub name: String,
    pub price: String,
    pub currency: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// Summarise at most `limit` hotels whose first offer carries a total price.
pub fn summarize_offers(offers: &[HotelOffer], limit: usize, currency: &str) -> Vec<HotelOfferSummary> {
    offers
        .iter()
        .filter_map(|hotel| {
            let offer = hotel.offers.first()?;
            if offer.price.total.trim().is_empty() {
                return None;
            }
            Some(HotelOfferSummary {
                hotel_id: hotel.hotel.hotel_id.clone(),
                name: hotel
                    .hotel
                    .name
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
                price: offer.price.total.clone(),
                currency: offer
                    .price
                    .currency
                    .clone()
                    .unwrap_or_else(|| currency.to_string()),
                check_in: offer.check_in_date,
                check_out: offer.check_out_date,
            })
        })
        .take(limit)
        .collect()
}

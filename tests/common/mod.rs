#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Value, json};

use ev_bot::amadeus::{DateWindow, FlightDestination, HotelOffer, ProviderError, TravelData};
use ev_bot::config::{Settings, SettingsOverrides};
use ev_bot::images::ImageLookup;
use ev_bot::llm::{LlmProvider, LlmResponse, Message};
use ev_bot::telegram::{ChatSender, DeliveryError};
use ev_bot::tools::Tool;

/// One `chat` call as the provider saw it
#[derive(Debug, Clone)]
pub struct RecordedChat {
    pub system: String,
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
}

/// A mock LLM provider that replays scripted responses in order.
pub struct MockLlmProvider {
    responses: Mutex<VecDeque<LlmResponse>>,
    calls: Mutex<Vec<RecordedChat>>,
}

impl MockLlmProvider {
    /// Create a mock from a sequence of responses (popped in order).
    pub fn with_responses(responses: Vec<LlmResponse>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedChat> {
        self.calls.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn chat(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[&dyn Tool],
    ) -> Result<LlmResponse> {
        self.calls.lock().unwrap().push(RecordedChat {
            system: system.to_string(),
            messages: messages.to_vec(),
            tool_names: tools.iter().map(|t| t.name().to_string()).collect(),
        });
        let mut queue = self.responses.lock().unwrap();
        queue
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("MockLlmProvider: no more responses in queue"))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// In-memory flight/hotel data keyed by city code
#[derive(Default)]
pub struct FakeTravelData {
    pub destinations: Vec<FlightDestination>,
    pub fail_inspiration: bool,
    pub hotels: HashMap<String, Vec<HotelOffer>>,
    pub failing_cities: Vec<String>,
    pub hotel_queries: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl FakeTravelData {
    pub fn queries(&self) -> Vec<(String, NaiveDate, NaiveDate)> {
        self.hotel_queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl TravelData for FakeTravelData {
    async fn search_flight_inspiration(
        &self,
        _origin: &str,
        _window: &DateWindow,
    ) -> Result<Vec<FlightDestination>, ProviderError> {
        if self.fail_inspiration {
            return Err(ProviderError::Status {
                status: 500,
                body: "upstream down".to_string(),
            });
        }
        Ok(self.destinations.clone())
    }

    async fn search_hotels_by_city(
        &self,
        city_code: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Option<Vec<HotelOffer>>, ProviderError> {
        self.hotel_queries
            .lock()
            .unwrap()
            .push((city_code.to_string(), check_in, check_out));
        if self.failing_cities.iter().any(|c| c == city_code) {
            return Err(ProviderError::Status {
                status: 400,
                body: "invalid city code".to_string(),
            });
        }
        Ok(self.hotels.get(city_code).cloned())
    }
}

/// Image lookup answering from a fixed table
#[derive(Default)]
pub struct FakeImages {
    pub urls: HashMap<String, String>,
}

#[async_trait]
impl ImageLookup for FakeImages {
    async fn find_image(&self, place: &str) -> Option<String> {
        self.urls.get(place).cloned()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text(String),
    Photo { url: String, caption: String },
}

/// Chat sender that records what would have been posted
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<Sent>>,
    pub reject_photos: bool,
    pub reject_everything: bool,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn rejected(method: &'static str) -> DeliveryError {
        DeliveryError::Rejected {
            method,
            description: "Unauthorized".to_string(),
        }
    }
}

#[async_trait]
impl ChatSender for RecordingSender {
    async fn send_message(&self, text: &str) -> Result<(), DeliveryError> {
        if self.reject_everything {
            return Err(Self::rejected("sendMessage"));
        }
        self.sent.lock().unwrap().push(Sent::Text(text.to_string()));
        Ok(())
    }

    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<(), DeliveryError> {
        if self.reject_everything {
            return Err(Self::rejected("sendPhoto"));
        }
        if self.reject_photos {
            return Err(DeliveryError::Rejected {
                method: "sendPhoto",
                description: "Bad Request: wrong type of the web page content".to_string(),
            });
        }
        self.sent.lock().unwrap().push(Sent::Photo {
            url: photo_url.to_string(),
            caption: caption.to_string(),
        });
        Ok(())
    }
}

pub fn sample_data_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/inspiration_sample.json")
}

/// Fully credentialed settings for a Madrid channel posting in Spanish
pub fn madrid_settings() -> Settings {
    SettingsOverrides {
        amadeus_client_id: Some("id".to_string()),
        amadeus_client_secret: Some("secret".to_string()),
        openai_key: Some("sk-test".to_string()),
        telegram_bot_token: Some("123:abc".to_string()),
        telegram_channel_id: Some("@viajes".to_string()),
        origin: Some("MAD".to_string()),
        language: Some("Spanish".to_string()),
        currency: Some("EUR".to_string()),
        sample_data_path: Some(sample_data_path()),
        ..Default::default()
    }
    .build()
    .unwrap()
}

pub fn destination(code: &str, departure: &str, ret: &str, price: &str) -> FlightDestination {
    serde_json::from_value(json!({
        "type": "flight-destination",
        "origin": "MAD",
        "destination": code,
        "departureDate": departure,
        "returnDate": ret,
        "price": { "total": price },
        "links": {
            "flightDates": format!("https://test.api.amadeus.com/v1/shopping/flight-dates?origin=MAD&destination={code}"),
            "flightOffers": format!("https://test.api.amadeus.com/v2/shopping/flight-offers?originLocationCode=MAD&destinationLocationCode={code}")
        }
    }))
    .unwrap()
}

pub fn hotel_offer(id: &str, name: &str, check_in: &str, check_out: &str, total: &str) -> HotelOffer {
    serde_json::from_value(json!({
        "type": "hotel-offers",
        "hotel": { "hotelId": id, "name": name, "cityCode": "OPO" },
        "available": true,
        "offers": [{
            "id": format!("{id}-offer"),
            "checkInDate": check_in,
            "checkOutDate": check_out,
            "price": { "currency": "EUR", "total": total }
        }]
    }))
    .unwrap()
}

/// Flight-agent idea in the JSON shape the model is asked for
pub fn idea_json(code: &str, city: &str, start: &str, end: &str, image_url: Option<&str>) -> Value {
    let mut idea = json!({
        "header": format!("Escápate a {city}"),
        "motivation": "Una semana diferente",
        "destination_description": format!("{city} te espera"),
        "travel_summary": {
            "flight_number": null,
            "flight_price": "120.50",
            "starting_point": "Madrid",
            "starting_point_code": "MAD",
            "destination": city,
            "destination_code": code,
            "travel_dates": format!("{start} - {end}"),
            "travel_start_date": start,
            "travel_end_date": end,
            "booking_link": format!("https://www.example.com/flights/MAD-{code}")
        }
    });
    if let Some(url) = image_url {
        idea["image_url"] = json!(url);
    }
    idea
}

/// Hotel-agent hotel entry in the JSON shape the model is asked for
pub fn hotel_json(name: &str, check_in: &str, check_out: &str) -> Value {
    json!({
        "hotel_name": name,
        "address": "Rua Central 1",
        "rating": 4,
        "total_price": "640.00",
        "check_in_date": check_in,
        "check_out_date": check_out,
        "booking_link": format!("https://www.example.com/hotels/{}", name.replace(' ', "-"))
    })
}

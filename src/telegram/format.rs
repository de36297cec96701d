use std::fmt::Write;

use tracing::{info, warn};

use super::Translations;
use crate::agents::CombinedSuggestion;

/// One chat message: an HTML caption plus an optional image to attach it to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub image_url: Option<String>,
    pub caption: String,
}

/// Escape text for Telegram's HTML parse mode, including quotes for attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Whether the URL points straight at an image file Telegram can fetch as a photo
pub fn is_direct_image_url(url: &str) -> bool {
    let lower = url.trim().to_lowercase();
    [".jpg", ".jpeg", ".png", ".webp"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}

/// Render the HTML caption for one suggestion.
pub fn render_caption(suggestion: &CombinedSuggestion, t: &Translations, currency: &str) -> String {
    let idea = &suggestion.idea;
    let summary = &idea.travel_summary;
    let currency = escape_html(currency);
    let mut msg = String::new();

    // writing to a String cannot fail
    let _ = writeln!(msg, "<b>{}</b>", escape_html(&idea.header));
    let _ = writeln!(msg, "<i>{}</i>\n", escape_html(&idea.motivation));
    let _ = writeln!(msg, "{}\n", escape_html(&idea.destination_description));

    let _ = writeln!(msg, "<b>{}:</b>", t.travel_details);
    let _ = writeln!(msg, "📍 {}: {}", t.from, escape_html(&summary.starting_point));
    let _ = writeln!(msg, "✈️ {}: {}", t.to, escape_html(&summary.destination));
    let _ = writeln!(msg, "📅 {}: {}", t.dates, escape_html(&summary.travel_dates));
    // flight prices stay in the currency the search quoted them in
    let flight_currency = summary
        .flight_currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map_or_else(|| currency.clone(), escape_html);
    let _ = writeln!(
        msg,
        "💰 {}: {} {}",
        t.price,
        escape_html(&summary.flight_price),
        flight_currency
    );
    if let Some(number) = &summary.flight_number {
        let _ = writeln!(msg, "🔢 {}: {}", t.flight, escape_html(number));
    }
    let _ = writeln!(
        msg,
        "🔗 <a href='{}'>{}</a>\n",
        escape_html(&summary.booking_link),
        t.book_flight
    );

    if suggestion.hotels.is_empty() {
        let _ = writeln!(msg, "⚠️ {}", t.no_hotels);
        return msg;
    }

    let _ = writeln!(msg, "<b>🏨 {}:</b>", t.hotel_options);
    for hotel in &suggestion.hotels {
        let _ = writeln!(
            msg,
            "• {} ({}⭐)",
            escape_html(&hotel.hotel_name),
            escape_html(hotel.rating.as_deref().unwrap_or("N/A"))
        );
        let _ = writeln!(msg, "  💵 {} {}", escape_html(&hotel.total_price), currency);
        let _ = writeln!(msg, "  📍 {}", escape_html(&hotel.address));
        let _ = writeln!(
            msg,
            "  🔗 <a href='{}'>{}</a>\n",
            escape_html(&hotel.booking_link),
            t.book_hotel
        );
    }
    msg
}

/// Format every suggestion into a message, keeping their order.
pub fn format_suggestions(
    suggestions: &[CombinedSuggestion],
    language: &str,
    currency: &str,
) -> Vec<OutgoingMessage> {
    let translations = Translations::for_language(language);
    info!(count = suggestions.len(), language = translations.language, "formatting travel ideas");

    suggestions
        .iter()
        .enumerate()
        .map(|(i, suggestion)| {
            let summary = &suggestion.idea.travel_summary;
            info!(
                idea = i + 1,
                header = %suggestion.idea.header,
                destination = %summary.destination,
                "formatting idea"
            );
            if suggestion.hotels.is_empty() {
                warn!(
                    destination = %summary.destination,
                    code = %summary.destination_code,
                    "no hotels for destination"
                );
            }
            OutgoingMessage {
                image_url: suggestion.idea.image_url.clone(),
                caption: render_caption(suggestion, translations, currency),
            }
        })
        .collect()
}

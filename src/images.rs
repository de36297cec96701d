use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::time::Duration;
use tracing::{debug, info, warn};

pub const WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Looks up a representative image for a place name
#[async_trait]
pub trait ImageLookup: Send + Sync {
    /// Returns an image URL, or `None` when nothing was found or the lookup failed.
    async fn find_image(&self, place: &str) -> Option<String>;
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<PagesQuery>,
}

#[derive(Deserialize)]
struct PagesQuery {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Deserialize)]
struct Page {
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    source: String,
}

/// Page thumbnails from the Wikipedia query API
pub struct WikipediaImages {
    http: Client,
    api_url: String,
    thumb_size: u32,
}

impl WikipediaImages {
    pub fn new(thumb_size: u32) -> Self {
        Self::with_api_url(WIKIPEDIA_API_URL, thumb_size)
    }

    pub fn with_api_url(api_url: impl Into<String>, thumb_size: u32) -> Self {
        let http = Client::builder()
            .user_agent(concat!("ev-bot/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_url: api_url.into(),
            thumb_size,
        }
    }

    async fn query(&self, place: &str) -> Result<Option<String>, reqwest::Error> {
        let thumb_size = self.thumb_size.to_string();
        let params = [
            ("action", "query"),
            ("format", "json"),
            ("titles", place),
            ("prop", "pageimages"),
            ("pithumbsize", thumb_size.as_str()),
        ];
        let response: QueryResponse = self
            .http
            .get(&self.api_url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .query
            .into_iter()
            .flat_map(|q| q.pages.into_values())
            .find_map(|page| page.thumbnail.map(|t| t.source)))
    }
}

#[async_trait]
impl ImageLookup for WikipediaImages {
    async fn find_image(&self, place: &str) -> Option<String> {
        debug!(place, "fetching Wikipedia image");
        match self.query(place).await {
            Ok(Some(url)) => {
                info!(place, url = %url, "found image");
                Some(url)
            }
            Ok(None) => {
                info!(place, "no image found");
                None
            }
            Err(e) => {
                warn!(place, error = %e, "Wikipedia image search failed");
                None
            }
        }
    }
}

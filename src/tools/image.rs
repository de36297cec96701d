use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Value, json};

use super::{NO_RESULT, Tool};
use crate::images::ImageLookup;

/// Representative image of a destination
pub struct DestinationImageTool {
    images: Arc<dyn ImageLookup>,
}

impl DestinationImageTool {
    pub fn new(images: Arc<dyn ImageLookup>) -> Self {
        Self { images }
    }
}

#[async_trait]
impl Tool for DestinationImageTool {
    fn name(&self) -> &str {
        "get_destination_image"
    }

    fn description(&self) -> &str {
        "Get a representative image URL for a city or place. Returns the URL as a JSON string, or null."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "destination": {
                    "type": "string",
                    "description": "Name of the city or point of interest, e.g. Lisbon"
                }
            },
            "required": ["destination"]
        })
    }

    async fn execute(&self, params: Value) -> Result<String> {
        let destination = params["destination"]
            .as_str()
            .context("missing 'destination' parameter")?;

        Ok(match self.images.find_image(destination).await {
            Some(url) => Value::String(url).to_string(),
            None => NO_RESULT.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct OnlyLisbon;

    #[async_trait]
    impl ImageLookup for OnlyLisbon {
        async fn find_image(&self, place: &str) -> Option<String> {
            (place == "Lisbon").then(|| "https://upload.wikimedia.org/lisbon.jpg".to_string())
        }
    }

    #[tokio::test]
    async fn url_is_returned_as_json_string() {
        let tool = DestinationImageTool::new(Arc::new(OnlyLisbon));

        let found = tool.execute(json!({"destination": "Lisbon"})).await.unwrap();
        assert_eq!(found, "\"https://upload.wikimedia.org/lisbon.jpg\"");

        let missing = tool.execute(json!({"destination": "Atlantis"})).await.unwrap();
        assert_eq!(missing, NO_RESULT);
    }
}

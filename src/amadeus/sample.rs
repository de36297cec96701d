use std::path::Path;

use tracing::{error, warn};

use super::types::{DataEnvelope, FlightDestination};
use super::{DateWindow, ProviderError, TravelData};

/// Load bundled inspiration records (`{"data": [...], "meta": {...}}`) from disk
pub fn load_sample(path: &Path) -> Result<Vec<FlightDestination>, ProviderError> {
    let sample_error = |reason: String| ProviderError::Sample {
        path: path.to_path_buf(),
        reason,
    };

    let contents = std::fs::read_to_string(path).map_err(|e| sample_error(e.to_string()))?;
    let envelope: DataEnvelope<FlightDestination> =
        serde_json::from_str(&contents).map_err(|e| sample_error(e.to_string()))?;
    Ok(envelope.into_priced())
}

/// Run the inspiration search, falling back to the bundled sample when it fails.
///
/// Only an unreadable sample after a failed search is an error.
pub async fn inspiration_or_sample(
    source: &dyn TravelData,
    origin: &str,
    window: &DateWindow,
    sample_path: &Path,
) -> Result<Vec<FlightDestination>, ProviderError> {
    match source.search_flight_inspiration(origin, window).await {
        Ok(records) => Ok(records),
        Err(e) => {
            warn!(
                error = %e,
                sample = %sample_path.display(),
                "flight inspiration search failed, falling back to sample data"
            );
            load_sample(sample_path).inspect_err(|fallback| {
                error!(error = %fallback, "failed to load sample data");
            })
        }
    }
}

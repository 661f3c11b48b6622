//! Forward geocoding for address validation and autocomplete.

use std::time::Duration;

use ratenextdoor_common::{AppError, AppResult, config::GeocodingConfig};
use serde::{Deserialize, Serialize};

/// Queries shorter than this return no candidates.
pub const AUTOCOMPLETE_MIN_QUERY_LEN: usize = 3;

/// Candidates returned by autocomplete.
pub const AUTOCOMPLETE_LIMIT: usize = 5;

/// Geocoder response body.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// A single geocoder match.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    pub place_name: String,
    /// `[longitude, latitude]`
    pub center: [f64; 2],
    #[serde(default)]
    pub context: Vec<ContextItem>,
    #[serde(default)]
    pub relevance: f64,
    /// House number
    #[serde(default)]
    pub address: Option<String>,
    /// Street name
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContextItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub short_code: Option<String>,
}

/// Address components extracted from a feature's context.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Components {
    city: String,
    state: String,
    zip_code: String,
}

impl Feature {
    fn components(&self) -> Components {
        let mut out = Components::default();
        for item in &self.context {
            if item.id.starts_with("place.") {
                out.city = item.text.clone();
            } else if item.id.starts_with("region.") {
                out.state = item
                    .short_code
                    .as_deref()
                    .and_then(|code| code.strip_prefix("US-"))
                    .map_or_else(|| item.text.clone(), ToString::to_string);
            } else if item.id.starts_with("postcode.") {
                out.zip_code = item.text.clone();
            }
        }
        out
    }
}

/// A verified US address.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedAddress {
    pub full_address: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Geocoder relevance in `0..=1`
    pub confidence: f64,
}

/// An autocomplete candidate. Components may be empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSuggestion {
    pub full_address: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Turn the best match into a validated address.
pub fn parse_validated(collection: FeatureCollection) -> AppResult<ValidatedAddress> {
    let feature = collection.features.into_iter().next().ok_or_else(|| {
        AppError::NotFound("Address not found. Please enter a valid US address.".to_string())
    })?;

    let street_address = feature
        .place_name
        .split(',')
        .next()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    let Components {
        city,
        state,
        zip_code,
    } = feature.components();

    if street_address.is_empty() || city.is_empty() || state.is_empty() || zip_code.is_empty() {
        return Err(AppError::Validation(
            "Incomplete address. Please provide a complete street address with city, state, and ZIP code."
                .to_string(),
        ));
    }

    Ok(ValidatedAddress {
        full_address: feature.place_name,
        street_address,
        city,
        state,
        zip_code,
        latitude: feature.center[1],
        longitude: feature.center[0],
        confidence: feature.relevance,
    })
}

/// Turn geocoder matches into autocomplete candidates.
#[must_use]
pub fn parse_suggestions(collection: FeatureCollection) -> Vec<AddressSuggestion> {
    collection
        .features
        .into_iter()
        .take(AUTOCOMPLETE_LIMIT)
        .map(|feature| {
            let components = feature.components();
            let street_address = match (&feature.address, &feature.text) {
                (Some(number), Some(street)) => format!("{number} {street}"),
                (None, Some(street)) => street.clone(),
                _ => String::new(),
            };
            AddressSuggestion {
                full_address: feature.place_name,
                street_address,
                city: components.city,
                state: components.state,
                zip_code: components.zip_code,
                latitude: feature.center[1],
                longitude: feature.center[0],
            }
        })
        .collect()
}

/// Geocoding service backed by a Mapbox-compatible HTTP API.
#[derive(Clone)]
pub struct GeocodingService {
    http_client: reqwest::Client,
    config: GeocodingConfig,
}

impl GeocodingService {
    /// Create a new geocoding service.
    pub fn new(config: GeocodingConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Whether an access token is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.config.access_token.is_some()
    }

    /// Validate a free-form US street address.
    pub async fn validate_address(&self, address: &str) -> AppResult<ValidatedAddress> {
        let address = address.trim();
        if address.is_empty() {
            return Err(AppError::Validation("Address is required".to_string()));
        }

        let collection = self.forward(address, 1).await?;
        parse_validated(collection)
    }

    /// Address candidates for a partial query.
    pub async fn autocomplete(&self, query: &str) -> AppResult<Vec<AddressSuggestion>> {
        let query = query.trim();
        if query.chars().count() < AUTOCOMPLETE_MIN_QUERY_LEN {
            return Ok(vec![]);
        }

        let collection = self.forward(query, AUTOCOMPLETE_LIMIT).await?;
        Ok(parse_suggestions(collection))
    }

    fn request_url(&self, query: &str) -> String {
        format!(
            "{}/geocoding/v5/mapbox.places/{}.json",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(query)
        )
    }

    async fn forward(&self, query: &str, limit: usize) -> AppResult<FeatureCollection> {
        let token = self
            .config
            .access_token
            .as_deref()
            .ok_or_else(|| AppError::Config("Geocoding access token not configured".to_string()))?;

        let limit = limit.to_string();
        let response = self
            .http_client
            .get(self.request_url(query))
            .query(&[
                ("access_token", token),
                ("country", self.config.country.as_str()),
                ("types", "address"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Geocoding request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Geocoding API error: {status} - {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse geocoding response: {e}")))
    }
}

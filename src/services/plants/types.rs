//! Request and response types for the plants service.

use serde::{Deserialize, Serialize};

/// A single plant in search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantSearchResult {
    /// Plant identifier (e.g. `monstera deliciosa`)
    pub pid: String,
    /// Display form of the identifier
    pub display_pid: String,
    /// Common-name alias the plant was matched on
    pub alias: String,
    /// Plant category
    pub category: String,
}

/// Paginated envelope around search results.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchResponse {
    #[allow(dead_code)]
    pub count: i64,
    #[allow(dead_code)]
    pub next: Option<String>,
    #[allow(dead_code)]
    pub previous: Option<String>,
    pub results: Vec<PlantSearchResult>,
}

/// Complete plant care information.
///
/// Numeric care ranges are integers except temperatures, which the API
/// reports as floating point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantDetails {
    /// Plant identifier
    pub pid: String,
    /// Display form of the identifier
    pub display_pid: String,
    /// Common-name alias
    pub alias: String,
    /// Maximum light level in lux
    pub max_light_lux: i32,
    /// Minimum light level in lux
    pub min_light_lux: i32,
    /// Maximum temperature in degrees Celsius
    pub max_temp: f64,
    /// Minimum temperature in degrees Celsius
    pub min_temp: f64,
    /// Maximum environment humidity in percent
    pub max_env_humid: i32,
    /// Minimum environment humidity in percent
    pub min_env_humid: i32,
    /// Maximum soil moisture in percent
    pub max_soil_moist: i32,
    /// Minimum soil moisture in percent
    pub min_soil_moist: i32,
    /// Maximum soil conductivity in µS/cm
    pub max_soil_ec: i32,
    /// Minimum soil conductivity in µS/cm
    pub min_soil_ec: i32,
    /// URL of the plant image
    pub image_url: String,
    /// Plant category
    pub category: String,
}

/// Options for [`super::PlantsService::search`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum number of results to return (0 = API default)
    pub limit: u32,
    /// Include user-contributed plants in results
    pub user_plants: bool,
}

/// Options for [`super::PlantsService::details`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailOptions {
    /// ISO 639-1 language code for localized aliases (e.g. "en", "de")
    pub language: Option<String>,
}

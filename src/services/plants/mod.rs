//! Plants API service
//!
//! Search by common name and fetch per-plant care details, both behind the
//! unified cache/rate-limit/auth request pipeline.

mod service;
mod types;

#[cfg(test)]
mod tests;

pub use service::{PlantsService, PlantsServiceImpl};
pub use types::{DetailOptions, PlantDetails, PlantSearchResult, SearchOptions};

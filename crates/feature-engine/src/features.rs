//! Feature Vector Assembly

use data_validator::RawInput;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of features in the vector (six raw + four derived)
pub const FEATURE_DIMENSION: usize = 10;

/// Column names in the order shared with the predictor's training schema
pub const FEATURE_NAMES: [&str; FEATURE_DIMENSION] = [
    "size",
    "condition",
    "transport_score",
    "location_score",
    "community_score",
    "energy_score",
    "accessibility_index",
    "renovation_potential",
    "community_impact",
    "sustainability_score",
];

/// Feature vector for impact prediction
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub size: f64,
    pub condition: f64,
    pub transport_score: f64,
    pub location_score: f64,
    pub community_score: f64,
    pub energy_score: f64,

    // Derived indicators
    /// transport × location / 10
    pub accessibility_index: f64,
    /// (10 − condition) × size / 100
    pub renovation_potential: f64,
    /// community × location / 10
    pub community_impact: f64,
    /// energy × transport / 10
    pub sustainability_score: f64,
}

impl FeatureVector {
    /// Values in [`FEATURE_NAMES`] order
    pub fn to_array(&self) -> [f64; FEATURE_DIMENSION] {
        [
            self.size,
            self.condition,
            self.transport_score,
            self.location_score,
            self.community_score,
            self.energy_score,
            self.accessibility_index,
            self.renovation_potential,
            self.community_impact,
            self.sustainability_score,
        ]
    }

    /// Build from values in [`FEATURE_NAMES`] order
    pub fn from_array(values: [f64; FEATURE_DIMENSION]) -> Self {
        Self {
            size: values[0],
            condition: values[1],
            transport_score: values[2],
            location_score: values[3],
            community_score: values[4],
            energy_score: values[5],
            accessibility_index: values[6],
            renovation_potential: values[7],
            community_impact: values[8],
            sustainability_score: values[9],
        }
    }

    /// `(name, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_NAMES.into_iter().zip(self.to_array())
    }

    /// Apply `f` to every value
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        Self::from_array(self.to_array().map(f))
    }
}

/// Derives composite indicators from validated property attributes
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEngine;

impl FeatureEngine {
    /// Create a new feature engine
    pub fn new() -> Self {
        Self
    }

    /// Build the ten-column feature vector for one property
    pub fn create_features(&self, raw: &RawInput) -> FeatureVector {
        let features = FeatureVector {
            size: raw.size(),
            condition: raw.condition(),
            transport_score: raw.transport_score(),
            location_score: raw.location_score(),
            community_score: raw.community_score(),
            energy_score: raw.energy_score(),
            accessibility_index: raw.transport_score() * raw.location_score() / 10.0,
            renovation_potential: (10.0 - raw.condition()) * raw.size() / 100.0,
            community_impact: raw.community_score() * raw.location_score() / 10.0,
            sustainability_score: raw.energy_score() * raw.transport_score() / 10.0,
        };

        debug!(
            "Derived features: accessibility={:.2}, renovation={:.2}, community={:.2}, sustainability={:.2}",
            features.accessibility_index,
            features.renovation_potential,
            features.community_impact,
            features.sustainability_score
        );

        features
    }
}

//! Property Input Records

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validator::Validator;

/// Fields every submission must carry, in column order
pub const REQUIRED_FIELDS: [&str; 6] = [
    "size",
    "condition",
    "transport_score",
    "location_score",
    "community_score",
    "energy_score",
];

/// Property attributes as submitted by the dashboard form.
///
/// Every field is optional so that a missing value is reported as a
/// validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySubmission {
    /// Property size in square meters
    pub size: Option<f64>,
    /// Building condition (1 = poor, 10 = excellent)
    pub condition: Option<f64>,
    /// Public transport accessibility
    pub transport_score: Option<f64>,
    /// Location quality
    pub location_score: Option<f64>,
    /// Community need level
    pub community_score: Option<f64>,
    /// Energy efficiency potential
    pub energy_score: Option<f64>,
}

impl PropertySubmission {
    /// Submission with every field present
    pub fn complete(
        size: f64,
        condition: f64,
        transport_score: f64,
        location_score: f64,
        community_score: f64,
        energy_score: f64,
    ) -> Self {
        Self {
            size: Some(size),
            condition: Some(condition),
            transport_score: Some(transport_score),
            location_score: Some(location_score),
            community_score: Some(community_score),
            energy_score: Some(energy_score),
        }
    }

    /// Field values paired with their names, in column order
    pub fn fields(&self) -> [(&'static str, Option<f64>); 6] {
        [
            (REQUIRED_FIELDS[0], self.size),
            (REQUIRED_FIELDS[1], self.condition),
            (REQUIRED_FIELDS[2], self.transport_score),
            (REQUIRED_FIELDS[3], self.location_score),
            (REQUIRED_FIELDS[4], self.community_score),
            (REQUIRED_FIELDS[5], self.energy_score),
        ]
    }
}

/// Validated property attributes.
///
/// Only obtainable through [`Validator::validate`] or [`RawInput::try_new`],
/// so every instance satisfies the configured ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawInput {
    size: f64,
    condition: f64,
    transport_score: f64,
    location_score: f64,
    community_score: f64,
    energy_score: f64,
}

impl RawInput {
    pub(crate) fn from_checked(values: [f64; 6]) -> Self {
        Self {
            size: values[0],
            condition: values[1],
            transport_score: values[2],
            location_score: values[3],
            community_score: values[4],
            energy_score: values[5],
        }
    }

    /// Validate six values against the default ranges
    pub fn try_new(
        size: f64,
        condition: f64,
        transport_score: f64,
        location_score: f64,
        community_score: f64,
        energy_score: f64,
    ) -> Result<Self, Vec<ValidationError>> {
        let submission = PropertySubmission::complete(
            size,
            condition,
            transport_score,
            location_score,
            community_score,
            energy_score,
        );
        Validator::default().validate(&submission).into_result()
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn condition(&self) -> f64 {
        self.condition
    }

    pub fn transport_score(&self) -> f64 {
        self.transport_score
    }

    pub fn location_score(&self) -> f64 {
        self.location_score
    }

    pub fn community_score(&self) -> f64 {
        self.community_score
    }

    pub fn energy_score(&self) -> f64 {
        self.energy_score
    }

    /// Values in column order
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.size,
            self.condition,
            self.transport_score,
            self.location_score,
            self.community_score,
            self.energy_score,
        ]
    }
}

impl From<RawInput> for PropertySubmission {
    fn from(input: RawInput) -> Self {
        let [size, condition, transport, location, community, energy] = input.to_array();
        PropertySubmission::complete(size, condition, transport, location, community, energy)
    }
}

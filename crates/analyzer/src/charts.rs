//! Chart Data for the Dashboard
//!
//! Produces the series the dashboard plots next to an analysis. Only the
//! radar is derived from the prediction. The historical context cloud and the
//! feature importance bars are simulated demo content, flagged with
//! `simulated: true`; the importances are not computed from the fitted models.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::AnalyzerError;

/// Chart generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Seed for the simulated series
    pub seed: u64,
    /// Points in the historical context cloud
    pub historical_points: usize,
    /// Standard deviation of the context cloud around each score
    pub spread: f64,
    /// Point size range of the context cloud
    pub size_range: (f64, f64),
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            historical_points: 100,
            spread: 0.5,
            size_range: (50.0, 500.0),
        }
    }
}

/// Polar chart of the three scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactRadar {
    pub axes: Vec<String>,
    pub values: Vec<f64>,
    pub radial_range: (f64, f64),
}

/// One synthetic comparison property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextPoint {
    pub social: f64,
    pub environmental: f64,
    pub financial: f64,
    pub size: f64,
}

/// 3D scatter of synthetic properties around the analyzed one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalContext {
    pub points: Vec<ContextPoint>,
    pub simulated: bool,
}

/// One bar of the importance chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub feature: String,
    pub weight: f64,
}

/// Horizontal bar chart of per-feature weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub weights: Vec<FeatureWeight>,
    pub simulated: bool,
}

/// Every chart shown for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSuite {
    pub radar: ImpactRadar,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical: Option<HistoricalContext>,
    pub importance: FeatureImportance,
}

impl ChartSuite {
    /// Build the chart data for a result
    pub fn build(
        result: &AnalysisResult,
        config: &ChartConfig,
        with_historical: bool,
    ) -> Result<Self, AnalyzerError> {
        let mut rng = StdRng::seed_from_u64(config.seed);

        let historical = if with_historical {
            Some(historical_context(result, config, &mut rng)?)
        } else {
            None
        };

        Ok(Self {
            radar: impact_radar(result),
            historical,
            importance: simulated_importance(result, &mut rng),
        })
    }
}

fn impact_radar(result: &AnalysisResult) -> ImpactRadar {
    ImpactRadar {
        axes: ["Social", "Environmental", "Financial"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        values: result.prediction.scores.to_array().to_vec(),
        radial_range: (0.0, 10.0),
    }
}

fn historical_context(
    result: &AnalysisResult,
    config: &ChartConfig,
    rng: &mut StdRng,
) -> Result<HistoricalContext, AnalyzerError> {
    let scores = result.prediction.scores;
    let social = Normal::new(scores.social, config.spread)?;
    let environmental = Normal::new(scores.environmental, config.spread)?;
    let financial = Normal::new(scores.financial, config.spread)?;
    let (low, high) = config.size_range;
    if !(low.is_finite() && high.is_finite() && low <= high) {
        return Err(AnalyzerError::ChartSizeRange(low, high));
    }

    let points = (0..config.historical_points)
        .map(|_| ContextPoint {
            social: social.sample(rng),
            environmental: environmental.sample(rng),
            financial: financial.sample(rng),
            size: if high > low { rng.gen_range(low..high) } else { low },
        })
        .collect();

    Ok(HistoricalContext {
        points,
        simulated: true,
    })
}

fn simulated_importance(result: &AnalysisResult, rng: &mut StdRng) -> FeatureImportance {
    let weights = result
        .features
        .iter()
        .map(|(name, _)| FeatureWeight {
            feature: name.to_string(),
            weight: rng.gen::<f64>(),
        })
        .collect();

    FeatureImportance {
        weights,
        simulated: true,
    }
}

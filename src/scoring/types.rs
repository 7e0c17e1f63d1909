use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discrete display bucket for a 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    Excellent,
    Good,
    Average,
    BelowAverage,
    Poor,
    Unavailable,
}

impl Tier {
    /// Bucket a score. Each band includes its lower bound.
    pub fn from_value(value: Option<f64>) -> Self {
        match value {
            None => Tier::Unavailable,
            Some(v) if v >= 80.0 => Tier::Excellent,
            Some(v) if v >= 60.0 => Tier::Good,
            Some(v) if v >= 40.0 => Tier::Average,
            Some(v) if v >= 20.0 => Tier::BelowAverage,
            Some(_) => Tier::Poor,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Excellent => "excellent",
            Tier::Good => "good",
            Tier::Average => "average",
            Tier::BelowAverage => "below-average",
            Tier::Poor => "poor",
            Tier::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of scoring one dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// 0-100, `None` when the inputs were insufficient
    pub value: Option<f64>,
    pub tier: Tier,
    pub explanation: String,
    /// Per-factor breakdown in formula order
    pub components: Vec<String>,
    /// 0-1
    pub confidence: f64,
}

impl Score {
    /// Build a score; the tier is always derived from the value.
    /// A non-finite value is treated as unavailable.
    pub fn new(
        value: Option<f64>,
        explanation: String,
        components: Vec<String>,
        confidence: f64,
    ) -> Self {
        let value = value.filter(|v| v.is_finite()).map(|v| v.clamp(0.0, 100.0));
        Self {
            value,
            tier: Tier::from_value(value),
            explanation,
            components,
            confidence: if value.is_some() {
                confidence.clamp(0.0, 1.0)
            } else {
                0.0
            },
        }
    }
}

/// All scores for one city on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSet {
    pub city_slug: String,
    pub city_name: String,
    pub computation_date: DateTime<Utc>,
    pub economy: Score,
    pub livability: Score,
    pub sustainability: Score,
    pub growth: Score,
    pub overall: Score,
    /// Percentage of the seven raw metrics present, 0-100
    pub data_completeness: f64,
    /// 0-1
    pub confidence_score: f64,
    pub missing_data: Vec<String>,
    pub is_stale: bool,
}

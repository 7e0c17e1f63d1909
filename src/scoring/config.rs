use serde::{Deserialize, Serialize};

/// Default freshness window before a snapshot counts as stale
pub const DEFAULT_STALE_AFTER: &str = "24h";
/// Default window over which confidence decays once a snapshot is stale
pub const DEFAULT_RECENCY_DECAY: &str = "7d";

/// Main scoring configuration.
///
/// Every section is optional; omitted values fall back to the built-in
/// weights and reference bands.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   stale_after: "24h"
///   recency_decay: "7d"
///   weights:
///     economy: { gdp_per_capita: 0.4, unemployment_rate: 0.6 }
///   bands:
///     gdp_per_capita: { worst: 0, best: 100000 }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Weights of each composite's terms
    #[serde(default)]
    pub weights: CompositeWeights,

    /// Reference ranges used to normalize raw metrics onto 0-100
    #[serde(default)]
    pub bands: NormalizationBands,

    /// Snapshots older than this are stale (humantime format, default "24h")
    #[serde(default)]
    pub stale_after: Option<String>,

    /// Confidence decays to half over this window once stale (default "7d")
    #[serde(default)]
    pub recency_decay: Option<String>,

    /// Rescale overall weights across the composites that are present.
    /// Off by default: a city with missing composites scores lower overall.
    #[serde(default)]
    pub renormalize_overall: Option<bool>,
}

impl ScoringConfig {
    /// Effective staleness threshold. Unparseable values fall back to the
    /// default; `validate_scoring` reports them at startup.
    pub fn stale_after(&self) -> chrono::Duration {
        parse_window(self.stale_after.as_deref(), DEFAULT_STALE_AFTER)
    }

    pub fn recency_decay(&self) -> chrono::Duration {
        parse_window(self.recency_decay.as_deref(), DEFAULT_RECENCY_DECAY)
    }

    pub fn renormalize_overall(&self) -> bool {
        self.renormalize_overall.unwrap_or(false)
    }
}

fn parse_window(value: Option<&str>, default: &str) -> chrono::Duration {
    value
        .and_then(|s| humantime::parse_duration(s.trim()).ok())
        .or_else(|| humantime::parse_duration(default).ok())
        .and_then(|d| chrono::Duration::from_std(d).ok())
        .unwrap_or_else(|| chrono::Duration::hours(24))
}

/// Per-composite term weights
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CompositeWeights {
    pub economy: EconomyWeights,
    pub livability: LivabilityWeights,
    pub growth: GrowthWeights,
    pub overall: OverallWeights,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EconomyWeights {
    pub gdp_per_capita: f64,
    pub unemployment_rate: f64,
}

impl Default for EconomyWeights {
    fn default() -> Self {
        Self {
            gdp_per_capita: 0.40,
            unemployment_rate: 0.60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LivabilityWeights {
    pub cost_of_living_index: f64,
    pub air_quality_index: f64,
    pub population: f64,
    /// Livability is only scored when at least this many of its inputs exist
    pub min_inputs: usize,
}

impl Default for LivabilityWeights {
    fn default() -> Self {
        Self {
            cost_of_living_index: 0.35,
            air_quality_index: 0.35,
            population: 0.30,
            min_inputs: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GrowthWeights {
    pub population_growth_rate: f64,
    pub gdp_growth_rate: f64,
}

impl Default for GrowthWeights {
    fn default() -> Self {
        Self {
            population_growth_rate: 0.50,
            gdp_growth_rate: 0.50,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OverallWeights {
    pub economy: f64,
    pub livability: f64,
    pub sustainability: f64,
    pub growth: f64,
}

impl Default for OverallWeights {
    fn default() -> Self {
        Self {
            economy: 0.30,
            livability: 0.35,
            sustainability: 0.20,
            growth: 0.15,
        }
    }
}

/// Linear reference band: a raw value of `worst` maps to 0 points and `best`
/// maps to 100. Either end may be the larger number, which is how
/// lower-is-better metrics are expressed.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Band {
    pub worst: f64,
    pub best: f64,
}

/// One point of the AQI curve
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Breakpoint {
    pub aqi: f64,
    pub points: f64,
}

/// Mid-size preference curve for population.
///
/// Scores 100 at `ideal` and loses `100 / decades_to_zero` points per factor
/// of ten away from it in either direction.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PopulationCurve {
    pub ideal: f64,
    pub decades_to_zero: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizationBands {
    pub gdp_per_capita: Band,
    pub unemployment_rate: Band,
    /// Piecewise-linear curve over US AQI category breakpoints, ascending by AQI
    pub air_quality_index: Vec<Breakpoint>,
    pub population: PopulationCurve,
    pub population_growth_rate: Band,
    pub gdp_growth_rate: Band,
    pub cost_of_living_index: Band,
}

impl Default for NormalizationBands {
    fn default() -> Self {
        Self {
            gdp_per_capita: Band {
                worst: 0.0,
                best: 100_000.0,
            },
            unemployment_rate: Band {
                worst: 15.0,
                best: 0.0,
            },
            air_quality_index: vec![
                Breakpoint { aqi: 0.0, points: 100.0 },
                Breakpoint { aqi: 50.0, points: 80.0 },
                Breakpoint { aqi: 100.0, points: 60.0 },
                Breakpoint { aqi: 150.0, points: 40.0 },
                Breakpoint { aqi: 200.0, points: 20.0 },
                Breakpoint { aqi: 300.0, points: 0.0 },
            ],
            population: PopulationCurve {
                ideal: 2_000_000.0,
                decades_to_zero: 3.0,
            },
            population_growth_rate: Band {
                worst: -1.0,
                best: 2.0,
            },
            gdp_growth_rate: Band {
                worst: -2.0,
                best: 6.0,
            },
            cost_of_living_index: Band {
                worst: 250.0,
                best: 50.0,
            },
        }
    }
}

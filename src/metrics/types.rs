use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The seven raw metrics a city snapshot may carry.
///
/// Order matters: it is the order used for `missingData` and for
/// completeness reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    GdpPerCapita,
    UnemploymentRate,
    AirQualityIndex,
    Population,
    PopulationGrowthRate,
    GdpGrowthRate,
    CostOfLivingIndex,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::GdpPerCapita,
        Metric::UnemploymentRate,
        Metric::AirQualityIndex,
        Metric::Population,
        Metric::PopulationGrowthRate,
        Metric::GdpGrowthRate,
        Metric::CostOfLivingIndex,
    ];

    /// Name shown in `missingData` and in component breakdowns
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::GdpPerCapita => "GDP per capita",
            Metric::UnemploymentRate => "Unemployment rate",
            Metric::AirQualityIndex => "Air quality index",
            Metric::Population => "Population",
            Metric::PopulationGrowthRate => "Population growth rate",
            Metric::GdpGrowthRate => "GDP growth rate",
            Metric::CostOfLivingIndex => "Cost of living index",
        }
    }

    /// JSON/YAML key of the metric inside a snapshot
    pub fn field_name(self) -> &'static str {
        match self {
            Metric::GdpPerCapita => "gdpPerCapita",
            Metric::UnemploymentRate => "unemploymentRate",
            Metric::AirQualityIndex => "airQualityIndex",
            Metric::Population => "population",
            Metric::PopulationGrowthRate => "populationGrowthRate",
            Metric::GdpGrowthRate => "gdpGrowthRate",
            Metric::CostOfLivingIndex => "costOfLivingIndex",
        }
    }

    /// Short noun used inside explanations ("low unemployment (4.2%)")
    pub fn phrase_label(self) -> &'static str {
        match self {
            Metric::GdpPerCapita => "GDP per capita",
            Metric::UnemploymentRate => "unemployment",
            Metric::AirQualityIndex => "AQI",
            Metric::Population => "population",
            Metric::PopulationGrowthRate => "population growth",
            Metric::GdpGrowthRate => "GDP growth",
            Metric::CostOfLivingIndex => "cost of living",
        }
    }

    /// Adjective describing a normalized point value for this metric.
    ///
    /// Lower-is-better metrics describe the raw level ("low unemployment"),
    /// higher-is-better metrics describe strength ("strong GDP growth").
    pub fn describe(self, points: f64) -> &'static str {
        let band = if points >= 80.0 {
            0
        } else if points >= 60.0 {
            1
        } else if points >= 40.0 {
            2
        } else if points >= 20.0 {
            3
        } else {
            4
        };

        match self {
            Metric::GdpPerCapita | Metric::PopulationGrowthRate | Metric::GdpGrowthRate => {
                ["strong", "solid", "moderate", "weak", "poor"][band]
            }
            Metric::UnemploymentRate | Metric::AirQualityIndex | Metric::CostOfLivingIndex => {
                ["low", "fairly low", "moderate", "high", "very high"][band]
            }
            Metric::Population => ["well-sized", "manageable", "strained", "awkward", "extreme"][band],
        }
    }

    /// Human-readable raw value: "$85K", "4.2%", "+1.1%", "8M", "45"
    pub fn format_raw(self, value: f64) -> String {
        match self {
            Metric::GdpPerCapita => format!("${}", compact_number(value)),
            Metric::UnemploymentRate => format!("{:.1}%", value),
            Metric::PopulationGrowthRate | Metric::GdpGrowthRate => format!("{:+.1}%", value),
            Metric::Population => compact_number(value),
            Metric::AirQualityIndex | Metric::CostOfLivingIndex => format!("{:.0}", value),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Format a number in compact notation (85K, 8.4M, 950)
fn compact_number(value: f64) -> String {
    let abs = value.abs();
    let formatted = if abs >= 1_000_000_000.0 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{:.0}", value)
    };

    // Trim trailing .0 (e.g., "85.0K" -> "85K")
    formatted
        .replace(".0B", "B")
        .replace(".0M", "M")
        .replace(".0K", "K")
}

/// Raw facts available for scoring one city on one day.
///
/// Every field is independently optional; `None` means the metric was not
/// observed, which is different from zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MetricInput {
    #[serde(default)]
    pub gdp_per_capita: Option<f64>,
    /// Percent of the labour force
    #[serde(default)]
    pub unemployment_rate: Option<f64>,
    #[serde(default)]
    pub air_quality_index: Option<f64>,
    #[serde(default)]
    pub population: Option<f64>,
    /// Percent, year over year
    #[serde(default)]
    pub population_growth_rate: Option<f64>,
    /// Percent, year over year
    #[serde(default)]
    pub gdp_growth_rate: Option<f64>,
    /// National average = 100
    #[serde(default)]
    pub cost_of_living_index: Option<f64>,
}

impl MetricInput {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::GdpPerCapita => self.gdp_per_capita,
            Metric::UnemploymentRate => self.unemployment_rate,
            Metric::AirQualityIndex => self.air_quality_index,
            Metric::Population => self.population,
            Metric::PopulationGrowthRate => self.population_growth_rate,
            Metric::GdpGrowthRate => self.gdp_growth_rate,
            Metric::CostOfLivingIndex => self.cost_of_living_index,
        }
    }

    /// Value of a metric if it is present and usable; non-finite values
    /// count as absent
    pub fn usable(&self, metric: Metric) -> Option<f64> {
        self.get(metric).filter(|v| v.is_finite())
    }

    /// Metrics that are absent or non-finite, in canonical order
    pub fn missing(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| self.usable(*m).is_none())
            .collect()
    }

    pub fn present_count(&self) -> usize {
        Metric::ALL.len() - self.missing().len()
    }
}

/// City identity carried through to the computed feature set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub slug: String,
    pub name: String,
}

/// One city's metrics at one instant, as handed from a metric source to the
/// score engine.
#[derive(Debug, Clone, PartialEq)]
pub struct CitySnapshot {
    pub city: City,
    pub as_of: DateTime<Utc>,
    pub metrics: MetricInput,
}

/// Check a snapshot's input container before scoring.
///
/// Magnitudes are never rejected here (the engine clamps them); only values
/// that cannot be scored at all, such as NaN or infinities, are.
/// Returns all validation errors at once (not just the first).
pub fn validate_input(metrics: &MetricInput) -> Result<(), Vec<String>> {
    let errors: Vec<String> = Metric::ALL
        .into_iter()
        .filter_map(|metric| match metrics.get(metric) {
            Some(value) if !value.is_finite() => Some(format!(
                "metrics.{}: must be a finite number, got {}",
                metric.field_name(),
                value
            )),
            _ => None,
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

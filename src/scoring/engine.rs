use chrono::{DateTime, Utc};

use super::config::ScoringConfig;
use super::explain;
use super::normalize::normalize;
use super::types::{FeatureSet, Score};
use crate::metrics::{City, CitySnapshot, Metric, MetricInput};

/// Confidence multiplier reached once a snapshot is `recency_decay` past stale
const MIN_RECENCY_FACTOR: f64 = 0.5;

/// One weighted input of a composite after normalization
#[derive(Debug, Clone)]
pub struct FactorContribution {
    pub metric: Metric,
    pub raw: Option<f64>,      // None when the metric is absent
    pub points: Option<f64>,   // Normalized 0-100
    pub weight: f64,           // Configured weight
    pub effective_weight: f64, // Weight after rescaling over present inputs; 0 when absent
}

/// A scored composite as seen by the overall score
#[derive(Debug, Clone)]
pub struct CompositePart {
    pub name: &'static str,
    pub value: Option<f64>,
    pub weight: f64,
    pub confidence: f64,
}

/// Score every dimension of one city.
///
/// Pure and deterministic: the only notion of time is the `as_of` of the
/// snapshot and the caller-supplied `now`, used for staleness and recency.
/// Missing metrics never fail; they lower completeness and confidence.
pub fn compute(
    city: &City,
    input: &MetricInput,
    as_of: DateTime<Utc>,
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> FeatureSet {
    let age = now - as_of;
    let stale_after = config.stale_after();
    let recency = recency_factor(age, stale_after, config.recency_decay());

    let weights = &config.weights;
    let economy = composite_score(
        input,
        config,
        &[
            (Metric::GdpPerCapita, weights.economy.gdp_per_capita),
            (Metric::UnemploymentRate, weights.economy.unemployment_rate),
        ],
        1,
        recency,
    );
    let livability = composite_score(
        input,
        config,
        &[
            (Metric::CostOfLivingIndex, weights.livability.cost_of_living_index),
            (Metric::AirQualityIndex, weights.livability.air_quality_index),
            (Metric::Population, weights.livability.population),
        ],
        weights.livability.min_inputs,
        recency,
    );
    let sustainability =
        composite_score(input, config, &[(Metric::AirQualityIndex, 1.0)], 1, recency);
    let growth = composite_score(
        input,
        config,
        &[
            (Metric::PopulationGrowthRate, weights.growth.population_growth_rate),
            (Metric::GdpGrowthRate, weights.growth.gdp_growth_rate),
        ],
        1,
        recency,
    );

    let parts = [
        CompositePart::of("economy", &economy, weights.overall.economy),
        CompositePart::of("livability", &livability, weights.overall.livability),
        CompositePart::of("sustainability", &sustainability, weights.overall.sustainability),
        CompositePart::of("growth", &growth, weights.overall.growth),
    ];
    let overall = overall_score(&parts, config.renormalize_overall());

    let missing = input.missing();
    let present_fraction = (Metric::ALL.len() - missing.len()) as f64 / Metric::ALL.len() as f64;

    FeatureSet {
        city_slug: city.slug.clone(),
        city_name: city.name.clone(),
        computation_date: as_of,
        economy,
        livability,
        sustainability,
        growth,
        overall,
        data_completeness: present_fraction * 100.0,
        confidence_score: present_fraction * recency,
        missing_data: missing.iter().map(|m| m.display_name().to_string()).collect(),
        is_stale: age > stale_after,
    }
}

/// Convenience wrapper for a snapshot handed over by a metric source
pub fn score_snapshot(
    snapshot: &CitySnapshot,
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> FeatureSet {
    compute(&snapshot.city, &snapshot.metrics, snapshot.as_of, now, config)
}

/// 1.0 while fresh, then linear decay down to `MIN_RECENCY_FACTOR` over
/// `decay`. Snapshots from the future count as fresh.
pub fn recency_factor(
    age: chrono::Duration,
    stale_after: chrono::Duration,
    decay: chrono::Duration,
) -> f64 {
    if age <= stale_after {
        return 1.0;
    }
    let overdue = (age - stale_after).num_seconds() as f64;
    let window = decay.num_seconds() as f64;
    let progress = if window > 0.0 {
        (overdue / window).min(1.0)
    } else {
        1.0
    };
    1.0 - (1.0 - MIN_RECENCY_FACTOR) * progress
}

impl CompositePart {
    fn of(name: &'static str, score: &Score, weight: f64) -> Self {
        Self {
            name,
            value: score.value,
            weight,
            confidence: score.confidence,
        }
    }
}

/// Weighted mean of the present normalized inputs.
///
/// When some inputs are absent the present ones are rescaled to full
/// weight; below `min_inputs` present inputs the composite is unavailable.
fn composite_score(
    input: &MetricInput,
    config: &ScoringConfig,
    terms: &[(Metric, f64)],
    min_inputs: usize,
    recency: f64,
) -> Score {
    let mut factors: Vec<FactorContribution> = terms
        .iter()
        .map(|&(metric, weight)| {
            let raw = input.usable(metric);
            FactorContribution {
                metric,
                raw,
                points: normalize(metric, raw, &config.bands),
                weight,
                effective_weight: 0.0,
            }
        })
        .collect();

    let total_weight: f64 = factors.iter().map(|f| f.weight).sum();
    let present_weight: f64 = factors
        .iter()
        .filter(|f| f.points.is_some())
        .map(|f| f.weight)
        .sum();
    let present_count = factors.iter().filter(|f| f.points.is_some()).count();

    if present_count < min_inputs.max(1) || present_weight <= 0.0 {
        let components = factors.iter().map(explain::factor_line).collect();
        return Score::new(None, explain::insufficient(&factors, min_inputs), components, 0.0);
    }

    for factor in factors.iter_mut().filter(|f| f.points.is_some()) {
        factor.effective_weight = factor.weight / present_weight;
    }

    let value: f64 = factors
        .iter()
        .filter_map(|f| f.points.map(|p| p * f.effective_weight))
        .sum();
    let coverage = if total_weight > 0.0 {
        present_weight / total_weight
    } else {
        0.0
    };

    Score::new(
        Some(value),
        explain::composite(&factors),
        factors.iter().map(explain::factor_line).collect(),
        coverage * recency,
    )
}

/// Fixed linear combination of the present composites.
///
/// Absent composites are dropped without rescaling the others unless
/// `renormalize` is set, so a partially observed city scores lower.
fn overall_score(parts: &[CompositePart], renormalize: bool) -> Score {
    let total_weight: f64 = parts.iter().map(|p| p.weight).sum();
    let present_weight: f64 = parts
        .iter()
        .filter(|p| p.value.is_some())
        .map(|p| p.weight)
        .sum();

    let divisor = if renormalize { present_weight } else { total_weight };
    let effective = |part: &CompositePart| {
        if divisor > 0.0 {
            part.weight / divisor
        } else {
            0.0
        }
    };

    let components = parts
        .iter()
        .map(|p| explain::part_line(p, effective(p)))
        .collect();

    if parts.iter().all(|p| p.value.is_none()) {
        return Score::new(None, explain::overall(parts), components, 0.0);
    }

    let value: f64 = parts
        .iter()
        .filter_map(|p| p.value.map(|v| v * effective(p)))
        .sum();
    let confidence = if total_weight > 0.0 {
        parts
            .iter()
            .filter(|p| p.value.is_some())
            .map(|p| p.weight * p.confidence)
            .sum::<f64>()
            / total_weight
    } else {
        0.0
    };

    Score::new(Some(value), explain::overall(parts), components, confidence)
}

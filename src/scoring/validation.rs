use super::config::{Band, ScoringConfig};

/// Tolerance when checking that a composite's weights sum to one
const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let w = &config.weights;

    check_weights(
        "scoring.weights.economy",
        &[
            ("gdp_per_capita", w.economy.gdp_per_capita),
            ("unemployment_rate", w.economy.unemployment_rate),
        ],
        &mut errors,
    );
    check_weights(
        "scoring.weights.livability",
        &[
            ("cost_of_living_index", w.livability.cost_of_living_index),
            ("air_quality_index", w.livability.air_quality_index),
            ("population", w.livability.population),
        ],
        &mut errors,
    );
    check_weights(
        "scoring.weights.growth",
        &[
            ("population_growth_rate", w.growth.population_growth_rate),
            ("gdp_growth_rate", w.growth.gdp_growth_rate),
        ],
        &mut errors,
    );
    check_weights(
        "scoring.weights.overall",
        &[
            ("economy", w.overall.economy),
            ("livability", w.overall.livability),
            ("sustainability", w.overall.sustainability),
            ("growth", w.overall.growth),
        ],
        &mut errors,
    );

    if w.livability.min_inputs > 3 {
        errors.push(format!(
            "scoring.weights.livability.min_inputs: must be at most 3, got {}",
            w.livability.min_inputs
        ));
    }

    let b = &config.bands;
    for (name, band) in [
        ("gdp_per_capita", &b.gdp_per_capita),
        ("unemployment_rate", &b.unemployment_rate),
        ("population_growth_rate", &b.population_growth_rate),
        ("gdp_growth_rate", &b.gdp_growth_rate),
        ("cost_of_living_index", &b.cost_of_living_index),
    ] {
        check_band(name, band, &mut errors);
    }

    // AQI breakpoints: strictly ascending AQI, points within 0-100, never rising
    let breakpoints = &b.air_quality_index;
    if breakpoints.len() < 2 {
        errors.push("scoring.bands.air_quality_index: needs at least 2 breakpoints".to_string());
    }
    for (i, bp) in breakpoints.iter().enumerate() {
        if !(0.0..=100.0).contains(&bp.points) {
            errors.push(format!(
                "scoring.bands.air_quality_index[{}].points: must be between 0 and 100, got {}",
                i, bp.points
            ));
        }
    }
    for (i, bp) in breakpoints.iter().enumerate() {
        if !bp.aqi.is_finite() {
            errors.push(format!(
                "scoring.bands.air_quality_index[{}].aqi: must be a finite number, got {}",
                i, bp.aqi
            ));
        }
    }
    for (i, pair) in breakpoints.windows(2).enumerate() {
        if pair[1].aqi <= pair[0].aqi {
            errors.push(format!(
                "scoring.bands.air_quality_index[{}].aqi: must be greater than the previous breakpoint",
                i + 1
            ));
        }
        if pair[1].points > pair[0].points {
            errors.push(format!(
                "scoring.bands.air_quality_index[{}].points: must not exceed the previous breakpoint",
                i + 1
            ));
        }
    }

    for (name, value) in [
        ("ideal", b.population.ideal),
        ("decades_to_zero", b.population.decades_to_zero),
    ] {
        if !value.is_finite() || value <= 0.0 {
            errors.push(format!(
                "scoring.bands.population.{}: must be a positive number, got {}",
                name, value
            ));
        }
    }

    // Validate duration syntax and range
    for (name, value) in [
        ("stale_after", &config.stale_after),
        ("recency_decay", &config.recency_decay),
    ] {
        if let Some(ref s) = value {
            match humantime::parse_duration(s.trim()) {
                Ok(d) => {
                    if chrono::Duration::from_std(d).is_err() {
                        errors.push(format!("scoring.{}: duration '{}' is out of range", name, s));
                    }
                }
                Err(e) => {
                    errors.push(format!("scoring.{}: invalid duration '{}' - {}", name, s, e));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_weights(path: &str, weights: &[(&str, f64)], errors: &mut Vec<String>) {
    let mut sum = 0.0;
    for (name, weight) in weights {
        if !weight.is_finite() || *weight < 0.0 {
            errors.push(format!("{}.{}: must be non-negative", path, name));
        } else {
            sum += weight;
        }
    }
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        errors.push(format!("{}: weights must sum to 1.0, got {:.3}", path, sum));
    }
}

fn check_band(name: &str, band: &Band, errors: &mut Vec<String>) {
    if !band.worst.is_finite() || !band.best.is_finite() {
        errors.push(format!("scoring.bands.{}: bounds must be finite", name));
    } else if band.worst == band.best {
        errors.push(format!(
            "scoring.bands.{}: worst and best must differ (both {})",
            name, band.worst
        ));
    }
}

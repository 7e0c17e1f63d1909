use super::config::{Band, Breakpoint, NormalizationBands, PopulationCurve};
use crate::metrics::Metric;

/// Map a raw value onto 0-100 along a linear band, clamped at both ends
pub fn linear(value: f64, band: &Band) -> f64 {
    let span = band.best - band.worst;
    if span == 0.0 {
        return if value == band.best { 100.0 } else { 0.0 };
    }
    ((value - band.worst) / span * 100.0).clamp(0.0, 100.0)
}

/// Piecewise-linear interpolation over ascending breakpoints.
///
/// Values below the first breakpoint take its points, values above the last
/// take the last one's.
pub fn piecewise(value: f64, breakpoints: &[Breakpoint]) -> f64 {
    let (Some(first), Some(last)) = (breakpoints.first(), breakpoints.last()) else {
        return 0.0;
    };

    if value <= first.aqi {
        return first.points.clamp(0.0, 100.0);
    }
    if value >= last.aqi {
        return last.points.clamp(0.0, 100.0);
    }

    for pair in breakpoints.windows(2) {
        let (lo, hi) = (&pair[0], &pair[1]);
        if value >= lo.aqi && value <= hi.aqi {
            let span = hi.aqi - lo.aqi;
            let t = if span > 0.0 { (value - lo.aqi) / span } else { 0.0 };
            return (lo.points + t * (hi.points - lo.points)).clamp(0.0, 100.0);
        }
    }

    last.points.clamp(0.0, 100.0)
}

/// Inverse-log distance from the ideal size, penalizing both extremes.
/// Populations below one person count as one.
pub fn inverse_log(value: f64, curve: &PopulationCurve) -> f64 {
    let usable = |x: f64| x.is_finite() && x > 0.0;
    if !usable(curve.ideal) || !usable(curve.decades_to_zero) {
        return 0.0;
    }
    let decades = (value.max(1.0) / curve.ideal).log10().abs();
    (100.0 * (1.0 - decades / curve.decades_to_zero)).clamp(0.0, 100.0)
}

/// Normalize one metric to 0-100 points. Absent or non-finite input yields
/// an absent normalized value.
pub fn normalize(metric: Metric, value: Option<f64>, bands: &NormalizationBands) -> Option<f64> {
    let value = value.filter(|v| v.is_finite())?;
    let points = match metric {
        Metric::GdpPerCapita => linear(value, &bands.gdp_per_capita),
        Metric::UnemploymentRate => linear(value, &bands.unemployment_rate),
        Metric::AirQualityIndex => piecewise(value, &bands.air_quality_index),
        Metric::Population => inverse_log(value, &bands.population),
        Metric::PopulationGrowthRate => linear(value, &bands.population_growth_rate),
        Metric::GdpGrowthRate => linear(value, &bands.gdp_growth_rate),
        Metric::CostOfLivingIndex => linear(value, &bands.cost_of_living_index),
    };
    Some(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bands() -> NormalizationBands {
        NormalizationBands::default()
    }

    fn norm(metric: Metric, value: f64) -> f64 {
        normalize(metric, Some(value), &bands()).unwrap()
    }

    #[test]
    fn test_absent_stays_absent() {
        for metric in Metric::ALL {
            assert!(normalize(metric, None, &bands()).is_none());
        }
    }

    #[test]
    fn test_non_finite_treated_as_absent() {
        assert!(normalize(Metric::GdpPerCapita, Some(f64::NAN), &bands()).is_none());
        assert!(normalize(Metric::Population, Some(f64::INFINITY), &bands()).is_none());
    }

    #[test]
    fn test_gdp_linear_and_clamped() {
        assert_eq!(norm(Metric::GdpPerCapita, 0.0), 0.0);
        assert!((norm(Metric::GdpPerCapita, 85_000.0) - 85.0).abs() < 1e-9);
        assert_eq!(norm(Metric::GdpPerCapita, 1_000_000.0), 100.0);
        assert_eq!(norm(Metric::GdpPerCapita, -500.0), 0.0);
    }

    #[test]
    fn test_unemployment_inverted() {
        assert_eq!(norm(Metric::UnemploymentRate, 0.0), 100.0);
        assert!((norm(Metric::UnemploymentRate, 4.2) - 72.0).abs() < 1e-9);
        assert_eq!(norm(Metric::UnemploymentRate, 15.0), 0.0);
        assert_eq!(norm(Metric::UnemploymentRate, 50.0), 0.0);
    }

    #[test]
    fn test_aqi_breakpoints() {
        assert_eq!(norm(Metric::AirQualityIndex, 0.0), 100.0);
        assert!((norm(Metric::AirQualityIndex, 45.0) - 82.0).abs() < 1e-9);
        assert_eq!(norm(Metric::AirQualityIndex, 50.0), 80.0);
        assert_eq!(norm(Metric::AirQualityIndex, 125.0), 50.0);
        assert_eq!(norm(Metric::AirQualityIndex, 300.0), 0.0);
        assert_eq!(norm(Metric::AirQualityIndex, 450.0), 0.0);
        assert_eq!(norm(Metric::AirQualityIndex, -10.0), 100.0);
    }

    #[test]
    fn test_population_prefers_mid_size() {
        assert_eq!(norm(Metric::Population, 2_000_000.0), 100.0);
        let big = norm(Metric::Population, 8_000_000.0);
        let huge = norm(Metric::Population, 40_000_000.0);
        let small = norm(Metric::Population, 20_000.0);
        assert!(big < 100.0 && huge < big);
        assert!(small < 100.0);
        assert_eq!(norm(Metric::Population, -5.0), 0.0);
        assert_eq!(norm(Metric::Population, 1.0e12), 0.0);
    }

    #[test]
    fn test_population_curve_nan_scores_zero() {
        let curve = PopulationCurve {
            ideal: f64::NAN,
            decades_to_zero: 3.0,
        };
        assert_eq!(inverse_log(2_000_000.0, &curve), 0.0);
    }

    #[test]
    fn test_growth_bands() {
        assert_eq!(norm(Metric::PopulationGrowthRate, -1.0), 0.0);
        assert!((norm(Metric::PopulationGrowthRate, 1.1) - 70.0).abs() < 1e-9);
        assert_eq!(norm(Metric::PopulationGrowthRate, 9.0), 100.0);
        assert!((norm(Metric::GdpGrowthRate, 3.0) - 62.5).abs() < 1e-9);
        assert_eq!(norm(Metric::GdpGrowthRate, -8.0), 0.0);
    }

    #[test]
    fn test_cost_of_living_inverted() {
        assert_eq!(norm(Metric::CostOfLivingIndex, 50.0), 100.0);
        assert!((norm(Metric::CostOfLivingIndex, 158.0) - 46.0).abs() < 1e-9);
        assert_eq!(norm(Metric::CostOfLivingIndex, 250.0), 0.0);
        assert_eq!(norm(Metric::CostOfLivingIndex, 20.0), 100.0);
    }

    #[test]
    fn test_monotonic_in_documented_direction() {
        let higher_better = [
            Metric::GdpPerCapita,
            Metric::PopulationGrowthRate,
            Metric::GdpGrowthRate,
        ];
        let lower_better = [
            Metric::UnemploymentRate,
            Metric::AirQualityIndex,
            Metric::CostOfLivingIndex,
        ];
        let samples: Vec<f64> = (-20..=400).map(|i| i as f64 * 2.5).collect();

        for metric in higher_better {
            for pair in samples.windows(2) {
                let (a, b) = (norm(metric, pair[0]), norm(metric, pair[1]));
                assert!(a <= b, "{} not increasing at {}", metric, pair[0]);
                assert!((0.0..=100.0).contains(&b));
            }
        }
        for metric in lower_better {
            for pair in samples.windows(2) {
                let (a, b) = (norm(metric, pair[0]), norm(metric, pair[1]));
                assert!(a >= b, "{} not decreasing at {}", metric, pair[0]);
                assert!((0.0..=100.0).contains(&b));
            }
        }
    }

    #[test]
    fn test_degenerate_band() {
        let band = Band {
            worst: 5.0,
            best: 5.0,
        };
        assert_eq!(linear(5.0, &band), 100.0);
        assert_eq!(linear(4.0, &band), 0.0);
    }
}

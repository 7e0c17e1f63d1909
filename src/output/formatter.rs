use chrono::{DateTime, Duration, Utc};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::scoring::{FeatureSet, Score, Tier};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format an optional score value: "77.2", or "--" when unavailable
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "--".to_string(),
    }
}

/// Tier label, colored by band when colors are enabled
pub fn format_tier(tier: Tier, use_colors: bool) -> String {
    let label = tier.as_str();
    if !use_colors {
        return label.to_string();
    }
    match tier {
        Tier::Excellent => label.green().bold().to_string(),
        Tier::Good => label.green().to_string(),
        Tier::Average => label.yellow().to_string(),
        Tier::BelowAverage => label.magenta().to_string(),
        Tier::Poor => label.red().to_string(),
        Tier::Unavailable => label.dimmed().to_string(),
    }
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format ranked cities as a table with columns:
/// Index, Overall, Tier, City, Completeness, Stale marker.
/// No headers; the index column is right-aligned with a trailing dot.
pub fn format_ranked_table(feature_sets: &[FeatureSet], use_colors: bool) -> String {
    if feature_sets.is_empty() {
        return "No cities found.".to_string();
    }

    let term_width = get_terminal_width();

    // Index "99." (3) + space, overall (5), tier (13), completeness "100%" (4), stale marker (7)
    let score_width = 5;
    let tier_width = 13;
    let separator = "  ";
    let fixed_width = 4 + score_width + tier_width + 4 + 7 + separator.len() * 4;

    feature_sets
        .iter()
        .enumerate()
        .map(|(idx, features)| {
            let index_str = format!("{:>2}.", idx + 1);
            let score_str = format!(
                "{:>width$}",
                format_value(features.overall.value),
                width = score_width
            );
            // Pad before coloring so ANSI codes don't break alignment
            let tier_padded = format!("{:<width$}", features.overall.tier.as_str(), width = tier_width);
            let completeness = format!("{:>3.0}%", features.data_completeness);

            let name = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_name(&features.city_name, width - fixed_width)
                }
                Some(_) => truncate_name(&features.city_name, 20),
                None => features.city_name.clone(),
            };
            let stale = if features.is_stale { "stale" } else { "" };

            if use_colors {
                let tier_colored = format_tier(features.overall.tier, true)
                    .replace(features.overall.tier.as_str(), &tier_padded);
                format!(
                    "{} {}{}{}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    score_str.bold(),
                    separator,
                    tier_colored,
                    separator,
                    completeness.dimmed(),
                    separator,
                    name,
                    separator,
                    stale.red()
                )
                .trim_end()
                .to_string()
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}{}{}",
                    index_str,
                    score_str,
                    separator,
                    tier_padded,
                    separator,
                    completeness,
                    separator,
                    name,
                    separator,
                    stale
                )
                .trim_end()
                .to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_score_block(label: &str, score: &Score, use_colors: bool) -> String {
    let mut lines = vec![format!(
        "  {:<15} {:>5}  {}  (confidence {:.2})",
        format!("{}:", label),
        format_value(score.value),
        format_tier(score.tier, use_colors),
        score.confidence
    )];
    lines.push(format!("      {}", score.explanation));
    for component in &score.components {
        lines.push(format!("      - {}", component));
    }
    lines.join("\n")
}

/// Format one city with every score, explanation and component breakdown
pub fn format_city_detail(features: &FeatureSet, now: DateTime<Utc>, use_colors: bool) -> String {
    let age = format_age(now - features.computation_date);
    let header = if use_colors {
        format!(
            "{} ({})",
            features.city_name.bold(),
            features.city_slug.cyan()
        )
    } else {
        format!("{} ({})", features.city_name, features.city_slug)
    };

    let stale_note = if features.is_stale {
        if use_colors {
            format!(" {}", "[stale]".red())
        } else {
            " [stale]".to_string()
        }
    } else {
        String::new()
    };

    let mut sections = vec![
        header,
        format!(
            "  As of: {} ({} ago){}",
            features.computation_date.format("%Y-%m-%d %H:%M UTC"),
            age,
            stale_note
        ),
        format!(
            "  Completeness: {:.0}%  Confidence: {:.2}",
            features.data_completeness, features.confidence_score
        ),
    ];
    if !features.missing_data.is_empty() {
        sections.push(format!("  Missing: {}", features.missing_data.join(", ")));
    }
    sections.push(String::new());

    for (label, score) in [
        ("Overall", &features.overall),
        ("Economy", &features.economy),
        ("Livability", &features.livability),
        ("Sustainability", &features.sustainability),
        ("Growth", &features.growth),
    ] {
        sections.push(format_score_block(label, score, use_colors));
    }

    sections.join("\n")
}

/// Format feature sets as tab-separated values for scripting
/// Columns: slug, name, overall, economy, livability, sustainability, growth,
/// completeness, stale (no headers, no colors; unavailable scores are empty)
pub fn format_tsv(feature_sets: &[FeatureSet]) -> String {
    if feature_sets.is_empty() {
        return String::new();
    }

    let cell = |v: Option<f64>| v.map(|x| format!("{:.1}", x)).unwrap_or_default();

    feature_sets
        .iter()
        .map(|f| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.0}\t{}",
                f.city_slug,
                f.city_name,
                cell(f.overall.value),
                cell(f.economy.value),
                cell(f.livability.value),
                cell(f.sustainability.value),
                cell(f.growth.value),
                f.data_completeness,
                f.is_stale
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty JSON array using the dashboard's field names
pub fn format_json(feature_sets: &[FeatureSet]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(feature_sets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{City, MetricInput};
    use crate::scoring::{compute, ScoringConfig};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn sample(slug: &str, name: &str, input: MetricInput, hours_old: i64) -> FeatureSet {
        compute(
            &City {
                slug: slug.to_string(),
                name: name.to_string(),
            },
            &input,
            now() - Duration::hours(hours_old),
            now(),
            &ScoringConfig::default(),
        )
    }

    fn favorable() -> MetricInput {
        MetricInput {
            gdp_per_capita: Some(85_000.0),
            unemployment_rate: Some(4.2),
            air_quality_index: Some(45.0),
            population: Some(8_000_000.0),
            population_growth_rate: Some(1.1),
            gdp_growth_rate: Some(3.0),
            cost_of_living_index: Some(158.0),
        }
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(77.24)), "77.2");
        assert_eq!(format_value(None), "--");
    }

    #[test]
    fn test_format_tier_plain() {
        assert_eq!(format_tier(Tier::BelowAverage, false), "below-average");
    }

    #[test]
    fn test_ranked_table_empty() {
        assert_eq!(format_ranked_table(&[], false), "No cities found.");
    }

    #[test]
    fn test_ranked_table_rows() {
        let rows = vec![
            sample("new-york", "New York", favorable(), 1),
            sample("nowhere", "Nowhere", MetricInput::default(), 48),
        ];
        let table = format_ranked_table(&rows, false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 1."));
        assert!(lines[0].contains("good"));
        assert!(lines[0].contains("100%"));
        assert!(lines[0].contains("New York"));
        assert!(!lines[0].ends_with("stale"));
        assert!(lines[1].contains("--"));
        assert!(lines[1].contains("unavailable"));
        assert!(lines[1].ends_with("stale"));
    }

    #[test]
    fn test_city_detail() {
        let features = sample("new-york", "New York", favorable(), 5);
        let detail = format_city_detail(&features, now(), false);
        assert!(detail.starts_with("New York (new-york)"));
        assert!(detail.contains("As of: 2026-10-18 07:00 UTC (5h ago)"));
        assert!(detail.contains("Completeness: 100%"));
        assert!(!detail.contains("Missing:"));
        assert!(detail.contains("Economy:"));
        assert!(detail.contains("- GDP per capita: $85K -> 85.0 pts x 0.40 = 34.0"));
    }

    #[test]
    fn test_city_detail_lists_missing_and_stale() {
        let input = MetricInput {
            air_quality_index: Some(45.0),
            ..Default::default()
        };
        let features = sample("smallville", "Smallville", input, 72);
        let detail = format_city_detail(&features, now(), false);
        assert!(detail.contains("[stale]"));
        assert!(detail.contains("Missing: GDP per capita, Unemployment rate"));
    }

    #[test]
    fn test_format_tsv() {
        let rows = vec![sample("nowhere", "Nowhere", MetricInput::default(), 1)];
        assert_eq!(format_tsv(&rows), "nowhere\tNowhere\t\t\t\t\t\t0\tfalse");
        assert_eq!(format_tsv(&[]), "");
    }

    #[test]
    fn test_format_json_array() {
        let rows = vec![sample("new-york", "New York", favorable(), 1)];
        let json = format_json(&rows).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["citySlug"], "new-york");
        assert_eq!(parsed[0]["isStale"], false);
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::minutes(30)), "30m");
        assert_eq!(format_age(Duration::hours(5)), "5h");
        assert_eq!(format_age(Duration::days(3)), "3d");
        assert_eq!(format_age(Duration::days(14)), "2w");
        assert_eq!(format_age(Duration::seconds(10)), "now");
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Short", 10), "Short");
        assert_eq!(truncate_name("A very long city name", 10), "A very ...");
        assert_eq!(truncate_name("Zürich-Altstetten", 4), "Z...");
    }
}

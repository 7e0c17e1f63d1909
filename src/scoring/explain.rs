use super::engine::{CompositePart, FactorContribution};

/// Minimum point spread between the best and worst factor for the
/// explanation to say one "offsets" the other
const OFFSET_SPREAD: f64 = 20.0;

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// "low unemployment (4.2%)"
fn phrase(factor: &FactorContribution) -> String {
    let points = factor.points.unwrap_or(0.0);
    let raw = factor
        .raw
        .map(|v| factor.metric.format_raw(v))
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "{} {} ({})",
        factor.metric.describe(points),
        factor.metric.phrase_label(),
        raw
    )
}

/// Summary naming the dominant factor(s) of a scored composite
pub fn composite(factors: &[FactorContribution]) -> String {
    let mut present: Vec<&FactorContribution> =
        factors.iter().filter(|f| f.points.is_some()).collect();
    // Stable sort: ties keep formula order
    present.sort_by(|a, b| {
        b.points
            .unwrap_or(0.0)
            .partial_cmp(&a.points.unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    match present.as_slice() {
        [] => "Insufficient data".to_string(),
        [only] => {
            let mut text = capitalize(&phrase(only));
            if factors.len() > 1 {
                text.push_str(" (only factor available)");
            }
            text
        }
        [top, .., bottom] => {
            let spread = top.points.unwrap_or(0.0) - bottom.points.unwrap_or(0.0);
            if spread >= OFFSET_SPREAD {
                format!("{} offset by {}", capitalize(&phrase(top)), phrase(bottom))
            } else {
                format!("{} and {}", capitalize(&phrase(top)), phrase(bottom))
            }
        }
    }
}

/// Explanation for a composite that could not be scored
pub fn insufficient(factors: &[FactorContribution], min_inputs: usize) -> String {
    let missing: Vec<&str> = factors
        .iter()
        .filter(|f| f.points.is_none())
        .map(|f| f.metric.display_name())
        .collect();

    if missing.is_empty() {
        "Insufficient data: available inputs carry no weight".to_string()
    } else if min_inputs > 1 && factors.len() > 1 {
        format!(
            "Insufficient data: needs {} of {} inputs, missing {}",
            min_inputs,
            factors.len(),
            missing.join(", ")
        )
    } else {
        format!("Insufficient data: missing {}", missing.join(", "))
    }
}

/// "GDP per capita: $85K -> 85.0 pts x 0.40 = 34.0"
pub fn factor_line(factor: &FactorContribution) -> String {
    match (factor.raw, factor.points) {
        (Some(raw), Some(points)) => format!(
            "{}: {} -> {:.1} pts x {:.2} = {:.1}",
            factor.metric.display_name(),
            factor.metric.format_raw(raw),
            points,
            factor.effective_weight,
            points * factor.effective_weight
        ),
        _ => format!("{}: missing", factor.metric.display_name()),
    }
}

/// Summary of the overall score: strongest and weakest area, plus what was left out
pub fn overall(parts: &[CompositePart]) -> String {
    let mut present: Vec<&CompositePart> = parts.iter().filter(|p| p.value.is_some()).collect();
    present.sort_by(|a, b| {
        b.value
            .unwrap_or(0.0)
            .partial_cmp(&a.value.unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let unavailable: Vec<&str> = parts
        .iter()
        .filter(|p| p.value.is_none())
        .map(|p| p.name)
        .collect();

    let mut text = match present.as_slice() {
        [] => return "No composite scores available".to_string(),
        [only] => format!("Based on {} ({:.0}) only", only.name, only.value.unwrap_or(0.0)),
        [top, .., bottom] => format!(
            "Led by {} ({:.0}); weakest area is {} ({:.0})",
            top.name,
            top.value.unwrap_or(0.0),
            bottom.name,
            bottom.value.unwrap_or(0.0)
        ),
    };

    if !unavailable.is_empty() {
        text.push_str(&format!("; {} unavailable", unavailable.join(", ")));
    }
    text
}

/// "Economy: 77.2 x 0.30 = 23.2"
pub fn part_line(part: &CompositePart, effective_weight: f64) -> String {
    match part.value {
        Some(value) => format!(
            "{}: {:.1} x {:.2} = {:.1}",
            capitalize(part.name),
            value,
            effective_weight,
            value * effective_weight
        ),
        None => format!("{}: unavailable", capitalize(part.name)),
    }
}

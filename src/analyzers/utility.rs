/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rounds to the nearest integer, halves away from zero (89.5 -> 90).
pub fn round_grade(value: f64) -> f64 {
    // `+ 0.0` turns -0.0 into 0.0
    value.round() + 0.0
}

/// Formats a value as a whole number after [`round_grade`].
pub fn format_grade(value: f64) -> String {
    format!("{:.0}", round_grade(value))
}

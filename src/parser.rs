//! Cell parser for gradebook values.

use serde::Serialize;

/// Literal recorded for a failed or absent assessment. Counts as 0.
pub const ZERO_CREDIT_MARKER: &str = "н";

/// Literal recorded when an assessment did not take place for the student.
pub const NOT_APPLICABLE_MARKER: &str = "н.п.";

/// Parsed meaning of a single gradebook cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GradeValue {
    Numeric(f64),
    Excluded,
}

impl GradeValue {
    /// Returns the numeric value, if the cell takes part in averaging.
    pub fn numeric(self) -> Option<f64> {
        match self {
            GradeValue::Numeric(v) => Some(v),
            GradeValue::Excluded => None,
        }
    }
}

/// Parses raw cell text into a [`GradeValue`].
///
/// Never fails: anything that is neither a finite number nor the zero-credit
/// marker degrades to [`GradeValue::Excluded`].
pub fn parse_grade(raw: &str) -> GradeValue {
    let s = raw.trim();

    if s.is_empty() || s.to_lowercase() == NOT_APPLICABLE_MARKER {
        return GradeValue::Excluded;
    }

    if s.to_lowercase() == ZERO_CREDIT_MARKER {
        return GradeValue::Numeric(0.0);
    }

    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => GradeValue::Numeric(v),
        _ => GradeValue::Excluded,
    }
}

/// True when a cell holds nothing but whitespace, i.e. it is a gap to fill.
pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

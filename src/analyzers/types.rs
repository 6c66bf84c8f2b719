//! Data types used by the grading pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Weights;
use crate::gradebook::Row;
use crate::parser::{GradeValue, parse_grade};
use crate::schema::{Component, Layout};

/// Parsed weekly cells of one component row.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentGrades {
    pub period1_weeks: Vec<GradeValue>,
    pub period2_weeks: Vec<GradeValue>,
}

/// Missing trailing cells parse as [`GradeValue::Excluded`].
fn cell(row: &Row, column: usize) -> GradeValue {
    parse_grade(row.get(column).map_or("", String::as_str))
}

impl ComponentGrades {
    pub fn from_row(row: &Row, layout: &Layout) -> Self {
        Self {
            period1_weeks: layout.period1_weeks.iter().map(|&c| cell(row, c)).collect(),
            period2_weeks: layout.period2_weeks.iter().map(|&c| cell(row, c)).collect(),
        }
    }
}

/// Parsed exam cells, taken from the exam-source row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExamGrades {
    pub midterm1: GradeValue,
    pub midterm2: GradeValue,
    pub final_exam: GradeValue,
}

impl ExamGrades {
    pub fn from_row(row: &Row, layout: &Layout) -> Self {
        Self {
            midterm1: cell(row, layout.midterm1_exam),
            midterm2: cell(row, layout.midterm2_exam),
            final_exam: cell(row, layout.final_exam),
        }
    }
}

/// One period's average for each component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentAverages {
    pub lecture: f64,
    pub practice: f64,
    pub srsp: f64,
}

impl ComponentAverages {
    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::Lecture => self.lecture,
            Component::Practice => self.practice,
            Component::Srsp => self.srsp,
        }
    }
}

/// Scores for one half of the term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodScores {
    pub averages: ComponentAverages,
    pub weighted_total: f64,
    /// `None` when the midterm was marked not applicable.
    pub midterm_exam: Option<f64>,
    pub composite: f64,
}

/// Every intermediate and final value of a grading run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeReport {
    pub generated_at: DateTime<Utc>,
    pub weights: Weights,
    pub period1: PeriodScores,
    pub period2: PeriodScores,
    pub unrounded_admission_rating: f64,
    pub admission_rating: f64,
    pub admitted: bool,
    /// `None` when the final exam was marked not applicable.
    pub final_exam: Option<f64>,
    pub unrounded_final_grade: f64,
    pub final_grade: f64,
    pub letter_grade: String,
}

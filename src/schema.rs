//! Named column layout of the gradebook.
//!
//! Every column the pipeline reads or writes is addressed through a
//! [`Layout`] field instead of a bare index. The layout is validated once,
//! before any row is touched.

use serde::Serialize;
use std::collections::HashSet;

use crate::error::GradebookError;

pub const WEEKS_PERIOD_1: usize = 7;
pub const WEEKS_PERIOD_2: usize = 8;

/// Reference-dataset labels for the exam slots.
pub const MIDTERM_1_LABEL: &str = "РК1";
pub const MIDTERM_2_LABEL: &str = "РК2";
pub const FINAL_EXAM_LABEL: &str = "ИК";

/// One of the three rows blended into a period total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Component {
    Lecture,
    Practice,
    Srsp,
}

impl Component {
    pub const ALL: [Component; 3] = [Component::Lecture, Component::Practice, Component::Srsp];

    /// The row whose midterm and final-exam cells are graded.
    pub const EXAM_SOURCE: Component = Component::Lecture;

    /// Row label as written in column 0 of the gradebook.
    pub fn label(self) -> &'static str {
        match self {
            Component::Lecture => "Лекция",
            Component::Practice => "Практика",
            Component::Srsp => "СРСП",
        }
    }

    /// Prefix of this component's weekly columns in the reference dataset.
    pub fn prefix(self) -> &'static str {
        match self {
            Component::Lecture => "Л",
            Component::Practice => "П",
            Component::Srsp => "С",
        }
    }

    /// Trimmed, case-insensitive label comparison.
    pub fn matches(self, label: &str) -> bool {
        label.trim().to_lowercase() == self.label().to_lowercase()
    }

    /// Reference label of a weekly cell, e.g. `Л3` or `С12`.
    pub fn week_label(self, week: usize) -> String {
        format!("{}{}", self.prefix(), week)
    }
}

/// What kind of value an input cell holds; selects the fallback fill constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CellRole {
    Weekly,
    Midterm,
    FinalExam,
}

/// An input cell of a component row, with its semantic label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputCell {
    pub column: usize,
    pub role: CellRole,
    pub label: String,
}

/// Column positions of every field in a gradebook row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub label: usize,
    pub period1_weeks: Vec<usize>,
    pub period1_average: usize,
    pub period1_total: usize,
    pub midterm1_exam: usize,
    pub midterm1_composite: usize,
    pub period2_weeks: Vec<usize>,
    pub period2_average: usize,
    pub period2_total: usize,
    pub midterm2_exam: usize,
    pub midterm2_composite: usize,
    pub admission_rating: usize,
    pub final_exam: usize,
    pub final_grade: usize,
    pub letter_grade: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self::standard()
    }
}

impl Layout {
    /// The 28-column gradebook layout.
    ///
    /// | Column | Field                      |
    /// |--------|----------------------------|
    /// | 0      | label                      |
    /// | 1–7    | period-1 weeks 1–7         |
    /// | 8      | period-1 component average |
    /// | 9      | period-1 weighted total    |
    /// | 10     | midterm-1 exam             |
    /// | 11     | midterm-1 composite        |
    /// | 12–19  | period-2 weeks 8–15        |
    /// | 20     | period-2 component average |
    /// | 21     | period-2 weighted total    |
    /// | 22     | midterm-2 exam             |
    /// | 23     | midterm-2 composite        |
    /// | 24     | admission rating           |
    /// | 25     | final exam                 |
    /// | 26     | final grade                |
    /// | 27     | letter grade               |
    pub fn standard() -> Self {
        Self {
            label: 0,
            period1_weeks: (1..=7).collect(),
            period1_average: 8,
            period1_total: 9,
            midterm1_exam: 10,
            midterm1_composite: 11,
            period2_weeks: (12..=19).collect(),
            period2_average: 20,
            period2_total: 21,
            midterm2_exam: 22,
            midterm2_composite: 23,
            admission_rating: 24,
            final_exam: 25,
            final_grade: 26,
            letter_grade: 27,
        }
    }

    fn all_columns(&self) -> Vec<usize> {
        let mut columns = vec![self.label];
        columns.extend(&self.period1_weeks);
        columns.extend([
            self.period1_average,
            self.period1_total,
            self.midterm1_exam,
            self.midterm1_composite,
        ]);
        columns.extend(&self.period2_weeks);
        columns.extend([
            self.period2_average,
            self.period2_total,
            self.midterm2_exam,
            self.midterm2_composite,
            self.admission_rating,
            self.final_exam,
            self.final_grade,
            self.letter_grade,
        ]);
        columns
    }

    /// Checks week counts and that no two fields share a column.
    pub fn validate(&self) -> Result<(), GradebookError> {
        if self.period1_weeks.len() != WEEKS_PERIOD_1 {
            return Err(GradebookError::InvalidLayout(format!(
                "period 1 needs {} weekly columns, got {}",
                WEEKS_PERIOD_1,
                self.period1_weeks.len()
            )));
        }
        if self.period2_weeks.len() != WEEKS_PERIOD_2 {
            return Err(GradebookError::InvalidLayout(format!(
                "period 2 needs {} weekly columns, got {}",
                WEEKS_PERIOD_2,
                self.period2_weeks.len()
            )));
        }

        let mut seen = HashSet::new();
        for column in self.all_columns() {
            if !seen.insert(column) {
                return Err(GradebookError::InvalidLayout(format!(
                    "column {} is assigned to more than one field",
                    column
                )));
            }
        }

        Ok(())
    }

    /// Number of fields every row must have after padding.
    pub fn min_columns(&self) -> usize {
        self.all_columns().into_iter().max().map_or(0, |max| max + 1)
    }

    /// Cells of a component row that the aggregator reads, in layout order.
    ///
    /// Exam cells are read only from [`Component::EXAM_SOURCE`]; the other
    /// rows contribute their weekly cells alone.
    pub fn input_cells(&self, component: Component) -> Vec<InputCell> {
        let with_exams = component == Component::EXAM_SOURCE;
        let mut cells = Vec::with_capacity(WEEKS_PERIOD_1 + WEEKS_PERIOD_2 + 3);

        for (i, &column) in self.period1_weeks.iter().enumerate() {
            cells.push(InputCell {
                column,
                role: CellRole::Weekly,
                label: component.week_label(i + 1),
            });
        }
        if with_exams {
            cells.push(InputCell {
                column: self.midterm1_exam,
                role: CellRole::Midterm,
                label: MIDTERM_1_LABEL.to_string(),
            });
        }

        for (i, &column) in self.period2_weeks.iter().enumerate() {
            cells.push(InputCell {
                column,
                role: CellRole::Weekly,
                label: component.week_label(WEEKS_PERIOD_1 + i + 1),
            });
        }
        if with_exams {
            cells.push(InputCell {
                column: self.midterm2_exam,
                role: CellRole::Midterm,
                label: MIDTERM_2_LABEL.to_string(),
            });
            cells.push(InputCell {
                column: self.final_exam,
                role: CellRole::FinalExam,
                label: FINAL_EXAM_LABEL.to_string(),
            });
        }

        cells
    }
}

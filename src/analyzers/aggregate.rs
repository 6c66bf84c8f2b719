use crate::analyzers::grade::letter_grade;
use crate::analyzers::types::{
    ComponentAverages, ComponentGrades, ExamGrades, GradeReport, PeriodScores,
};
use crate::analyzers::utility::{format_grade, mean, round_grade};
use crate::config::{FinalBlend, GradingConfig, Weights};
use crate::error::GradebookError;
use crate::gradebook::Gradebook;
use crate::parser::GradeValue;
use crate::schema::{Component, Layout};
use chrono::Utc;
use tracing::debug;

/// Mean over numeric cells; excluded cells count in neither sum nor count.
/// A period with no numeric cell averages 0.
pub fn period_average(cells: &[GradeValue]) -> f64 {
    let values: Vec<f64> = cells.iter().filter_map(|c| c.numeric()).collect();
    mean(&values)
}

pub fn weighted_total(averages: &ComponentAverages, weights: &Weights) -> f64 {
    averages.lecture * weights.lecture
        + averages.practice * weights.practice
        + averages.srsp * weights.srsp
}

/// Mean of the period total and the midterm exam. A not-applicable midterm
/// drops out, leaving the period total alone.
pub fn midterm_composite(weighted_total: f64, midterm_exam: Option<f64>) -> f64 {
    match midterm_exam {
        Some(exam) => (weighted_total + exam) / 2.0,
        None => weighted_total,
    }
}

pub fn admission_rating(composite1: f64, composite2: f64) -> f64 {
    (composite1 + composite2) / 2.0
}

/// Blends the final exam with the admission rating. A not-applicable final
/// exam drops out and the whole weight moves onto the admission rating.
pub fn final_grade(final_exam: Option<f64>, admission_rating: f64, blend: &FinalBlend) -> f64 {
    match final_exam {
        Some(exam) => exam * blend.final_exam + admission_rating * blend.admission,
        None => admission_rating,
    }
}

fn period_scores(
    averages: ComponentAverages,
    midterm_exam: GradeValue,
    weights: &Weights,
) -> PeriodScores {
    let weighted_total = weighted_total(&averages, weights);
    let midterm_exam = midterm_exam.numeric();

    PeriodScores {
        averages,
        weighted_total,
        midterm_exam,
        composite: midterm_composite(weighted_total, midterm_exam),
    }
}

/// Runs the full cascade from weekly cells to a letter grade.
///
/// The admission rating is rounded before it enters the final blend, and
/// the letter is assigned from the rounded final grade.
pub fn aggregate(
    lecture: &ComponentGrades,
    practice: &ComponentGrades,
    srsp: &ComponentGrades,
    exams: &ExamGrades,
    config: &GradingConfig,
) -> GradeReport {
    let weights = &config.weights;

    let period1 = period_scores(
        ComponentAverages {
            lecture: period_average(&lecture.period1_weeks),
            practice: period_average(&practice.period1_weeks),
            srsp: period_average(&srsp.period1_weeks),
        },
        exams.midterm1,
        weights,
    );

    let period2 = period_scores(
        ComponentAverages {
            lecture: period_average(&lecture.period2_weeks),
            practice: period_average(&practice.period2_weeks),
            srsp: period_average(&srsp.period2_weeks),
        },
        exams.midterm2,
        weights,
    );

    let unrounded_admission_rating = admission_rating(period1.composite, period2.composite);
    let admission_rating = round_grade(unrounded_admission_rating);

    let final_exam = exams.final_exam.numeric();
    let unrounded_final_grade = final_grade(final_exam, admission_rating, &config.final_blend);
    let final_grade = round_grade(unrounded_final_grade);

    debug!(
        period1_total = period1.weighted_total,
        period2_total = period2.weighted_total,
        unrounded_admission_rating,
        unrounded_final_grade,
        "Aggregation complete"
    );

    GradeReport {
        generated_at: Utc::now(),
        weights: *weights,
        period1,
        period2,
        unrounded_admission_rating,
        admission_rating,
        admitted: admission_rating >= config.admission_threshold,
        final_exam,
        unrounded_final_grade,
        final_grade,
        letter_grade: letter_grade(final_grade),
    }
}

/// Grades a gap-filled gradebook. Exam cells come from the
/// [`Component::EXAM_SOURCE`] row.
pub fn grade_gradebook(
    book: &Gradebook,
    layout: &Layout,
    config: &GradingConfig,
) -> Result<GradeReport, GradebookError> {
    let grades = |component: Component| -> Result<ComponentGrades, GradebookError> {
        let row = book.component_row(component, layout)?;
        Ok(ComponentGrades::from_row(row, layout))
    };

    let lecture = grades(Component::Lecture)?;
    let practice = grades(Component::Practice)?;
    let srsp = grades(Component::Srsp)?;
    let exam_row = book.component_row(Component::EXAM_SOURCE, layout)?;
    let exams = ExamGrades::from_row(exam_row, layout);

    Ok(aggregate(&lecture, &practice, &srsp, &exams, config))
}

/// Returns a copy of `book` with the summary columns of each component row
/// set from `report`.
pub fn annotate_gradebook(
    book: &Gradebook,
    layout: &Layout,
    report: &GradeReport,
) -> Result<Gradebook, GradebookError> {
    let mut annotated = book.clone();

    for component in Component::ALL {
        let index = book.component_index(component, layout)?;
        let row = &mut annotated.rows[index];
        if row.len() < layout.min_columns() {
            row.resize(layout.min_columns(), String::new());
        }

        let cells = [
            (
                layout.period1_average,
                format_grade(report.period1.averages.get(component)),
            ),
            (layout.period1_total, format_grade(report.period1.weighted_total)),
            (layout.midterm1_composite, format_grade(report.period1.composite)),
            (
                layout.period2_average,
                format_grade(report.period2.averages.get(component)),
            ),
            (layout.period2_total, format_grade(report.period2.weighted_total)),
            (layout.midterm2_composite, format_grade(report.period2.composite)),
            (layout.admission_rating, format_grade(report.admission_rating)),
            (layout.final_grade, format_grade(report.final_grade)),
            (layout.letter_grade, report.letter_grade.clone()),
        ];

        for (column, value) in cells {
            row[column] = value;
        }
    }

    Ok(annotated)
}

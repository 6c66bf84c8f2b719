//! Output formatting and persistence for grade reports.
//!
//! Supports a plain-text summary, JSON serialization, and atomic CSV writes.

use anyhow::{Context, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::reference::ReferenceAverages;
use crate::analyzers::types::{GradeReport, PeriodScores};
use crate::gradebook::Gradebook;
use crate::parser::NOT_APPLICABLE_MARKER;

/// Logs the report as pretty-printed JSON.
pub fn print_json(report: &GradeReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Prints the human-readable breakdown to stdout.
pub fn print_summary(report: &GradeReport) {
    print!("{}", render_summary(report));
}

fn exam_text(exam: Option<f64>) -> String {
    exam.map_or_else(|| NOT_APPLICABLE_MARKER.to_string(), |v| format!("{v:.2}"))
}

fn render_period(out: &mut String, n: u8, period: &PeriodScores, weights: &str) {
    let a = &period.averages;
    let _ = writeln!(out, "Period {n} lecture average:   {:.2}", a.lecture);
    let _ = writeln!(out, "Period {n} practice average:  {:.2}", a.practice);
    let _ = writeln!(out, "Period {n} SRSP average:      {:.2}", a.srsp);
    let _ = writeln!(
        out,
        "Period {n} weighted total ({weights}): {:.2}",
        period.weighted_total
    );
    let _ = writeln!(
        out,
        "Midterm {n} exam:             {}",
        exam_text(period.midterm_exam)
    );
    match period.midterm_exam {
        Some(exam) => {
            let _ = writeln!(
                out,
                "Midterm {n} composite: ({:.2} + {:.2}) / 2 = {:.2}",
                period.weighted_total, exam, period.composite
            );
        }
        None => {
            let _ = writeln!(out, "Midterm {n} composite:        {:.2}", period.composite);
        }
    }
}

/// Formats every intermediate and final value of `report`.
pub fn render_summary(report: &GradeReport) -> String {
    let w = &report.weights;
    let weights = format!(
        "{:.0}/{:.0}/{:.0}",
        w.lecture * 100.0,
        w.practice * 100.0,
        w.srsp * 100.0
    );
    let rule = "=".repeat(47);

    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "     FINAL GRADE REPORT");
    let _ = writeln!(out, "{rule}");
    render_period(&mut out, 1, &report.period1, &weights);
    let _ = writeln!(out, "{rule}");
    render_period(&mut out, 2, &report.period2, &weights);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "Admission rating (unrounded): {:.2}",
        report.unrounded_admission_rating
    );
    let _ = writeln!(
        out,
        "Admission rating:             {:.0} ({})",
        report.admission_rating,
        if report.admitted {
            "admitted"
        } else {
            "not admitted"
        }
    );
    let _ = writeln!(
        out,
        "Final exam:                   {}",
        exam_text(report.final_exam)
    );
    let _ = writeln!(
        out,
        "Final grade (unrounded):      {:.2}",
        report.unrounded_final_grade
    );
    let _ = writeln!(out, "FINAL GRADE:                  {:.0}", report.final_grade);
    let _ = writeln!(out, "LETTER GRADE:                 {}", report.letter_grade);
    out
}

/// One `label = value` line per reference column.
pub fn render_averages(averages: &ReferenceAverages) -> String {
    let mut out = String::new();
    for (label, value) in averages.iter() {
        let _ = writeln!(out, "{label} = {value:.2}");
    }
    out
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "gradebook.csv".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes header and rows to `path` without quoting.
///
/// The data goes to a temporary sibling file first and is renamed over
/// `path` only once fully written, so a failed run leaves no partial output.
pub fn write_gradebook(path: &Path, book: &Gradebook) -> Result<()> {
    let tmp = temp_sibling(path);
    debug!(path = %path.display(), tmp = %tmp.display(), "Writing gradebook");

    let result = (|| -> Result<()> {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .from_path(&tmp)?;

        writer.write_record(&book.header)?;
        for row in &book.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(e.context(format!("failed to write '{}'", tmp.display())));
    }

    fs::rename(&tmp, path).with_context(|| {
        format!(
            "failed to move '{}' to '{}'",
            tmp.display(),
            path.display()
        )
    })?;

    info!(path = %path.display(), rows = book.rows.len(), "Gradebook written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::aggregate::aggregate;
    use crate::analyzers::types::{ComponentGrades, ExamGrades};
    use crate::config::GradingConfig;
    use crate::parser::GradeValue;
    use std::env;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn report_with(exams: ExamGrades) -> GradeReport {
        let grades = ComponentGrades {
            period1_weeks: vec![GradeValue::Numeric(90.0); 7],
            period2_weeks: vec![GradeValue::Numeric(90.0); 8],
        };
        aggregate(&grades, &grades, &grades, &exams, &GradingConfig::default())
    }

    fn sample_report() -> GradeReport {
        report_with(ExamGrades {
            midterm1: GradeValue::Numeric(90.0),
            midterm2: GradeValue::Numeric(90.0),
            final_exam: GradeValue::Numeric(90.0),
        })
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&sample_report()).unwrap();
    }

    #[test]
    fn test_render_summary_contains_results() {
        let summary = render_summary(&sample_report());
        assert!(summary.contains("(20/50/30)"));
        assert!(summary.contains("FINAL GRADE:                  90"));
        assert!(summary.contains("LETTER GRADE:                 A-"));
        assert!(summary.contains("admitted"));
    }

    #[test]
    fn test_render_summary_not_applicable_exams() {
        let summary = render_summary(&report_with(ExamGrades {
            midterm1: GradeValue::Excluded,
            midterm2: GradeValue::Numeric(90.0),
            final_exam: GradeValue::Excluded,
        }));
        assert!(summary.contains("Midterm 1 exam:             н.п."));
        assert!(summary.contains("Midterm 1 composite:        90.00"));
        assert!(summary.contains("Midterm 2 composite: (90.00 + 90.00) / 2 = 90.00"));
        assert!(summary.contains("Final exam:                   н.п."));
    }

    #[test]
    fn test_render_averages() {
        let header: Vec<String> = ["Имя", "Л1"].iter().map(|s| s.to_string()).collect();
        let rows = vec![vec!["a".to_string(), "80".to_string()]];
        let averages = ReferenceAverages::from_rows(&header, &rows, 90.0);

        let text = render_averages(&averages);
        assert!(text.contains("Л1 = 80.00"));
        assert!(text.contains("ИК = 90.00"));
    }

    #[test]
    fn test_write_gradebook_roundtrip_text() {
        let path = temp_path("grade_rater_test_write.csv");
        let _ = fs::remove_file(&path);

        let book = Gradebook {
            header: vec!["Компонент".to_string(), "1".to_string(), "2".to_string()],
            rows: vec![vec!["Лекция".to_string(), "90".to_string(), "н.п.".to_string()]],
        };
        write_gradebook(&path, &book).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Компонент,1,2\nЛекция,90,н.п.\n");
        assert!(!temp_sibling(&path).exists());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_gradebook_keeps_byte_order_mark() {
        let input = temp_path("grade_rater_test_bom_in.csv");
        let output = temp_path("grade_rater_test_bom_out.csv");
        let original = "\u{feff}Компонент,1\nЛекция,90\n";
        fs::write(&input, original).unwrap();

        let book = Gradebook {
            rows: vec![],
            ..Gradebook::read(&input, &crate::schema::Layout::standard()).unwrap()
        };
        write_gradebook(&output, &book).unwrap();

        let bytes = fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"\xef\xbb\xbf"));
        assert_eq!(String::from_utf8(bytes).unwrap(), "\u{feff}Компонент,1\n");

        fs::remove_file(&input).unwrap();
        fs::remove_file(&output).unwrap();
    }

    #[test]
    fn test_write_gradebook_replaces_existing() {
        let path = temp_path("grade_rater_test_replace.csv");
        fs::write(&path, "old content\n").unwrap();

        let book = Gradebook {
            header: vec!["h".to_string()],
            rows: vec![],
        };
        write_gradebook(&path, &book).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "h\n");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_gradebook_into_missing_dir_fails_cleanly() {
        let path = temp_path("grade_rater_no_such_dir/out.csv");
        let book = Gradebook {
            header: vec!["h".to_string()],
            rows: vec![],
        };

        assert!(write_gradebook(&path, &book).is_err());
        assert!(!path.exists());
    }
}

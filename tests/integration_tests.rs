use grade_rater::analyzers::analyzer::{RunPaths, analyze, fill};
use grade_rater::analyzers::filler::FillSource;
use grade_rater::config::{FillStrategy, GradingConfig};
use grade_rater::error::GradebookError;
use grade_rater::schema::Layout;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn temp_path(name: &str) -> PathBuf {
    env::temp_dir().join(name)
}

fn output_lines(path: &Path) -> Vec<Vec<String>> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| l.split(',').map(str::to_string).collect())
        .collect()
}

#[test]
fn test_all_ninety_pipeline() {
    let input = fixture("grades_all_90.csv");
    let reference = fixture("reference.csv");
    let output = temp_path("grade_rater_it_all_90.csv");
    let _ = fs::remove_file(&output);

    let paths = RunPaths {
        input: &input,
        output: &output,
        reference: &reference,
    };
    let run = analyze(&paths, &GradingConfig::default(), &Layout::standard())
        .expect("pipeline failed");

    let report = &run.report;
    for period in [&report.period1, &report.period2] {
        assert!((period.averages.lecture - 90.0).abs() < 1e-9);
        assert!((period.averages.practice - 90.0).abs() < 1e-9);
        assert!((period.averages.srsp - 90.0).abs() < 1e-9);
        assert!((period.weighted_total - 90.0).abs() < 1e-9);
        assert!((period.composite - 90.0).abs() < 1e-9);
    }
    assert_eq!(report.admission_rating, 90.0);
    assert_eq!(report.final_grade, 90.0);
    assert_eq!(report.letter_grade, "A-");
    assert!(run.fills.is_empty());

    let lines = output_lines(&output);
    let header = fs::read_to_string(&input).unwrap();
    assert_eq!(
        fs::read_to_string(&output).unwrap().lines().next(),
        header.lines().next()
    );
    for row in &lines[1..] {
        assert_eq!(row.len(), 28);
        assert_eq!(row[9], "90");
        assert_eq!(row[24], "90");
        assert_eq!(row[26], "90");
        assert_eq!(row[27], "A-");
    }

    fs::remove_file(&output).unwrap();
}

#[test]
fn test_gaps_filled_from_reference() {
    let input = fixture("grades_gaps.csv");
    let reference = fixture("reference.csv");
    let output = temp_path("grade_rater_it_gaps.csv");
    let _ = fs::remove_file(&output);

    let paths = RunPaths {
        input: &input,
        output: &output,
        reference: &reference,
    };
    let run = analyze(&paths, &GradingConfig::default(), &Layout::standard())
        .expect("pipeline failed");

    // 3 lecture cells, 13 SRSP weekly cells
    assert_eq!(run.fills.len(), 16);
    assert_eq!(
        run.fills
            .iter()
            .filter(|f| f.source == FillSource::Reference)
            .count(),
        4
    );

    let report = &run.report;
    assert!((report.period1.averages.lecture - 565.0 / 6.0).abs() < 1e-9);
    assert!((report.period1.averages.practice - 540.0 / 7.0).abs() < 1e-9);
    assert!((report.period1.averages.srsp - 550.0 / 7.0).abs() < 1e-9);
    assert!((report.period2.weighted_total - 88.0).abs() < 1e-9);
    assert_eq!(report.period1.midterm_exam, Some(76.0));
    assert_eq!(report.final_exam, Some(82.0));
    assert_eq!(report.admission_rating, 81.0);
    assert_eq!(report.final_grade, 81.0);
    assert_eq!(report.letter_grade, "B");

    let lines = output_lines(&output);
    let lecture = &lines[1];
    assert_eq!(lecture[2], "65");
    assert_eq!(lecture[4], "н.п.");
    assert_eq!(lecture[8], "94");
    assert_eq!(lecture[9], "81");
    assert_eq!(lecture[10], "76");
    assert_eq!(lecture[11], "78");
    assert_eq!(lecture[23], "84");
    assert_eq!(lecture[25], "82");
    assert_eq!(lecture[27], "B");

    let practice = &lines[2];
    assert_eq!(practice[2], "н");
    assert_eq!(practice[8], "77");

    let srsp = &lines[3];
    assert_eq!(srsp.len(), 28);
    assert_eq!(srsp[3], "50");
    assert_eq!(srsp[4], "90");
    assert_eq!(srsp[12], "90");
    // exam cells are read from the lecture row only
    assert_eq!(srsp[10], "");
    assert_eq!(srsp[22], "");
    assert_eq!(srsp[25], "");
    assert_eq!(srsp[8], "79");
    assert_eq!(srsp[20], "90");

    let other = &lines[4];
    assert_eq!(other[0], "Итого");
    assert!(other[1..].iter().all(|c| c.is_empty()));

    fs::remove_file(&output).unwrap();
}

#[test]
fn test_fill_then_fill_again_is_noop() {
    let input = fixture("grades_gaps.csv");
    let reference = fixture("reference.csv");
    let first = temp_path("grade_rater_it_fill_first.csv");
    let second = temp_path("grade_rater_it_fill_second.csv");

    let config = GradingConfig::default();
    let layout = Layout::standard();

    let fills = fill(
        &RunPaths {
            input: &input,
            output: &first,
            reference: &reference,
        },
        &config,
        &layout,
    )
    .unwrap();
    assert_eq!(fills.len(), 16);

    let refills = fill(
        &RunPaths {
            input: &first,
            output: &second,
            reference: &reference,
        },
        &config,
        &layout,
    )
    .unwrap();
    assert!(refills.is_empty());
    assert_eq!(
        fs::read_to_string(&first).unwrap(),
        fs::read_to_string(&second).unwrap()
    );

    fs::remove_file(&first).unwrap();
    fs::remove_file(&second).unwrap();
}

#[test]
fn test_fixed_strategy_without_reference_file() {
    let input = fixture("grades_gaps.csv");
    let reference = temp_path("grade_rater_it_no_reference.csv");
    let output = temp_path("grade_rater_it_fixed.csv");
    let _ = fs::remove_file(&reference);

    let mut config = GradingConfig::default();
    config.fill.strategy = FillStrategy::Fixed;

    let run = analyze(
        &RunPaths {
            input: &input,
            output: &output,
            reference: &reference,
        },
        &config,
        &Layout::standard(),
    )
    .unwrap();

    assert!(run.fills.iter().all(|f| f.source == FillSource::Default));
    assert!(run.fills.iter().all(|f| f.value == "90"));

    fs::remove_file(&output).unwrap();
}

#[test]
fn test_missing_reference_file_is_fatal() {
    let input = fixture("grades_all_90.csv");
    let reference = temp_path("grade_rater_it_absent_reference.csv");
    let output = temp_path("grade_rater_it_absent_reference_out.csv");
    let _ = fs::remove_file(&output);

    let err = analyze(
        &RunPaths {
            input: &input,
            output: &output,
            reference: &reference,
        },
        &GradingConfig::default(),
        &Layout::standard(),
    )
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<GradebookError>(),
        Some(GradebookError::MissingFile(_))
    ));
    assert!(!output.exists());
}

#[test]
fn test_missing_row_writes_nothing() {
    let input = fixture("grades_missing_srsp.csv");
    let reference = fixture("reference.csv");
    let output = temp_path("grade_rater_it_missing_row.csv");
    let _ = fs::remove_file(&output);

    let err = analyze(
        &RunPaths {
            input: &input,
            output: &output,
            reference: &reference,
        },
        &GradingConfig::default(),
        &Layout::standard(),
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "required row 'СРСП' not found in gradebook");
    assert!(!output.exists());
}

#[test]
fn test_refuses_to_overwrite_input() {
    let input = fixture("grades_all_90.csv");
    let reference = fixture("reference.csv");
    let before = fs::read_to_string(&input).unwrap();

    let err = analyze(
        &RunPaths {
            input: &input,
            output: &input,
            reference: &reference,
        },
        &GradingConfig::default(),
        &Layout::standard(),
    )
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<GradebookError>(),
        Some(GradebookError::SameInputOutput(_))
    ));
    assert_eq!(fs::read_to_string(&input).unwrap(), before);
}

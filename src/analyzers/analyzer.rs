use crate::analyzers::aggregate::{annotate_gradebook, grade_gradebook};
use crate::analyzers::filler::{FillEvent, GapFiller};
use crate::analyzers::reference::ReferenceAverages;
use crate::analyzers::types::GradeReport;
use crate::config::{FillStrategy, GradingConfig};
use crate::error::GradebookError;
use crate::gradebook::Gradebook;
use crate::output::write_gradebook;
use crate::schema::Layout;
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Files a grading run reads and writes.
#[derive(Debug, Clone)]
pub struct RunPaths<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub reference: &'a Path,
}

/// Result of a full grading run.
#[derive(Debug, Clone)]
pub struct GradeRun {
    pub gradebook: Gradebook,
    pub fills: Vec<FillEvent>,
    pub report: GradeReport,
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Loads reference averages when the fill strategy needs them.
pub fn load_averages(reference: &Path, config: &GradingConfig) -> Result<Option<ReferenceAverages>> {
    match config.fill.strategy {
        FillStrategy::Reference => Ok(Some(ReferenceAverages::load(
            reference,
            config.fill.final_exam,
        )?)),
        FillStrategy::Fixed => {
            info!("Fixed fill strategy, reference dataset not read");
            Ok(None)
        }
    }
}

/// Reads the input and returns it gap-filled. Nothing is written.
fn load_and_fill(
    paths: &RunPaths,
    config: &GradingConfig,
    layout: &Layout,
) -> Result<(Gradebook, Vec<FillEvent>)> {
    layout.validate()?;
    config.validate()?;

    if same_file(paths.input, paths.output) {
        return Err(GradebookError::SameInputOutput(paths.output.display().to_string()).into());
    }

    let averages = load_averages(paths.reference, config)?;
    let book = Gradebook::read(paths.input, layout)?;

    let filler = GapFiller::new(layout, &config.fill, averages.as_ref());
    let (filled, fills) = filler.fill_gradebook(&book)?;
    info!(filled_cells = fills.len(), "Gap filling complete");

    Ok((filled, fills))
}

/// Fills empty cells and writes the result, without grading.
#[tracing::instrument(skip_all, fields(input = %paths.input.display(), output = %paths.output.display()))]
pub fn fill(paths: &RunPaths, config: &GradingConfig, layout: &Layout) -> Result<Vec<FillEvent>> {
    let (filled, fills) = load_and_fill(paths, config, layout)?;
    write_gradebook(paths.output, &filled)?;
    Ok(fills)
}

/// Fills, grades and annotates the input, then writes the annotated gradebook.
///
/// Every fallible step runs before the output is written.
#[tracing::instrument(skip_all, fields(input = %paths.input.display(), output = %paths.output.display()))]
pub fn analyze(paths: &RunPaths, config: &GradingConfig, layout: &Layout) -> Result<GradeRun> {
    let (filled, fills) = load_and_fill(paths, config, layout)?;

    let report = grade_gradebook(&filled, layout, config)?;
    let annotated = annotate_gradebook(&filled, layout, &report)?;

    write_gradebook(paths.output, &annotated)?;

    info!(
        admission_rating = report.admission_rating,
        final_grade = report.final_grade,
        letter = %report.letter_grade,
        "Grading complete"
    );

    Ok(GradeRun {
        gradebook: annotated,
        fills,
        report,
    })
}

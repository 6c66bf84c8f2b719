//! Per-column averages of a reference dataset, used as gap-fill values.

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::utility::mean;
use crate::error::GradebookError;
use crate::gradebook::{Row, read_records};
use crate::parser::parse_grade;
use crate::schema::FINAL_EXAM_LABEL;

/// Mean observed value per reference column label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceAverages {
    averages: BTreeMap<String, f64>,
}

impl ReferenceAverages {
    /// Loads a reference CSV (header of labels, one name column, then grades).
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path, final_exam_default: f64) -> Result<Self> {
        let mut records = read_records(path)?.into_iter();
        let header = records
            .next()
            .ok_or_else(|| GradebookError::EmptyFile(path.display().to_string()))?;
        let rows: Vec<Row> = records.collect();

        let averages = Self::from_rows(&header, &rows, final_exam_default);
        info!(
            labels = averages.len(),
            rows = rows.len(),
            "Reference averages computed"
        );
        Ok(averages)
    }

    /// Averages every column after the first over the numeric cells of `rows`.
    ///
    /// Columns without a single numeric observation are left out. The final
    /// exam label is always present, defaulting to `final_exam_default`.
    pub fn from_rows(header: &[String], rows: &[Row], final_exam_default: f64) -> Self {
        let mut observations: BTreeMap<String, Vec<f64>> = BTreeMap::new();

        for (column, label) in header.iter().enumerate().skip(1) {
            let label = label.trim();
            if label.is_empty() {
                continue;
            }

            let values = rows
                .iter()
                .filter_map(|row| row.get(column))
                .filter_map(|cell| parse_grade(cell).numeric());

            observations.entry(label.to_string()).or_default().extend(values);
        }

        let mut averages = BTreeMap::new();
        for (label, values) in observations {
            if values.is_empty() {
                debug!(label = %label, "No numeric observations, column omitted");
                continue;
            }
            let avg = mean(&values);
            debug!(label = %label, observations = values.len(), average = avg, "Column averaged");
            averages.insert(label, avg);
        }

        averages
            .entry(FINAL_EXAM_LABEL.to_string())
            .or_insert(final_exam_default);

        Self { averages }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.averages.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.averages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.averages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.averages.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

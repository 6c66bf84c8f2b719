//! In-memory gradebook table loaded from CSV.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::GradebookError;
use crate::schema::{Component, Layout};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Ordered fields of one CSV line.
pub type Row = Vec<String>;

/// Header line plus data rows, every row padded to the layout width.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradebook {
    pub header: Row,
    pub rows: Vec<Row>,
}

/// Reads every non-blank line of a comma-separated file, without quote handling.
pub(crate) fn read_records(path: &Path) -> Result<Vec<Row>> {
    if !path.exists() {
        return Err(GradebookError::MissingFile(path.display().to_string()).into());
    }

    let file =
        File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(file);

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result.with_context(|| format!("failed to read '{}'", path.display()))?;
        records.push(record.iter().map(str::to_string).collect());
    }

    Ok(records)
}

/// The csv reader drops a leading byte-order mark; this tells whether there was one.
fn has_utf8_bom(path: &Path) -> Result<bool> {
    let mut prefix = Vec::with_capacity(UTF8_BOM.len());
    File::open(path)
        .and_then(|f| f.take(UTF8_BOM.len() as u64).read_to_end(&mut prefix))
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    Ok(prefix == UTF8_BOM)
}

/// Extends `row` with empty cells up to `width` fields.
pub fn pad_row(mut row: Row, width: usize) -> Row {
    if row.len() < width {
        row.resize(width, String::new());
    }
    row
}

impl Gradebook {
    /// Loads a gradebook, padding short rows to `layout.min_columns()`.
    ///
    /// A UTF-8 byte-order mark stays on the first header cell, so writing the
    /// header back reproduces it.
    pub fn read(path: &Path, layout: &Layout) -> Result<Self> {
        let mut records = read_records(path)?.into_iter();

        let mut header = records
            .next()
            .ok_or_else(|| GradebookError::EmptyFile(path.display().to_string()))?;
        if has_utf8_bom(path)? {
            if let Some(first) = header.first_mut() {
                first.insert(0, '\u{feff}');
            }
        }

        let width = layout.min_columns();
        let rows: Vec<Row> = records.map(|r| pad_row(r, width)).collect();

        debug!(path = %path.display(), rows = rows.len(), width, "Gradebook loaded");

        Ok(Self { header, rows })
    }

    /// Index of the single row labelled with `component`.
    pub fn component_index(
        &self,
        component: Component,
        layout: &Layout,
    ) -> Result<usize, GradebookError> {
        let mut matches = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                row.get(layout.label)
                    .is_some_and(|label| component.matches(label))
            })
            .map(|(i, _)| i);

        let index = matches
            .next()
            .ok_or_else(|| GradebookError::MissingRow(component.label().to_string()))?;

        if matches.next().is_some() {
            return Err(GradebookError::DuplicateRow(component.label().to_string()));
        }

        Ok(index)
    }

    pub fn component_row(
        &self,
        component: Component,
        layout: &Layout,
    ) -> Result<&Row, GradebookError> {
        let index = self.component_index(component, layout)?;
        Ok(&self.rows[index])
    }
}

//! Replaces empty cells of the component rows with default grades.

use serde::Serialize;
use tracing::info;

use crate::analyzers::reference::ReferenceAverages;
use crate::analyzers::utility::format_grade;
use crate::config::{FillDefaults, FillStrategy};
use crate::error::GradebookError;
use crate::gradebook::{Gradebook, Row, pad_row};
use crate::parser::is_blank;
use crate::schema::{Component, InputCell, Layout};

/// Where a fill value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FillSource {
    Reference,
    Default,
}

/// One replaced cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillEvent {
    pub component: Component,
    pub column: usize,
    pub label: String,
    pub value: String,
    pub source: FillSource,
}

pub struct GapFiller<'a> {
    layout: &'a Layout,
    defaults: &'a FillDefaults,
    averages: Option<&'a ReferenceAverages>,
}

impl<'a> GapFiller<'a> {
    /// `averages` is only consulted under [`FillStrategy::Reference`].
    pub fn new(
        layout: &'a Layout,
        defaults: &'a FillDefaults,
        averages: Option<&'a ReferenceAverages>,
    ) -> Self {
        let averages = match defaults.strategy {
            FillStrategy::Reference => averages,
            FillStrategy::Fixed => None,
        };
        Self {
            layout,
            defaults,
            averages,
        }
    }

    /// Value for an empty `cell`: the rounded reference average, else the role default.
    pub fn fill_value(&self, cell: &InputCell) -> (String, FillSource) {
        match self.averages.and_then(|a| a.get(&cell.label)) {
            Some(avg) => (format_grade(avg), FillSource::Reference),
            None => (
                format_grade(self.defaults.for_role(cell.role)),
                FillSource::Default,
            ),
        }
    }

    /// Returns a copy of `row` with every blank input cell filled.
    ///
    /// Marker literals (`н`, `н.п.`) are grades, not gaps, and stay as they are.
    pub fn fill_row(&self, component: Component, row: &Row) -> (Row, Vec<FillEvent>) {
        let mut filled = pad_row(row.clone(), self.layout.min_columns());
        let mut events = Vec::new();

        for cell in self.layout.input_cells(component) {
            if !is_blank(&filled[cell.column]) {
                continue;
            }

            let (value, source) = self.fill_value(&cell);
            filled[cell.column] = value.clone();
            events.push(FillEvent {
                component,
                column: cell.column,
                label: cell.label,
                value,
                source,
            });
        }

        (filled, events)
    }

    /// Fills the three component rows of `book`; other rows pass through.
    #[tracing::instrument(skip_all, fields(rows = book.rows.len()))]
    pub fn fill_gradebook(
        &self,
        book: &Gradebook,
    ) -> Result<(Gradebook, Vec<FillEvent>), GradebookError> {
        let mut filled = book.clone();
        let mut events = Vec::new();

        for component in Component::ALL {
            let index = book.component_index(component, self.layout)?;
            let (row, row_events) = self.fill_row(component, &book.rows[index]);
            filled.rows[index] = row;
            events.extend(row_events);
        }

        for event in &events {
            info!(
                row = event.component.label(),
                cell = event.column + 1,
                label = %event.label,
                value = %event.value,
                source = ?event.source,
                "Empty cell filled"
            );
        }

        Ok((filled, events))
    }
}

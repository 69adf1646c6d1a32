//! CSV export of table rows.
//!
//! Output is one header line and one line per row, CRLF terminated. Cells
//! never contain commas or line breaks: commas become `;` and line breaks
//! become spaces. Structural columns (selection checkboxes, action menus)
//! and hidden columns are left out.

mod error;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use grid_model::{ColumnDescriptor, Row};
use grid_table::TableState;
use serde::{Deserialize, Serialize};

pub use error::{ExportError, Result};

/// Which rows an export contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportScope {
    /// Every row in tree order, collapsed or not.
    #[default]
    AllRows,
    /// Only the rows currently on screen.
    VisibleRows,
}

impl ExportScope {
    pub const fn label(self) -> &'static str {
        match self {
            Self::AllRows => "all-rows",
            Self::VisibleRows => "visible-rows",
        }
    }
}

/// Make a value safe for a comma-separated cell.
pub fn sanitize_cell(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ',' => out.push(';'),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push(' ');
            }
            '\n' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}

/// Raw cell text; dates render as `YYYY-MM-DD`. Page formatters are not
/// applied so exports stay machine readable.
fn cell_text(column: &ColumnDescriptor, row: &Row) -> String {
    sanitize_cell(&row.value(&column.field).to_string())
}

/// Write `rows` under `columns` as CSV.
///
/// Cells are written unquoted; `sanitize_cell` has already removed every
/// delimiter and line break.
pub fn write_csv<'a, W: Write>(
    writer: W,
    columns: &[&ColumnDescriptor],
    rows: impl IntoIterator<Item = &'a Row>,
) -> Result<usize> {
    let mut builder = WriterBuilder::new();
    builder
        .terminator(Terminator::CRLF)
        .quote_style(QuoteStyle::Never);
    let mut csv = builder.from_writer(writer);

    let header: Vec<String> = columns.iter().map(|c| sanitize_cell(&c.header)).collect();
    csv = write_line(&builder, csv, &header)?;
    let mut count = 0;
    for row in rows {
        let cells: Vec<String> = columns.iter().map(|c| cell_text(c, row)).collect();
        csv = write_line(&builder, csv, &cells)?;
        count += 1;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(count)
}

/// The csv writer spells a record with no bytes as `""`; such a line is
/// written as a bare terminator instead.
fn write_line<W: Write>(
    builder: &WriterBuilder,
    mut csv: csv::Writer<W>,
    cells: &[String],
) -> Result<csv::Writer<W>> {
    if cells.len() > 1 || cells.iter().any(|cell| !cell.is_empty()) {
        csv.write_record(cells)?;
        return Ok(csv);
    }
    let mut inner = csv
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    inner.write_all(b"\r\n").map_err(csv::Error::from)?;
    Ok(builder.from_writer(inner))
}

/// Columns an export includes: visible, non-structural, in rendered order.
pub fn export_columns<'a>(groups: &grid_table::PinnedGroups<'a>) -> Vec<&'a ColumnDescriptor> {
    groups.iter().filter(|c| !c.structural).collect()
}

fn write_table<W: Write>(writer: W, state: &mut TableState, scope: ExportScope) -> Result<usize> {
    match scope {
        ExportScope::AllRows => {
            let groups = state.layout().rendered_groups();
            write_csv(writer, &export_columns(&groups), state.tree().iter_preorder())
        }
        ExportScope::VisibleRows => {
            let view = state.view();
            write_csv(writer, &export_columns(&view.groups), view.rows.iter().copied())
        }
    }
}

/// Export a table to CSV text.
pub fn export_csv(state: &mut TableState, scope: ExportScope) -> Result<String> {
    let mut buffer = Vec::new();
    let rows = write_table(&mut buffer, state, scope)?;
    tracing::debug!(rows, scope = scope.label(), "Exported table to CSV");
    Ok(String::from_utf8(buffer)?)
}

/// Export a table to a CSV file. Returns the number of data rows written.
pub fn export_to_path(state: &mut TableState, scope: ExportScope, path: &Path) -> Result<usize> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    let rows = write_table(&mut writer, state, scope)?;
    writer.flush().map_err(io_err)?;
    tracing::info!(rows, path = %path.display(), "Exported table to CSV");
    Ok(rows)
}

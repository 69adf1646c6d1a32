//! CLI argument definitions for the tree grid pages.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use grid_export::ExportScope;
use grid_model::{CellValue, ColumnId, PinSide, RowId};

use crate::routes::Route;

#[derive(Parser)]
#[command(
    name = "tree-grid",
    version,
    about = "Tree Grid - hierarchical tables in the terminal",
    long_about = "Browse the demo pages of the tree grid.\n\n\
                  Every page keeps its column layout, selection and expansion\n\
                  in a state directory, so changes carry over between runs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Settings file (default: platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Directory of saved table layouts (overrides the settings file).
    #[arg(long = "state-dir", value_name = "DIR", global = true)]
    pub state_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the pages and their tables.
    Routes,

    /// Render a page table, applying any changes given as flags.
    Show(ShowArgs),

    /// Write a page table as CSV.
    Export(ExportArgs),

    /// Forget the saved layout of a page.
    Reset(ResetArgs),

    /// Print the active settings.
    Settings {
        /// Write a settings file with the defaults if none exists.
        #[arg(long = "init")]
        init: bool,
    },
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Page path, e.g. /enhanced-table/ (default: from settings).
    #[arg(value_name = "ROUTE", value_parser = parse_route)]
    pub route: Option<Route>,

    #[command(flatten)]
    pub edit: EditArgs,

    /// Also print the column chooser.
    #[arg(long = "columns")]
    pub columns: bool,

    /// Limit the column chooser to hideable columns matching KEYWORD.
    #[arg(long = "search", value_name = "KEYWORD", requires = "columns")]
    pub search: Option<String>,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Page path, e.g. /enhanced-table/ (default: from settings).
    #[arg(value_name = "ROUTE", value_parser = parse_route)]
    pub route: Option<Route>,

    #[command(flatten)]
    pub edit: EditArgs,

    /// Rows to export (default: from settings).
    #[arg(long = "scope", value_enum)]
    pub scope: Option<ExportScopeArg>,

    /// Output file (default: stdout).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ResetArgs {
    /// Page path, e.g. /enhanced-table/.
    #[arg(value_name = "ROUTE", value_parser = parse_route)]
    pub route: Route,

    /// Only reset this table of the page.
    #[arg(long = "table", value_name = "KEY")]
    pub table: Option<String>,
}

/// Table changes, applied in the order expansion, columns, selection, rows.
#[derive(Args, Debug, Default, Clone)]
pub struct EditArgs {
    /// Table of the page to use (default: the first).
    #[arg(long = "table", value_name = "KEY")]
    pub table: Option<String>,

    /// Expand every row.
    #[arg(long = "expand-all", conflicts_with = "collapse_all")]
    pub expand_all: bool,

    /// Collapse every row.
    #[arg(long = "collapse-all")]
    pub collapse_all: bool,

    /// Flip between all expanded and all collapsed.
    #[arg(long = "toggle-all")]
    pub toggle_all: bool,

    /// Expand or collapse one row.
    #[arg(long = "toggle", value_name = "ROW", value_parser = parse_row_id)]
    pub toggle: Vec<RowId>,

    /// Reset every column to its default width.
    #[arg(long = "reset-size")]
    pub reset_size: bool,

    /// Move column FROM to the position of column TO.
    #[arg(long = "move", value_name = "FROM:TO", value_parser = parse_move)]
    pub moves: Vec<(ColumnId, ColumnId)>,

    /// Set a column width in pixels.
    #[arg(long = "resize", value_name = "COL=WIDTH", value_parser = parse_resize)]
    pub resize: Vec<(ColumnId, u32)>,

    /// Pin a column to the left or right edge, or unpin it.
    #[arg(long = "pin", value_name = "COL=left|right|none", value_parser = parse_pin)]
    pub pin: Vec<(ColumnId, PinSide)>,

    /// Hide a column.
    #[arg(long = "hide", value_name = "COL", value_parser = parse_column_id)]
    pub hide: Vec<ColumnId>,

    /// Show a hidden column.
    #[arg(long = "show", value_name = "COL", value_parser = parse_column_id)]
    pub show: Vec<ColumnId>,

    /// Cycle the sort of a column (none, ascending, descending).
    #[arg(long = "sort", value_name = "COL", value_parser = parse_column_id)]
    pub sort: Vec<ColumnId>,

    /// Select every row, or clear the selection when all are selected.
    #[arg(long = "select-all")]
    pub select_all: bool,

    /// Toggle the selection of one row.
    #[arg(long = "select", value_name = "ROW", value_parser = parse_row_id)]
    pub select: Vec<RowId>,

    /// Add a row under PARENT, or at the top level with `root`.
    #[arg(long = "add", value_name = "PARENT", conflicts_with = "edit")]
    pub add: Option<String>,

    /// Row kind of the added row, used as its id prefix (phase, stage, task).
    #[arg(long = "kind", value_name = "KIND", requires = "add")]
    pub kind: Option<String>,

    /// Edit the values of one row.
    #[arg(long = "edit", value_name = "ROW", value_parser = parse_row_id)]
    pub edit: Option<RowId>,

    /// Field value for --add or --edit.
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_field)]
    pub set: Vec<(String, CellValue)>,

    /// Copy a row into a new sibling.
    #[arg(long = "duplicate", value_name = "ROW", value_parser = parse_row_id)]
    pub duplicate: Vec<RowId>,

    /// Delete a row and everything below it. Needs --yes.
    #[arg(long = "delete", value_name = "ROW", value_parser = parse_row_id)]
    pub delete: Option<RowId>,

    /// Confirm --delete.
    #[arg(long = "yes", short = 'y')]
    pub yes: bool,

    /// Save the layout even when autosave is off.
    #[arg(long = "save", conflicts_with = "no_state")]
    pub save: bool,

    /// Neither load nor save the layout.
    #[arg(long = "no-state")]
    pub no_state: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportScopeArg {
    AllRows,
    VisibleRows,
}

impl From<ExportScopeArg> for ExportScope {
    fn from(value: ExportScopeArg) -> Self {
        match value {
            ExportScopeArg::AllRows => Self::AllRows,
            ExportScopeArg::VisibleRows => Self::VisibleRows,
        }
    }
}

pub fn parse_route(value: &str) -> Result<Route, String> {
    value.parse().map_err(|e: anyhow::Error| e.to_string())
}

pub fn parse_row_id(value: &str) -> Result<RowId, String> {
    RowId::new(value).map_err(|e| e.to_string())
}

pub fn parse_column_id(value: &str) -> Result<ColumnId, String> {
    ColumnId::new(value).map_err(|e| e.to_string())
}

fn split_pair<'a>(
    value: &'a str,
    separator: char,
    expected: &str,
) -> Result<(&'a str, &'a str), String> {
    value
        .split_once(separator)
        .ok_or_else(|| format!("expected {expected}, got {value:?}"))
}

pub fn parse_move(value: &str) -> Result<(ColumnId, ColumnId), String> {
    let (moved, target) = split_pair(value, ':', "FROM:TO")?;
    Ok((parse_column_id(moved)?, parse_column_id(target)?))
}

pub fn parse_resize(value: &str) -> Result<(ColumnId, u32), String> {
    let (column, width) = split_pair(value, '=', "COL=WIDTH")?;
    let width = width
        .trim()
        .trim_end_matches("px")
        .parse()
        .map_err(|_| format!("invalid width {width:?}"))?;
    Ok((parse_column_id(column)?, width))
}

pub fn parse_pin(value: &str) -> Result<(ColumnId, PinSide), String> {
    let (column, side) = split_pair(value, '=', "COL=left|right|none")?;
    let side = match side.trim().to_ascii_lowercase().as_str() {
        "left" => PinSide::Left,
        "right" => PinSide::Right,
        "none" | "" => PinSide::None,
        other => return Err(format!("invalid pin side {other:?}")),
    };
    Ok((parse_column_id(column)?, side))
}

pub fn parse_field(value: &str) -> Result<(String, CellValue), String> {
    let (name, raw) = split_pair(value, '=', "FIELD=VALUE")?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in {value:?}"));
    }
    Ok((name.to_string(), parse_cell_value(raw)))
}

/// Typed value of a command-line string: integer, number, `YYYY-MM-DD` date,
/// boolean, or text. An empty string clears the field.
pub fn parse_cell_value(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Missing;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return CellValue::Integer(value);
    }
    if let Ok(value) = trimmed.parse::<f64>()
        && value.is_finite()
    {
        return CellValue::Number(value);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return CellValue::Date(date);
    }
    match trimmed {
        "true" => CellValue::Bool(true),
        "false" => CellValue::Bool(false),
        _ => CellValue::text(raw),
    }
}

//! Text rendering of projected rows and column layouts.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use grid_model::{CellValue, ColumnDescriptor, PinSide, Row, SortDirection};
use grid_table::{ColumnLayout, PinOffset, TableState};

/// Pixels per terminal column when translating widths.
const PX_PER_CHAR: u32 = 7;
const INDENT: &str = "  ";

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_chooser_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell(label: &str) -> Cell {
    Cell::new(label).fg(Color::DarkGrey)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn char_width(px: u32) -> u16 {
    u16::try_from((px / PX_PER_CHAR).max(3)).unwrap_or(u16::MAX)
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

fn sort_marker(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Ascending => " ↑",
        SortDirection::Descending => " ↓",
        SortDirection::None => "",
    }
}

fn pin_marker(side: PinSide) -> &'static str {
    match side {
        PinSide::Left => " ⇤",
        PinSide::Right => " ⇥",
        PinSide::None => "",
    }
}

fn is_select(column: &ColumnDescriptor) -> bool {
    column.structural && column.id.as_str() == "select"
}

/// Render the rows currently on screen with their pinned column groups.
///
/// The first data column carries the tree indentation and the ▾ / ▸
/// expansion marker of rows that have sub-rows.
pub fn render_table(state: &mut TableState) -> String {
    let all_ids = state.tree().ids();
    let total = all_ids.len();
    let view = state.view();
    let columns: Vec<&ColumnDescriptor> = view.groups.iter().collect();
    let tree_column = columns.iter().position(|c| !c.structural);

    let all_selected = view.selection.is_all_selected(&all_ids);
    let some_selected = view.selection.is_some_selected(&all_ids);

    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(columns.iter().map(|column| {
        if is_select(column) {
            let mark = if all_selected {
                "[x]"
            } else if some_selected {
                "[-]"
            } else {
                "[ ]"
            };
            return header_cell(mark);
        }
        let label = format!(
            "{}{}{}",
            column.header,
            sort_marker(column.sort),
            pin_marker(column.pin)
        );
        header_cell(&label)
    }));
    table.set_constraints(
        columns
            .iter()
            .map(|c| ColumnConstraint::UpperBoundary(Width::Fixed(char_width(c.width)))),
    );
    // Padding and one border per column, plus the closing border.
    let width: u32 = columns
        .iter()
        .map(|c| u32::from(char_width(c.width)) + 3)
        .sum::<u32>()
        + 1;
    table.set_width(u16::try_from(width).unwrap_or(u16::MAX));

    for row in &view.rows {
        let cells = columns.iter().enumerate().map(|(index, column)| {
            if is_select(column) {
                return Cell::new(checkbox(view.selection.is_selected(&row.id)));
            }
            if column.structural {
                return dim_cell("⋯");
            }
            if Some(index) == tree_column {
                return Cell::new(tree_label(row, column, view.expansion.is_expanded(&row.id)));
            }
            value_cell(row, column)
        });
        table.add_row(cells);
    }

    if let Some(index) = columns.iter().position(|c| is_select(c)) {
        align_column(&mut table, index, CellAlignment::Center);
    }

    format!(
        "{table}\n{} of {total} rows shown, {} selected",
        view.rows.len(),
        view.selection.len()
    )
}

fn tree_label(row: &Row, column: &ColumnDescriptor, expanded: bool) -> String {
    let marker = match (row.has_children(), expanded) {
        (true, true) => "▾ ",
        (true, false) => "▸ ",
        (false, _) => INDENT,
    };
    format!("{}{marker}{}", INDENT.repeat(row.depth), column.render(row))
}

fn value_cell(row: &Row, column: &ColumnDescriptor) -> Cell {
    let text = column.render(row);
    if text.is_empty() {
        return dim_cell("-");
    }
    match row.value(&column.field) {
        CellValue::Integer(_) | CellValue::Number(_) => {
            Cell::new(text).set_alignment(CellAlignment::Right)
        }
        _ => Cell::new(text),
    }
}

/// The column chooser: every column in rendered order, or the hideable
/// columns matching `keyword`.
pub fn render_columns(layout: &ColumnLayout, keyword: Option<&str>) -> String {
    let columns: Vec<&ColumnDescriptor> = match keyword {
        Some(keyword) => layout.search_hideable(keyword),
        None => layout.ordered().collect(),
    };
    let offsets = layout.pin_offsets();

    let mut table = Table::new();
    apply_chooser_style(&mut table);
    table.set_header(
        ["Column", "Header", "Visible", "Pin", "Width", "Sort", "Offset"]
            .into_iter()
            .map(header_cell),
    );
    for column in columns {
        let offset = offsets.iter().find(|o| o.column == column.id);
        table.add_row(vec![
            Cell::new(column.id.as_str()),
            Cell::new(&column.header),
            visibility_cell(column),
            Cell::new(column.pin.label()),
            Cell::new(column.width),
            sort_cell(column),
            offset_cell(offset),
        ]);
    }
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 6, CellAlignment::Right);
    table.to_string()
}

fn visibility_cell(column: &ColumnDescriptor) -> Cell {
    if !column.hideable {
        dim_cell("fixed")
    } else if column.visible {
        Cell::new("✓").fg(Color::Green)
    } else {
        dim_cell("hidden")
    }
}

fn sort_cell(column: &ColumnDescriptor) -> Cell {
    if !column.sortable {
        return dim_cell("-");
    }
    match column.sort {
        SortDirection::Ascending => Cell::new("asc"),
        SortDirection::Descending => Cell::new("desc"),
        SortDirection::None => dim_cell("none"),
    }
}

fn offset_cell(offset: Option<&PinOffset>) -> Cell {
    match offset {
        Some(offset) if offset.is_last_left || offset.is_first_right => {
            Cell::new(format!("{} |", offset.offset))
        }
        Some(offset) => Cell::new(offset.offset),
        None => dim_cell("-"),
    }
}

#[cfg(test)]
mod tests {
    use grid_model::{ColumnId, FlatRecord, HierarchyPath, RowId};
    use grid_table::{TableAction, TableConfig};

    use super::*;

    fn rid(s: &str) -> RowId {
        RowId::new(s).unwrap()
    }

    fn cid(s: &str) -> ColumnId {
        ColumnId::new(s).unwrap()
    }

    fn state() -> TableState {
        let record = |id: &str, outline: &str, name: &str, fee: i64| {
            FlatRecord::new(rid(id), HierarchyPath::from_outline(outline).unwrap())
                .with_field("name", name)
                .with_field("fee", fee)
        };
        TableState::new(
            TableConfig::new([
                ColumnDescriptor::structural(cid("select"), "", 40),
                ColumnDescriptor::new(cid("name"), "Name").with_width(200),
                ColumnDescriptor::new(cid("fee"), "Fee"),
                ColumnDescriptor::new(cid("notes"), "Notes"),
            ])
            .with_flat_rows([
                record("p1", "1", "Design", 100),
                record("t1", "1.1", "Sketch", 40),
                record("p2", "2", "Build", 7),
            ]),
        )
    }

    #[test]
    fn marks_expandable_rows_and_indents_children() {
        let mut state = state();
        let text = render_table(&mut state);
        assert!(text.contains("▾ Design"));
        assert!(text.contains("    Sketch"));
        assert!(text.contains("3 of 3 rows shown, 0 selected"));

        state.dispatch(TableAction::ToggleExpanded(rid("p1"))).unwrap();
        let text = render_table(&mut state);
        assert!(text.contains("▸ Design"));
        assert!(!text.contains("Sketch"));
        assert!(text.contains("2 of 3 rows shown"));
    }

    #[test]
    fn header_checkbox_is_tri_state() {
        let mut state = state();
        assert!(render_table(&mut state).contains("[ ]"));

        state.dispatch(TableAction::ToggleRowSelected(rid("t1"))).unwrap();
        assert!(render_table(&mut state).contains("[-]"));

        state.dispatch(TableAction::ToggleAllSelected).unwrap();
        let text = render_table(&mut state);
        assert!(!text.contains("[-]"));
        assert!(!text.contains("[ ]"));
        assert!(text.contains("3 selected"));
    }

    #[test]
    fn headers_show_sort_and_pin() {
        let mut state = state();
        state.dispatch(TableAction::ToggleSort(cid("fee"))).unwrap();
        state
            .dispatch(TableAction::PinColumn {
                column: cid("notes"),
                side: PinSide::Left,
            })
            .unwrap();
        let text = render_table(&mut state);
        assert!(text.contains("Fee ↑"));
        assert!(text.contains("Notes ⇤"));
    }

    #[test]
    fn chooser_lists_columns() {
        let mut state = state();
        state
            .dispatch(TableAction::SetColumnVisibility {
                column: cid("notes"),
                visible: false,
            })
            .unwrap();
        let all = render_columns(state.layout(), None);
        assert!(all.contains("select"));
        assert!(all.contains("hidden"));

        let filtered = render_columns(state.layout(), Some("NA"));
        assert!(filtered.contains("name"));
        assert!(!filtered.contains("select"));
        assert!(!filtered.contains("fee"));
    }
}

use chrono::NaiveDate;
use grid_export::{ExportScope, export_csv, export_to_path};
use grid_model::{ColumnDescriptor, ColumnId, FlatRecord, HierarchyPath, PinSide, RowId};
use grid_table::{TableAction, TableConfig, TableState};

fn rid(s: &str) -> RowId {
    RowId::new(s).unwrap()
}

fn cid(s: &str) -> ColumnId {
    ColumnId::new(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn state() -> TableState {
    let task = |id: &str, outline: &str, name: &str, start: NaiveDate, progress: i64| {
        FlatRecord::new(rid(id), HierarchyPath::from_outline(outline).unwrap())
            .with_field("wbs", outline)
            .with_field("name", name)
            .with_field("start", start)
            .with_field("progress", progress)
    };
    TableState::new(
        TableConfig::new([
            ColumnDescriptor::structural(cid("select"), "", 40),
            ColumnDescriptor::new(cid("wbs"), "WBS"),
            ColumnDescriptor::new(cid("name"), "Task Name")
                .with_formatter(|value| format!("** {value} **")),
            ColumnDescriptor::new(cid("start"), "Start"),
            ColumnDescriptor::new(cid("progress"), "Progress"),
            ColumnDescriptor::structural(cid("actions"), "", 60),
        ])
        .with_flat_rows([
            task("t1", "1", "Planning, scope", date(2024, 1, 8), 100),
            task("t2", "1.1", "Kick-off\nmeeting", date(2024, 1, 9), 40),
            task("t3", "2", "Build", date(2024, 2, 1), 0),
        ]),
    )
}

#[test]
fn exports_all_rows_without_structural_columns() {
    let mut state = state();
    let csv = export_csv(&mut state, ExportScope::AllRows).unwrap();
    assert!(csv.ends_with("\r\n"));
    assert_eq!(csv.matches("\r\n").count(), 4);

    let normalized = csv.replace("\r\n", "\n");
    insta::assert_snapshot!(normalized.trim_end(), @r"
    WBS,Task Name,Start,Progress
    1,Planning; scope,2024-01-08,100
    1.1,Kick-off meeting,2024-01-09,40
    2,Build,2024-02-01,0
    ");
}

#[test]
fn follows_rendered_order_and_visibility() {
    let mut state = state();
    state
        .dispatch(TableAction::PinColumn {
            column: cid("progress"),
            side: PinSide::Left,
        })
        .unwrap();
    state
        .dispatch(TableAction::SetColumnVisibility {
            column: cid("start"),
            visible: false,
        })
        .unwrap();
    state.dispatch(TableAction::ToggleExpanded(rid("t1"))).unwrap();

    let csv = export_csv(&mut state, ExportScope::VisibleRows).unwrap();
    let lines: Vec<&str> = csv.split("\r\n").collect();
    assert_eq!(
        lines,
        [
            "Progress,WBS,Task Name",
            "100,1,Planning; scope",
            "0,2,Build",
            "",
        ]
    );

    let all = export_csv(&mut state, ExportScope::AllRows).unwrap();
    assert_eq!(all.lines().count(), 4);
}

#[test]
fn writes_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.csv");
    let mut state = state();
    let rows = export_to_path(&mut state, ExportScope::AllRows, &path).unwrap();
    assert_eq!(rows, 3);
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("WBS,Task Name,Start,Progress\r\n"));

    let missing_dir = dir.path().join("missing").join("tasks.csv");
    assert!(export_to_path(&mut state, ExportScope::AllRows, &missing_dir).is_err());
}

use std::fs;
use std::path::Path;

use grid_cli::cli::{EditArgs, ExportArgs, ExportScopeArg, ResetArgs, ShowArgs};
use grid_cli::commands::{
    Environment, Session, apply_edits, run_export, run_reset, run_routes, run_settings, run_show,
};
use grid_cli::routes::Route;
use grid_cli::settings::Settings;
use grid_model::{ColumnId, RowId};
use grid_persistence::TableStatus;

fn env(dir: &Path) -> Environment {
    let mut settings = Settings::default();
    settings.storage.state_dir = Some(dir.to_path_buf());
    Environment::from_settings(settings)
}

fn cid(s: &str) -> ColumnId {
    ColumnId::new(s).unwrap()
}

fn rid(s: &str) -> RowId {
    RowId::new(s).unwrap()
}

fn show(route: Route, edit: EditArgs) -> ShowArgs {
    ShowArgs {
        route: Some(route),
        edit,
        columns: false,
        search: None,
    }
}

#[test]
fn routes_lists_every_page() {
    let out = run_routes().unwrap();
    for route in Route::ALL {
        assert!(out.contains(route.path()), "{route}");
    }
    assert!(out.contains("multi-table-products"));
}

#[test]
fn collapsed_layout_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let env = env(dir.path());

    let first = run_show(&env, &show(Route::EnhancedTable, EditArgs::default())).unwrap();
    assert!(first.contains("▾ Pre-Design"));
    assert!(first.contains("Site Analysis"));
    assert!(!dir.path().join("enhanced-table.json").exists());

    let collapse = EditArgs {
        collapse_all: true,
        ..EditArgs::default()
    };
    run_show(&env, &show(Route::EnhancedTable, collapse)).unwrap();
    let saved = fs::read_to_string(dir.path().join("enhanced-table.json")).unwrap();
    assert!(saved.contains("\"expanded\":false"));

    let again = run_show(&env, &show(Route::EnhancedTable, EditArgs::default())).unwrap();
    assert!(again.contains("▸ Pre-Design"));
    assert!(!again.contains("Site Analysis"));

    let reset = run_reset(
        &env,
        &ResetArgs {
            route: Route::EnhancedTable,
            table: None,
        },
    )
    .unwrap();
    assert!(reset.contains("enhanced-table"));
    let fresh = run_show(&env, &show(Route::EnhancedTable, EditArgs::default())).unwrap();
    assert!(fresh.contains("Site Analysis"));
}

#[test]
fn malformed_layout_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("enhanced-table.json"), "{ not json").unwrap();
    let out = run_show(&env(dir.path()), &show(Route::EnhancedTable, EditArgs::default())).unwrap();
    assert!(out.contains("▾ Pre-Design"));
}

#[test]
fn column_changes_are_saved() {
    let dir = tempfile::tempdir().unwrap();
    let env = env(dir.path());
    let edit = EditArgs {
        moves: vec![(cid("assignee"), cid("name"))],
        pin: vec![(cid("status"), grid_model::PinSide::Left)],
        resize: vec![(cid("name"), 10)],
        hide: vec![cid("notes")],
        ..EditArgs::default()
    };
    run_show(&env, &show(Route::EnhancedTable, edit)).unwrap();

    let text = fs::read_to_string(dir.path().join("enhanced-table.json")).unwrap();
    let status = TableStatus::from_json(&text).unwrap();
    let order: Vec<&str> = status.column_order.iter().map(ColumnId::as_str).collect();
    let assignee = order.iter().position(|c| *c == "assignee").unwrap();
    let name = order.iter().position(|c| *c == "name").unwrap();
    assert_eq!(assignee + 1, name);
    assert_eq!(status.column_pinning.left, vec![cid("wbs"), cid("status")]);
    assert_eq!(status.column_visibility.get(&cid("notes")), Some(&false));
    assert_eq!(status.column_sizing.get(&cid("name")), Some(&40.0));
}

#[test]
fn no_state_leaves_directory_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let edit = EditArgs {
        collapse_all: true,
        no_state: true,
        ..EditArgs::default()
    };
    run_show(&env(dir.path()), &show(Route::Demo, edit)).unwrap();
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn adds_rows_with_next_wbs_number() {
    let dir = tempfile::tempdir().unwrap();
    let edit = EditArgs {
        add: Some("phase_2".to_string()),
        kind: Some("stage".to_string()),
        set: vec![("name".to_string(), "Permits".into())],
        no_state: true,
        ..EditArgs::default()
    };
    let out = run_show(&env(dir.path()), &show(Route::EnhancedTable, edit)).unwrap();
    assert!(out.contains("Added row stage_"));
    assert!(out.contains("2.3"));
    assert!(out.contains("Permits"));
}

#[test]
fn delete_needs_confirmation_and_cascades() {
    let dir = tempfile::tempdir().unwrap();
    let env = env(dir.path());
    let unconfirmed = EditArgs {
        delete: Some(rid("stage_1.1")),
        no_state: true,
        ..EditArgs::default()
    };
    let err = run_show(&env, &show(Route::EnhancedTable, unconfirmed)).unwrap_err();
    assert!(err.to_string().contains("--yes"));

    let mut session = Session::open(&env, Route::EnhancedTable, None, true).unwrap();
    let before = session.state.tree().len();
    let notes = apply_edits(
        &mut session,
        &EditArgs {
            delete: Some(rid("stage_1.1")),
            yes: true,
            ..EditArgs::default()
        },
    )
    .unwrap();
    assert_eq!(notes, ["Deleted 3 rows"]);
    assert_eq!(session.state.tree().len(), before - 3);
    assert!(!session.state.tree().contains(&rid("task_1.1.2")));

    let missing = EditArgs {
        delete: Some(rid("task_9.9")),
        yes: true,
        ..EditArgs::default()
    };
    assert!(apply_edits(&mut session, &missing).is_err());
}

#[test]
fn selection_is_restored_for_known_rows() {
    let dir = tempfile::tempdir().unwrap();
    let env = env(dir.path());
    let select = EditArgs {
        select: vec![rid("phase_1"), rid("task_2.1.1")],
        ..EditArgs::default()
    };
    run_show(&env, &show(Route::EnhancedTable, select)).unwrap();

    let session = Session::open(&env, Route::EnhancedTable, None, false).unwrap();
    assert!(session.state.selection().is_selected(&rid("phase_1")));
    assert_eq!(
        session.state.selection().selected_with_prefix("task_"),
        [&rid("task_2.1.1")]
    );
    assert!(!session.is_dirty());
}

#[test]
fn exports_csv_for_second_table() {
    let dir = tempfile::tempdir().unwrap();
    let env = env(dir.path());
    let args = ExportArgs {
        route: Some(Route::MultiTable),
        edit: EditArgs {
            table: Some("multi-table-products".to_string()),
            hide: vec![cid("format"), cid("label"), cid("cat"), cid("country")],
            no_state: true,
            ..EditArgs::default()
        },
        scope: Some(ExportScopeArg::VisibleRows),
        output: None,
    };
    let csv = run_export(&env, &args).unwrap();
    let lines: Vec<&str> = csv.split("\r\n").collect();
    assert_eq!(lines[0], "Product,Artist,Year,Available,Price,Sold");
    assert_eq!(lines[1], "Rumours,Fleetwood Mac,1977,12,40,15");
    assert_eq!(lines.len(), 5);

    let path = dir.path().join("products.csv");
    let to_file = ExportArgs {
        scope: Some(ExportScopeArg::AllRows),
        output: Some(path.clone()),
        ..args
    };
    let out = run_export(&env, &to_file).unwrap();
    assert!(out.contains("Wrote 8 rows"));
    assert!(fs::read_to_string(path).unwrap().starts_with("Product,Artist"));
}

#[test]
fn settings_are_printed_as_toml() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_settings(&env(dir.path()), false).unwrap();
    assert!(out.contains("[general]"));
    assert!(out.contains("default_route = \"/enhanced-table/\""));
    assert!(out.contains(&dir.path().display().to_string()));
}

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow, bail};
use comfy_table::Table;
use grid_export::{ExportScope, export_csv, export_to_path};
use grid_model::RowId;
use grid_persistence::{AutoSaveConfig, DirtyTracker, FileStore, StatusRepository};
use grid_table::{TableAction, TableEvent, TableState};
use tracing::{debug, info, warn};

use crate::cli::{EditArgs, ExportArgs, ResetArgs, ShowArgs};
use crate::pages::build_page;
use crate::render::{apply_table_style, render_columns, render_table};
use crate::routes::Route;
use crate::settings::{Settings, load_settings, save_settings, settings_path};

/// Settings after command-line overrides.
#[derive(Debug, Clone)]
pub struct Environment {
    pub settings: Settings,
    /// Settings file in use, when one could be determined.
    pub settings_file: Option<PathBuf>,
}

impl Environment {
    pub fn load(config: Option<PathBuf>, state_dir: Option<PathBuf>) -> Self {
        let settings_file = config.or_else(settings_path);
        let mut settings = load_settings(settings_file.as_deref());
        if let Some(dir) = state_dir {
            settings.storage.state_dir = Some(dir);
        }
        Self {
            settings,
            settings_file,
        }
    }

    pub fn from_settings(settings: Settings) -> Self {
        Self {
            settings,
            settings_file: None,
        }
    }

    fn repository(&self) -> StatusRepository<FileStore> {
        StatusRepository::new(FileStore::new(self.settings.state_dir()))
    }

    fn default_route(&self) -> Result<Route> {
        self.settings
            .general
            .default_route
            .parse()
            .context("default_route in settings")
    }
}

/// One table of a page with its saved layout applied.
pub struct Session {
    pub route: Route,
    pub title: &'static str,
    pub key: &'static str,
    pub state: TableState,
    repository: Option<StatusRepository<FileStore>>,
    autosave: AutoSaveConfig,
    dirty: Rc<RefCell<DirtyTracker>>,
    events: Rc<RefCell<Vec<TableEvent>>>,
}

impl Session {
    /// Build the page table and restore its saved layout unless `no_state`.
    pub fn open(
        env: &Environment,
        route: Route,
        table: Option<&str>,
        no_state: bool,
    ) -> Result<Self> {
        let page = build_page(route)?;
        let page_table = page.into_table(table)?;
        let config = page_table
            .config
            .with_min_column_width(env.settings.general.min_column_width);
        let mut state = TableState::new(config);

        let repository = if no_state {
            None
        } else {
            let repository = env.repository();
            let status = repository.load_or_else(page_table.key, || state.status());
            state.restore(&status);
            Some(repository)
        };

        let dirty = Rc::new(RefCell::new(DirtyTracker::new()));
        let events = Rc::new(RefCell::new(Vec::new()));
        {
            let dirty = Rc::clone(&dirty);
            let events = Rc::clone(&events);
            state.subscribe(move |event| {
                if !matches!(event, TableEvent::DialogChanged) {
                    dirty.borrow_mut().mark_dirty();
                }
                events.borrow_mut().push(event.clone());
            });
        }

        Ok(Self {
            route,
            title: page_table.title,
            key: page_table.key,
            state,
            repository,
            autosave: env.settings.storage.autosave.clone(),
            dirty,
            events,
        })
    }

    pub fn dispatch(&mut self, action: TableAction) -> Result<Option<TableEvent>> {
        self.state
            .dispatch(action)
            .with_context(|| format!("update table {}", self.key))
    }

    /// Events emitted since the last call.
    pub fn take_events(&self) -> Vec<TableEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.borrow().is_dirty()
    }

    /// Write the layout if it changed and autosave is due or `force` is set.
    /// Returns whether anything was written.
    pub fn persist(&mut self, force: bool) -> Result<bool> {
        let Some(repository) = self.repository.as_mut() else {
            return Ok(false);
        };
        let due = {
            let dirty = self.dirty.borrow();
            dirty.is_dirty() && (force || dirty.should_auto_save(&self.autosave))
        };
        if !due {
            debug!("Layout of {} unchanged or autosave not due", self.key);
            return Ok(false);
        }
        repository
            .save(self.key, &self.state.status())
            .map_err(|e| {
                let hint = e.suggestion().map(|s| format!(" {s}")).unwrap_or_default();
                let message = format!("{}{hint}", e.user_message());
                anyhow::Error::new(e).context(message)
            })?;
        self.dirty.borrow_mut().mark_saved();
        Ok(true)
    }
}

/// Apply the table changes in `args`. Returns a line per added or removed row.
pub fn apply_edits(session: &mut Session, args: &EditArgs) -> Result<Vec<String>> {
    for action in layout_actions(args) {
        session.dispatch(action)?;
    }
    for row in &args.select {
        session.dispatch(TableAction::ToggleRowSelected(row.clone()))?;
    }

    if let Some(parent) = &args.add {
        let parent = match parent.as_str() {
            "root" | "/" => None,
            id => Some(RowId::new(id)?),
        };
        session.dispatch(TableAction::OpenNewRow {
            parent,
            kind: args.kind.clone(),
        })?;
        fill_and_submit(session, args)?;
    } else if let Some(row) = &args.edit {
        if session.dispatch(TableAction::OpenEditRow(row.clone()))?.is_none() {
            bail!("no row {row} in table {}", session.key);
        }
        fill_and_submit(session, args)?;
    } else if !args.set.is_empty() {
        warn!("--set has no effect without --add or --edit");
    }

    for row in &args.duplicate {
        session.dispatch(TableAction::DuplicateRow(row.clone()))?;
    }

    if let Some(row) = &args.delete {
        if !args.yes {
            bail!("refusing to delete {row} and its sub-rows without --yes");
        }
        let confirmation = session
            .state
            .confirm_delete(row)
            .ok_or_else(|| anyhow!("no row {row} in table {}", session.key))?;
        session.dispatch(TableAction::DeleteRow(confirmation))?;
    }

    let notes = session
        .take_events()
        .into_iter()
        .filter_map(|event| match event {
            TableEvent::RowAdded(id) => Some(format!("Added row {id}")),
            TableEvent::RowEdited(id) => Some(format!("Edited row {id}")),
            TableEvent::RowsRemoved(ids) => Some(format!("Deleted {} rows", ids.len())),
            _ => None,
        })
        .collect();
    Ok(notes)
}

fn fill_and_submit(session: &mut Session, args: &EditArgs) -> Result<()> {
    for (name, value) in &args.set {
        session.dispatch(TableAction::SetDraftField {
            name: name.clone(),
            value: value.clone(),
        })?;
    }
    session.dispatch(TableAction::SubmitDialog)?;
    Ok(())
}

/// Expansion and column actions, in the order they are applied.
pub fn layout_actions(args: &EditArgs) -> Vec<TableAction> {
    let mut actions = Vec::new();
    if args.expand_all {
        actions.push(TableAction::SetAllExpanded(true));
    }
    if args.collapse_all {
        actions.push(TableAction::SetAllExpanded(false));
    }
    if args.toggle_all {
        actions.push(TableAction::ToggleAllExpanded);
    }
    actions.extend(args.toggle.iter().cloned().map(TableAction::ToggleExpanded));

    if args.reset_size {
        actions.push(TableAction::ResetColumnSizing);
    }
    actions.extend(
        args.moves
            .iter()
            .map(|(moved, target)| TableAction::ReorderColumn {
                moved: moved.clone(),
                target: target.clone(),
            }),
    );
    actions.extend(args.resize.iter().map(|(column, width)| TableAction::ResizeColumn {
        column: column.clone(),
        width: *width,
    }));
    actions.extend(args.pin.iter().map(|(column, side)| TableAction::PinColumn {
        column: column.clone(),
        side: *side,
    }));
    actions.extend(args.hide.iter().map(|column| TableAction::SetColumnVisibility {
        column: column.clone(),
        visible: false,
    }));
    actions.extend(args.show.iter().map(|column| TableAction::SetColumnVisibility {
        column: column.clone(),
        visible: true,
    }));
    actions.extend(args.sort.iter().cloned().map(TableAction::ToggleSort));

    if args.select_all {
        actions.push(TableAction::ToggleAllSelected);
    }
    actions
}

pub fn run_routes() -> Result<String> {
    let mut table = Table::new();
    table.set_header(vec!["Path", "Page", "Tables"]);
    apply_table_style(&mut table);
    for route in Route::ALL {
        let page = build_page(route)?;
        let keys: Vec<&str> = page.tables.iter().map(|t| t.key).collect();
        table.add_row(vec![
            route.path().to_string(),
            page.title().to_string(),
            keys.join(", "),
        ]);
    }
    Ok(table.to_string())
}

pub fn run_show(env: &Environment, args: &ShowArgs) -> Result<String> {
    let route = match args.route {
        Some(route) => route,
        None => env.default_route()?,
    };
    let mut session = Session::open(
        env,
        route,
        args.edit.table.as_deref(),
        args.edit.no_state,
    )?;
    let notes = apply_edits(&mut session, &args.edit)?;
    if session.persist(args.edit.save)? {
        info!("Saved layout of {}", session.key);
    }

    let mut out = format!("{} ({})\n{}\n", route.title(), route.path(), session.title);
    for note in notes {
        out.push_str(&note);
        out.push('\n');
    }
    out.push_str(&render_table(&mut session.state));
    out.push('\n');
    if args.columns {
        out.push_str(&render_columns(session.state.layout(), args.search.as_deref()));
        out.push('\n');
    }
    Ok(out)
}

pub fn run_export(env: &Environment, args: &ExportArgs) -> Result<String> {
    let route = match args.route {
        Some(route) => route,
        None => env.default_route()?,
    };
    let scope: ExportScope = args.scope.map_or(env.settings.export.scope, Into::into);
    let mut session = Session::open(
        env,
        route,
        args.edit.table.as_deref(),
        args.edit.no_state,
    )?;
    apply_edits(&mut session, &args.edit)?;
    session.persist(args.edit.save)?;

    match &args.output {
        Some(path) => {
            let rows = export_to_path(&mut session.state, scope, path)
                .with_context(|| format!("export {} to {}", session.key, path.display()))?;
            Ok(format!("Wrote {rows} rows to {}\n", path.display()))
        }
        None => export_csv(&mut session.state, scope)
            .with_context(|| format!("export {}", session.key)),
    }
}

pub fn run_reset(env: &Environment, args: &ResetArgs) -> Result<String> {
    let page = build_page(args.route)?;
    let keys: Vec<&str> = match &args.table {
        Some(key) => vec![page.table(Some(key))?.key],
        None => page.tables.iter().map(|t| t.key).collect(),
    };
    let mut repository = env.repository();
    for key in &keys {
        repository
            .clear(key)
            .with_context(|| format!("reset layout of {key}"))?;
    }
    Ok(format!("Reset {}\n", keys.join(", ")))
}

pub fn run_settings(env: &Environment, init: bool) -> Result<String> {
    let mut out = String::new();
    match &env.settings_file {
        Some(path) => {
            if init && !path.exists() {
                save_settings(&Settings::default(), path)?;
                out.push_str(&format!("Created {}\n", path.display()));
            }
            out.push_str(&format!("# {}\n", path.display()));
        }
        None if init => bail!("no settings directory on this platform; pass --config"),
        None => {}
    }
    out.push_str(&toml::to_string_pretty(&env.settings).context("serialize settings")?);
    out.push_str(&format!(
        "# layouts are stored in {}\n",
        env.settings.state_dir().display()
    ));
    Ok(out)
}

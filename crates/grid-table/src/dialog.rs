//! Add / edit dialog.
//!
//! `Closed -> Open -> Closed`. Submitting yields the change to apply;
//! cancelling yields nothing. Both end closed.

use grid_model::{CellValue, Fields, RowId};

#[derive(Debug, Clone, PartialEq)]
pub enum DialogMode {
    /// New row under `parent`, or at the top level. `kind` becomes the id
    /// prefix, e.g. `task`.
    New {
        parent: Option<RowId>,
        kind: Option<String>,
    },
    Edit {
        row: RowId,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DialogState {
    #[default]
    Closed,
    Open {
        mode: DialogMode,
        draft: Fields,
    },
}

/// What a submitted dialog asks the table to do.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogOutcome {
    Append {
        parent: Option<RowId>,
        kind: Option<String>,
        fields: Fields,
    },
    Replace {
        row: RowId,
        fields: Fields,
    },
}

#[derive(Debug, Clone, Default)]
pub struct EditDialog {
    state: DialogState,
}

impl EditDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, DialogState::Open { .. })
    }

    pub fn mode(&self) -> Option<&DialogMode> {
        match &self.state {
            DialogState::Open { mode, .. } => Some(mode),
            DialogState::Closed => None,
        }
    }

    pub fn draft(&self) -> Option<&Fields> {
        match &self.state {
            DialogState::Open { draft, .. } => Some(draft),
            DialogState::Closed => None,
        }
    }

    /// Open for a new row. An open dialog is replaced.
    pub fn open_new(&mut self, parent: Option<RowId>, kind: Option<String>) {
        self.open(DialogMode::New { parent, kind }, Fields::new());
    }

    /// Open on an existing row with its current values as the draft.
    pub fn open_edit(&mut self, row: RowId, current: Fields) {
        self.open(DialogMode::Edit { row }, current);
    }

    fn open(&mut self, mode: DialogMode, draft: Fields) {
        if self.is_open() {
            tracing::debug!("Discarding open dialog draft");
        }
        self.state = DialogState::Open { mode, draft };
    }

    /// Returns false when closed.
    pub fn set_field(&mut self, name: &str, value: impl Into<CellValue>) -> bool {
        match &mut self.state {
            DialogState::Open { draft, .. } => {
                draft.insert(name.to_string(), value.into());
                true
            }
            DialogState::Closed => false,
        }
    }

    pub fn submit(&mut self) -> Option<DialogOutcome> {
        match std::mem::take(&mut self.state) {
            DialogState::Open { mode, draft } => Some(match mode {
                DialogMode::New { parent, kind } => DialogOutcome::Append {
                    parent,
                    kind,
                    fields: draft,
                },
                DialogMode::Edit { row } => DialogOutcome::Replace { row, fields: draft },
            }),
            DialogState::Closed => {
                tracing::debug!("Ignoring submit on a closed dialog");
                None
            }
        }
    }

    /// Returns whether a dialog was open.
    pub fn cancel(&mut self) -> bool {
        let was_open = self.is_open();
        self.state = DialogState::Closed;
        was_open
    }
}

//! Application state types and entry glue.
//!
//! [`AppState`] owns the query cache, the two panels and whichever dialog is
//! open. It is only ever touched from the UI thread; network results reach it
//! as [`requests::Completion`]s drained by the event loop in [`update`].
//!
pub mod create;
pub mod edit;
pub mod keymap;
pub mod list;
pub mod requests;
pub mod theme;
pub mod update;

use crate::api::{DraftField, User};
use crate::config::Settings;
use crate::cache::QueryCache;
use crate::error::Operation;
use create::CreatePanel;
use edit::EditOverlay;
use keymap::Keymap;
use list::ListPanel;
pub use theme::Theme;

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    /// Users list has focus; keys go through the keymap.
    Normal,
    Search,
    Create,
    Modal,
}

/// Focused control inside a user form.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FormFocus {
    #[default]
    Name,
    Email,
    Submit,
}

impl FormFocus {
    pub fn next(self) -> Self {
        match self {
            FormFocus::Name => FormFocus::Email,
            FormFocus::Email => FormFocus::Submit,
            FormFocus::Submit => FormFocus::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormFocus::Name => FormFocus::Submit,
            FormFocus::Email => FormFocus::Name,
            FormFocus::Submit => FormFocus::Email,
        }
    }

    pub fn field(self) -> Option<DraftField> {
        match self {
            FormFocus::Name => Some(DraftField::Name),
            FormFocus::Email => Some(DraftField::Email),
            FormFocus::Submit => None,
        }
    }
}

/// Dialogs drawn over the panes. At most one is open.
#[derive(Debug)]
pub enum ModalState {
    Edit(EditOverlay),
    DeleteConfirm {
        target: User,
        /// 0 = Yes, 1 = No.
        selected: usize,
    },
    Help,
}

/// Status-bar message. A failure remembers its operation so the next
/// success of that kind can take it down.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub failed: Option<Operation>,
}

pub struct AppState {
    pub api_base: String,
    pub cache: QueryCache<Vec<User>>,
    pub create: CreatePanel,
    pub list: ListPanel,
    pub modal: Option<ModalState>,
    pub input_mode: InputMode,
    pub theme: Theme,
    pub keymap: Keymap,
    /// Last event worth telling the user about, shown in the status bar.
    pub notice: Option<Notice>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            api_base: settings.api_base.clone(),
            cache: QueryCache::new(),
            create: CreatePanel::new(),
            list: ListPanel::new(settings.page_size),
            modal: None,
            input_mode: InputMode::Normal,
            theme: settings.theme,
            keymap: settings.keymap.clone(),
            notice: None,
            should_quit: false,
        }
    }

    pub fn open_modal(&mut self, modal: ModalState) {
        self.modal = Some(modal);
        self.input_mode = InputMode::Modal;
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn notify(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice { text: text.into(), failed: None });
    }

    pub fn notify_failure(&mut self, op: Operation, text: impl Into<String>) {
        self.notice = Some(Notice { text: text.into(), failed: Some(op) });
    }

    /// Drop the notice if it reports a failure of `op`.
    pub fn clear_failure(&mut self, op: Operation) {
        if self.notice.as_ref().is_some_and(|n| n.failed == Some(op)) {
            self.notice = None;
        }
    }

    pub fn notice_text(&self) -> Option<&str> {
        self.notice.as_ref().map(|n| n.text.as_str())
    }

    pub fn edit_overlay(&self) -> Option<&EditOverlay> {
        match &self.modal {
            Some(ModalState::Edit(ov)) => Some(ov),
            _ => None,
        }
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_only_clears_failures_of_its_own_kind() {
        let mut app = AppState::new(&Settings::defaults("http://localhost:9"));
        app.notify_failure(Operation::Delete, "Error deleting user: boom");
        app.clear_failure(Operation::Fetch);
        assert_eq!(app.notice_text(), Some("Error deleting user: boom"));
        app.clear_failure(Operation::Delete);
        assert_eq!(app.notice, None);

        app.notify("User deleted");
        app.clear_failure(Operation::Delete);
        assert_eq!(app.notice_text(), Some("User deleted"), "plain notices stay");
    }
}

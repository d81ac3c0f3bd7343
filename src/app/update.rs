use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;

use crate::api::Draft;
use crate::app::edit::EditOverlay;
use crate::app::keymap::KeyAction;
use crate::app::requests::{Completion, Requests};
use crate::app::{AppState, FormFocus, InputMode, ModalState};
use crate::cache::CACHE_RETENTION;
use crate::error::Operation;
use crate::ui;

/// How often the loop wakes up to advance timers when no input arrives.
const TICK: Duration = Duration::from_millis(50);

pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut AppState,
    requests: &dyn Requests,
    completions: &mut UnboundedReceiver<Completion>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        let now = Instant::now();
        loop {
            match completions.try_recv() {
                Ok(done) => {
                    apply_completion(app, done, now);
                    dirty = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    anyhow::bail!("request worker stopped");
                }
            }
        }
        dirty |= tick(app, now);
        sync(app, requests);
        dirty |= !app.cache.drain_events().is_empty();

        if dirty {
            terminal.draw(|f| ui::render(f, app))?;
            dirty = false;
        }

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(app, key, requests, Instant::now());
                    dirty = true;
                }
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }
        if app.should_quit {
            tracing::info!("quit requested");
            return Ok(());
        }
    }
}

/// Let the list read its current key through the cache, then hand fresh
/// data for the edited user to an open edit dialog.
pub fn sync(app: &mut AppState, requests: &dyn Requests) {
    app.list.sync(&mut app.cache, requests);
    if let Some(ModalState::Edit(ov)) = &mut app.modal {
        if ov.is_pending() {
            return;
        }
        let id = ov.user().id;
        if let Some(fresh) = app.list.users().iter().find(|u| u.id == id) {
            ov.bind(fresh.clone());
        }
    }
}

/// Advance every time-driven piece of state. Returns true if anything visible changed.
pub fn tick(app: &mut AppState, now: Instant) -> bool {
    let mut changed = app.list.tick(now);
    changed |= app.create.tick(now);
    let close_edit = match &mut app.modal {
        Some(ModalState::Edit(ov)) => ov.tick(now),
        _ => false,
    };
    if close_edit {
        tracing::debug!("edit dialog closing after save");
        app.close_modal();
        changed = true;
    }
    if app.cache.collect_garbage(now, CACHE_RETENTION) > 0 {
        changed = true;
    }
    changed
}

/// Route a finished request to whatever issued it.
pub fn apply_completion(app: &mut AppState, done: Completion, now: Instant) {
    match done {
        Completion::Fetched { ticket, result } => {
            let failure = result.as_ref().err().map(|e| format!("Error loading users: {e}"));
            if !app.cache.resolve(ticket, result, now) {
                return;
            }
            match failure {
                Some(text) => app.notify_failure(Operation::Fetch, text),
                None => app.clear_failure(Operation::Fetch),
            }
        }
        Completion::Created { ticket, result } => {
            if !app.create.settle(ticket, result, &mut app.cache, now) {
                return;
            }
            let failure = app.create.error().map(|e| format!("Error adding user: {e}"));
            match failure {
                Some(text) => app.notify_failure(Operation::Create, text),
                None => app.notify("User added successfully!"),
            }
        }
        Completion::Updated { ticket, result } => {
            let Some(ModalState::Edit(ov)) = &mut app.modal else {
                tracing::debug!("update finished after its dialog closed");
                return;
            };
            if !ov.settle(ticket, result, &mut app.cache, now) {
                return;
            }
            let failure = ov.error().map(|e| format!("Error updating user: {e}"));
            match failure {
                Some(text) => app.notify_failure(Operation::Update, text),
                None => app.notify("User updated successfully!"),
            }
        }
        Completion::Deleted { ticket, result } => {
            if !app.list.settle_delete(ticket, result, &mut app.cache) {
                return;
            }
            let failure = app.list.delete_error().map(|e| format!("Error deleting user: {e}"));
            match failure {
                Some(text) => app.notify_failure(Operation::Delete, text),
                None => app.notify("User deleted"),
            }
        }
    }
}

pub fn handle_key(app: &mut AppState, key: KeyEvent, requests: &dyn Requests, now: Instant) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }
    match app.input_mode {
        InputMode::Normal => handle_normal(app, key, requests),
        InputMode::Search => match key.code {
            KeyCode::Char(c) => app.list.search.push(c, now),
            KeyCode::Backspace => app.list.search.pop(now),
            KeyCode::Enter | KeyCode::Esc | KeyCode::Down => app.input_mode = InputMode::Normal,
            _ => {}
        },
        InputMode::Create => {
            if key.code == KeyCode::Esc {
                app.input_mode = InputMode::Normal;
                return;
            }
            let panel = &mut app.create;
            if form_key(&mut panel.draft, &mut panel.focus, key) == FormKey::Submit
                && panel.submit(requests)
            {
                tracing::info!(name = %panel.draft.name, "create submitted");
            }
        }
        InputMode::Modal => handle_modal(app, key, requests),
    }
}

fn handle_normal(app: &mut AppState, key: KeyEvent, requests: &dyn Requests) {
    let Some(action) = app.keymap.resolve(&key) else {
        return;
    };
    match action {
        KeyAction::Quit => app.should_quit = true,
        KeyAction::OpenHelp => app.open_modal(ModalState::Help),
        KeyAction::StartSearch => app.input_mode = InputMode::Search,
        KeyAction::FocusCreate => app.input_mode = InputMode::Create,
        KeyAction::EditSelection => {
            if let Some(user) = app.list.selected_user().cloned() {
                app.open_modal(ModalState::Edit(EditOverlay::new(user)));
            }
        }
        KeyAction::DeleteSelection => {
            let Some(user) = app.list.selected_user().cloned() else {
                return;
            };
            if app.list.can_delete() {
                app.open_modal(ModalState::DeleteConfirm { target: user, selected: 1 });
            } else {
                app.notify("A delete is already in progress");
            }
        }
        KeyAction::Retry => {
            if app.list.is_error() {
                app.list.retry(&mut app.cache, requests);
            }
        }
        KeyAction::CyclePageSize => app.list.cycle_page_size(),
        KeyAction::MoveUp => app.list.move_up(),
        KeyAction::MoveDown => app.list.move_down(),
        KeyAction::PrevPage => app.list.prev_page(),
        KeyAction::NextPage => app.list.next_page(),
        KeyAction::Ignore => {}
    }
}

fn handle_modal(app: &mut AppState, key: KeyEvent, requests: &dyn Requests) {
    let Some(modal) = &mut app.modal else {
        app.input_mode = InputMode::Normal;
        return;
    };
    match modal {
        ModalState::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?')) {
                app.close_modal();
            }
        }
        ModalState::Edit(ov) => {
            if key.code == KeyCode::Esc {
                if ov.can_close() {
                    app.close_modal();
                } else {
                    app.notify("Saving... please wait");
                }
                return;
            }
            if form_key(&mut ov.draft, &mut ov.focus, key) == FormKey::Submit && ov.submit(requests) {
                tracing::info!(id = ov.user().id, "update submitted");
            }
        }
        ModalState::DeleteConfirm { target, selected } => match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') | KeyCode::Tab => {
                *selected = 1 - *selected;
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let target = target.clone();
                confirm_delete(app, &target, requests);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.close_modal(),
            KeyCode::Enter => {
                if *selected == 0 {
                    let target = target.clone();
                    confirm_delete(app, &target, requests);
                } else {
                    app.close_modal();
                }
            }
            _ => {}
        },
    }
}

fn confirm_delete(app: &mut AppState, target: &crate::api::User, requests: &dyn Requests) {
    if app.list.confirm_delete(target, requests) {
        tracing::info!(id = target.id, "delete submitted");
    } else {
        app.notify("A delete is already in progress");
    }
    app.close_modal();
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FormKey {
    Handled,
    Submit,
    Ignored,
}

/// Shared text-entry handling for the create form and the edit dialog.
fn form_key(draft: &mut Draft, focus: &mut FormFocus, key: KeyEvent) -> FormKey {
    match key.code {
        KeyCode::Tab | KeyCode::Down => *focus = focus.next(),
        KeyCode::BackTab | KeyCode::Up => *focus = focus.prev(),
        KeyCode::Enter => return FormKey::Submit,
        KeyCode::Backspace => {
            let Some(field) = focus.field() else {
                return FormKey::Ignored;
            };
            draft.field_mut(field).pop();
        }
        KeyCode::Char(c) => {
            let Some(field) = focus.field() else {
                return FormKey::Ignored;
            };
            draft.field_mut(field).push(c);
        }
        _ => return FormKey::Ignored,
    }
    FormKey::Handled
}

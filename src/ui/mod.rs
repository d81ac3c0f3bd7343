pub mod components;
pub mod forms;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::keymap::{KeyAction, Keymap};
use crate::app::{AppState, InputMode, ModalState};

const HEADER_ACTIONS: [(KeyAction, &str); 6] = [
    (KeyAction::OpenHelp, "help"),
    (KeyAction::StartSearch, "search"),
    (KeyAction::FocusCreate, "add"),
    (KeyAction::EditSelection, "edit"),
    (KeyAction::DeleteSelection, "delete"),
    (KeyAction::Quit, "quit"),
];

/// Header key hints from the live bindings. Unbound actions are left out.
pub fn header_hints(keymap: &Keymap) -> String {
    HEADER_ACTIONS
        .iter()
        .filter_map(|(action, label)| {
            let keys = keymap.keys_for(*action);
            (!keys.is_empty()).then(|| format!("{}: {label}", keys.join("/")))
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn render(f: &mut Frame, app: &AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)].as_ref())
        .split(root[1]);

    let prompt = match app.input_mode {
        InputMode::Search => "  typing in search (Enter/Esc: done)",
        InputMode::Create => "  typing in new user form (Esc: back to list)",
        InputMode::Normal | InputMode::Modal => "",
    };
    let p = Paragraph::new(format!(
        "{}  users:{}{prompt}  | {}",
        app.api_base,
        app.list.users().len(),
        header_hints(&app.keymap),
    ))
    .block(
        Block::default()
            .title("userdesk")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    )
    .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, root[0]);

    forms::render_create_panel(f, body[0], app);
    users::render_list_panel(f, body[1], app);

    components::render_status_bar(f, root[2], app);

    if app.modal.is_some() {
        render_modal(f, f.area(), app);
    }
}

fn render_modal(f: &mut Frame, area: Rect, app: &AppState) {
    match &app.modal {
        Some(ModalState::Edit(ov)) => forms::render_edit_modal(f, area, app, ov),
        Some(ModalState::DeleteConfirm { target, selected }) => {
            users::render_delete_modal(f, area, app, target, *selected)
        }
        Some(ModalState::Help) => components::render_help_modal(f, area, app),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_hints_follow_bindings() {
        let hints = header_hints(&Keymap::default());
        assert_eq!(
            hints,
            "?: help  /: search  Tab/n: add  Enter/e: edit  Delete/d: delete  Ctrl+c/q: quit"
        );
        let rebound = header_hints(&Keymap::parse("Quit = x\n"));
        assert!(rebound.ends_with("Ctrl+c/q/x: quit"), "{rebound}");
    }
}

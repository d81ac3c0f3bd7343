//! Shared UI components (status bar, banners, modal helpers).
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::keymap::{KeyAction, describe_action};
use crate::app::{AppState, InputMode};

/// Render the bottom status bar with mode, counts, activity and the last notice.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Create => "CREATE",
        InputMode::Modal => "MODAL",
    };
    let mut activity = Vec::new();
    if app.list.is_refreshing() {
        activity.push("loading");
    }
    if app.create.is_pending() {
        activity.push("adding");
    }
    if app.edit_overlay().is_some_and(|ov| ov.is_pending()) {
        activity.push("saving");
    }
    if !app.list.can_delete() {
        activity.push("deleting");
    }
    let activity_str = if activity.is_empty() {
        String::new()
    } else {
        format!("  busy:[{}]", activity.join(","))
    };
    let notice = app
        .notice_text()
        .map(|n| format!("  {n}"))
        .unwrap_or_default();
    let msg = format!(
        "mode: {mode}  users:{}  rows/page:{}{activity_str}{notice}",
        app.list.users().len(),
        app.list.pagination.page_size(),
    );
    let p = Paragraph::new(msg).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

/// One-line coloured message used for success and error banners.
pub fn banner(text: impl Into<String>, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        text.into(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

const HELP_ACTIONS: [KeyAction; 12] = [
    KeyAction::MoveUp,
    KeyAction::MoveDown,
    KeyAction::PrevPage,
    KeyAction::NextPage,
    KeyAction::CyclePageSize,
    KeyAction::StartSearch,
    KeyAction::FocusCreate,
    KeyAction::EditSelection,
    KeyAction::DeleteSelection,
    KeyAction::Retry,
    KeyAction::OpenHelp,
    KeyAction::Quit,
];

/// Render the help modal listing the active bindings of the users list.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let width = 70u16.min(area.width.saturating_sub(4)).max(50);
    let height = 26u16.min(area.height.saturating_sub(2)).max(12);
    let rect = centered_rect(width, height, area);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "Users list",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
    ];
    for action in HELP_ACTIONS {
        let keys = app.keymap.keys_for(action);
        if keys.is_empty() {
            continue;
        }
        lines.push(Line::from(vec![
            Span::raw(format!("{}: ", describe_action(action))),
            Span::styled(
                keys.join(" / "),
                Style::default().add_modifier(Modifier::ITALIC),
            ),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "Forms and dialogs",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for (what, keys) in [
        ("Next / previous field", "Tab, Down / Shift+Tab, Up"),
        ("Submit", "Enter"),
        ("Leave form or close dialog", "Esc"),
        ("Delete dialog", "y: yes  n: no  Left/Right + Enter"),
    ] {
        lines.push(Line::from(vec![
            Span::raw(format!("{what}: ")),
            Span::styled(keys, Style::default().add_modifier(Modifier::ITALIC)),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::raw("Close help: "),
        Span::styled(
            "Esc / Enter",
            Style::default().add_modifier(Modifier::ITALIC),
        ),
    ]));

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

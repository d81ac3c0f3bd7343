use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};

use crate::api::User;
use crate::app::keymap::KeyAction;
use crate::app::list::ListView;
use crate::app::{AppState, InputMode};
use crate::ui::components::{banner, centered_rect};

pub fn render_list_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .title("Users List")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let banner_height = u16::from(app.list.delete_error().is_some());
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(banner_height),
                Constraint::Min(3),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(inner);

    render_search_bar(f, parts[0], app);
    if let Some(e) = app.list.delete_error() {
        f.render_widget(
            Paragraph::new(banner(format!("Error deleting user: {}", e.message()), app.theme.error)),
            parts[1],
        );
    }
    render_users_table(f, parts[2], app);
    render_pagination(f, parts[3], app);
}

fn render_search_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let searching = app.input_mode == InputMode::Search;
    let text = if searching {
        format!("{}_", app.list.search.text())
    } else if app.list.search.text().is_empty() {
        "Search users by name...".to_string()
    } else {
        app.list.search.text().to_string()
    };
    let style = if searching || !app.list.search.text().is_empty() {
        Style::default().fg(app.theme.text)
    } else {
        Style::default().fg(app.theme.muted)
    };
    let border = if searching { app.theme.highlight_fg } else { app.theme.border };
    let p = Paragraph::new(text).style(style).block(
        Block::default()
            .title("Search")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(p, area);
}

fn first_key(app: &AppState, action: KeyAction) -> String {
    app.keymap.keys_for(action).into_iter().next().unwrap_or_default()
}

pub fn render_users_table(f: &mut Frame, area: Rect, app: &AppState) {
    let rows = match app.list.view() {
        ListView::Loading => {
            let p = Paragraph::new("Loading users...").style(Style::default().fg(app.theme.info));
            f.render_widget(p, area);
            return;
        }
        ListView::Error { message, retrying } => {
            let retry = if retrying {
                "Retrying...".to_string()
            } else {
                format!("Press {} to retry", first_key(app, KeyAction::Retry))
            };
            let lines = vec![
                banner(format!("Error loading users: {message}"), app.theme.error),
                Line::raw(""),
                Line::from(Span::styled(retry, Style::default().fg(app.theme.muted))),
            ];
            f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
            return;
        }
        ListView::NoResults { term } => {
            let p = Paragraph::new(format!("No users found matching \"{term}\""))
                .style(Style::default().fg(app.theme.muted));
            f.render_widget(p, area);
            return;
        }
        ListView::Rows { rows, .. } => rows,
    };

    let busy = !app.list.can_delete();
    let table_rows = rows.iter().enumerate().map(|(i, u)| {
        let style = if i == app.list.selected && app.input_mode == InputMode::Normal {
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        let actions = if app.list.is_deleting(u.id) {
            "Deleting...".to_string()
        } else if busy {
            "edit".to_string()
        } else {
            "edit  delete".to_string()
        };
        Row::new(vec![
            Cell::from(Line::from(vec![
                Span::raw(format!("{} {}  ", u.initial(), u.name)),
                Span::styled(format!("ID: {}", u.id), Style::default().fg(app.theme.muted)),
            ])),
            Cell::from(u.email.clone()),
            Cell::from(u.company_label().to_string()),
            Cell::from(actions),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Percentage(32),
        Constraint::Percentage(30),
        Constraint::Percentage(23),
        Constraint::Percentage(15),
    ];
    let header = Row::new(vec!["User", "Email", "Company", "Actions"]).style(
        Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD),
    );
    let table = Table::new(table_rows, widths)
        .header(header)
        .column_spacing(1);
    f.render_widget(table, area);
}

fn render_pagination(f: &mut Frame, area: Rect, app: &AppState) {
    let total = app.list.users().len();
    let pagination = &app.list.pagination;
    let refreshing = if app.list.is_refreshing() { "  refreshing..." } else { "" };
    let text = format!(
        "Rows per page: {}   {}   page {}/{}{refreshing}",
        pagination.page_size(),
        pagination.label(total),
        pagination.page_index() + 1,
        pagination.page_count(total).max(1),
    );
    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(app.theme.muted)),
        area,
    );
}

/// Confirmation dialog naming the user about to be deleted.
pub fn render_delete_modal(f: &mut Frame, area: Rect, app: &AppState, target: &User, selected: usize) {
    let rect = centered_rect(52, 10, area);
    let mut lines = vec![
        Line::raw("Are you sure you want to delete this user?"),
        Line::raw(""),
        Line::from(Span::styled(
            target.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(target.email.clone(), Style::default().fg(app.theme.muted))),
        Line::raw(""),
    ];
    let options = ["Yes", "No"];
    let mut spans = Vec::new();
    for (idx, label) in options.iter().enumerate() {
        if idx == selected {
            spans.push(Span::styled(
                format!("▶ {label}   "),
                Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(format!("  {label}   ")));
        }
    }
    lines.push(Line::from(spans));
    let p = Paragraph::new(lines).block(
        Block::default()
            .title("Delete User")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

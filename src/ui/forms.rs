//! Create panel and the edit dialog. Both draw the same two-field form.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::api::Draft;
use crate::app::create::CreatePhase;
use crate::app::edit::EditOverlay;
use crate::app::{AppState, FormFocus, InputMode, Theme};
use crate::ui::components::{banner, centered_rect};
use crate::validate;

struct FormView<'a> {
    draft: &'a Draft,
    focus: FormFocus,
    /// Whether keys currently go to this form.
    active: bool,
    button: &'a str,
    can_submit: bool,
}

fn form_lines(form: FormView<'_>, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let fields = [
        (FormFocus::Name, "Name", &form.draft.name, validate::name_hint(&form.draft.name)),
        (FormFocus::Email, "Email", &form.draft.email, validate::email_hint(&form.draft.email)),
    ];
    for (focus, label, value, hint) in fields {
        let focused = form.active && form.focus == focus;
        let marker = if focused { "▶ " } else { "  " };
        let cursor = if focused { "_" } else { "" };
        let style = if focused {
            Style::default().fg(theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{label}: "), style),
            Span::styled(format!("{value}{cursor}"), Style::default().fg(theme.text)),
        ]));
        match hint {
            Some(h) => lines.push(Line::from(Span::styled(
                format!("    {h}"),
                Style::default().fg(theme.error),
            ))),
            None => lines.push(Line::raw("")),
        }
    }
    let button_focused = form.active && form.focus == FormFocus::Submit;
    let mut button_style = if form.can_submit {
        Style::default().fg(theme.title).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.muted)
    };
    if button_focused {
        button_style = button_style.add_modifier(Modifier::REVERSED);
    }
    let marker = if button_focused { "▶ " } else { "  " };
    lines.push(Line::from(Span::styled(
        format!("{marker}[ {} ]", form.button),
        button_style,
    )));
    lines
}

pub fn render_create_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let panel = &app.create;
    let phase = panel.phase();
    let button = if phase == CreatePhase::Submitting { "Adding User..." } else { "Add User" };
    let mut lines = form_lines(
        FormView {
            draft: &panel.draft,
            focus: panel.focus,
            active: app.input_mode == InputMode::Create,
            button,
            can_submit: panel.can_submit(),
        },
        &app.theme,
    );
    lines.push(Line::raw(""));
    match phase {
        CreatePhase::Failed => {
            let msg = panel.error().map(|e| e.message().to_string()).unwrap_or_default();
            lines.push(banner(format!("Error adding user: {msg}"), app.theme.error));
        }
        CreatePhase::Succeeded => {
            lines.push(banner("User added successfully!", app.theme.success));
        }
        CreatePhase::Idle | CreatePhase::Submitting => {}
    }

    let border = if app.input_mode == InputMode::Create {
        app.theme.highlight_fg
    } else {
        app.theme.border
    };
    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Add New User")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(p, area);
}

pub fn render_edit_modal(f: &mut Frame, area: Rect, app: &AppState, ov: &EditOverlay) {
    let rect = centered_rect(56, 13, area);
    let mut lines = vec![
        Line::from(Span::styled(
            format!("ID: {}", ov.user().id),
            Style::default().fg(app.theme.muted),
        )),
        Line::raw(""),
    ];
    lines.extend(form_lines(
        FormView {
            draft: &ov.draft,
            focus: ov.focus,
            active: true,
            button: if ov.is_pending() { "Saving..." } else { "Save" },
            can_submit: ov.can_submit(),
        },
        &app.theme,
    ));
    if let Some(e) = ov.error() {
        lines.push(banner(format!("Error updating user: {}", e.message()), app.theme.error));
    } else if ov.show_success() {
        lines.push(banner("User updated successfully!", app.theme.success));
    } else {
        let hint = if ov.can_close() { "Esc: cancel" } else { "Saving... please wait" };
        lines.push(Line::from(Span::styled(hint, Style::default().fg(app.theme.muted))));
    }

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Edit User")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

// SPDX-License-Identifier: GPL-3.0-or-later
// rpnotes - Rendering

use crate::app::{App, Focus};
use crate::config::key_display_string;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;
use std::collections::HashSet;

/// Build a Line with search match highlighting. Indices are character positions.
fn build_highlighted_line(
    text: &str,
    match_indices: &[u32],
    base_style: Style,
    match_style: Style,
) -> Line<'static> {
    if match_indices.is_empty() {
        return Line::from(Span::styled(text.to_string(), base_style));
    }
    let match_set: HashSet<u32> = match_indices.iter().copied().collect();
    let spans: Vec<Span> = text
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let style = if match_set.contains(&(i as u32)) {
                match_style
            } else {
                base_style
            };
            Span::styled(c.to_string(), style)
        })
        .collect();
    Line::from(spans)
}

fn border_for(app: &App, focused: bool) -> Style {
    if focused {
        app.theme.border_active_style
    } else {
        app.theme.border_inactive_style
    }
}

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    frame.render_widget(
        Block::default().style(app.theme.app_background_style),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(area);

    draw_header(frame, app, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(chunks[1]);
    draw_notes_list(frame, app, main_chunks[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(4)])
        .split(main_chunks[1]);
    draw_session_details(frame, app, right[0]);
    draw_editor(frame, app, right[1]);

    draw_footer(frame, app, chunks[2]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let name = app.session.note.file_name.trim();
    let mut spans = vec![
        Span::styled("rpnotes", app.theme.header_style),
        Span::styled(" │ ", app.theme.label_style),
        Span::styled(
            if name.is_empty() { "(unnamed)" } else { name }.to_string(),
            app.theme.text_style,
        ),
    ];
    if app.session.is_dirty() {
        spans.push(Span::styled(" [modified]", app.theme.dirty_style));
    }
    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(app.theme.border_inactive_style),
    );
    frame.render_widget(header, area);
}

fn draw_notes_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List | Focus::Filter);

    let items: Vec<ListItem> = app
        .filtered_notes
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let base_style = if i == app.selected && focused {
                app.theme.selected_style
            } else if name.eq_ignore_ascii_case(&app.session.note.file_name) {
                app.theme.header_style
            } else {
                app.theme.text_style
            };
            let indices = app.match_indices.get(i).map(Vec::as_slice).unwrap_or_default();
            ListItem::new(build_highlighted_line(
                name,
                indices,
                base_style,
                app.theme.search_match_style,
            ))
        })
        .collect();

    let title = if app.focus == Focus::Filter {
        format!(" / {} ", app.search_query)
    } else {
        format!(" Notes: {} ", app.all_notes.len())
    };
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_for(app, focused)),
    );
    frame.render_widget(list, area);
}

fn draw_session_details(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Fields;
    let lines: Vec<Line> = app
        .form_rows()
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let selected = focused && i == app.form_selected;
            let value_style = if selected {
                app.theme.selected_style
            } else {
                app.theme.text_style
            };
            let mut spans = vec![
                Span::styled(format!("{:>16}: ", row.label()), app.theme.label_style),
                Span::styled(app.form_value(row).to_string(), value_style),
            ];
            if selected {
                spans.push(Span::styled(" ", app.theme.cursor_style));
            }
            Line::from(spans)
        })
        .collect();

    let block = Block::default()
        .title(" Session Details ")
        .borders(Borders::ALL)
        .border_style(border_for(app, focused));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_editor(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Editor;
    let mut textarea = app.textarea.clone();
    textarea.set_block(
        Block::default()
            .title(" Note ")
            .borders(Borders::ALL)
            .border_style(border_for(app, focused)),
    );
    if !focused {
        textarea.set_cursor_style(app.theme.text_style);
    }
    frame.render_widget(&textarea, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let keys = &app.config.keys;
    let autosave = if app.config.autosave.enabled {
        format!(
            "autosave {}s",
            app.session.policy().effective_interval().as_secs()
        )
    } else {
        "autosave off".to_string()
    };

    let mut status_spans = Vec::new();
    if let Some(msg) = &app.session.status {
        status_spans.push(Span::styled(msg.clone(), app.theme.status_style));
    }
    if app.save_indicator_until.is_some() {
        if let Some(at) = &app.last_saved_at {
            status_spans.push(Span::styled(format!("  (at {})", at), app.theme.label_style));
        }
    }

    let help = format!(
        "{} save │ {} save as │ {} new │ {} delete │ {} pane │ {} {} ({}/{}) │ {} quit",
        key_display_string(&keys.save),
        key_display_string(&keys.save_as),
        key_display_string(&keys.new_note),
        key_display_string(&keys.delete),
        key_display_string(&keys.next_pane),
        key_display_string(&keys.toggle_autosave),
        autosave,
        key_display_string(&keys.autosave_shorter),
        key_display_string(&keys.autosave_longer),
        key_display_string(&keys.quit),
    );

    let footer = Paragraph::new(vec![
        Line::from(status_spans),
        Line::from(Span::styled(help, app.theme.help_text_style)),
    ])
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(app.theme.border_inactive_style),
    );
    frame.render_widget(footer, area);
}

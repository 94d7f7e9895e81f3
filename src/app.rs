// SPDX-License-Identifier: GPL-3.0-or-later
// rpnotes - Application state for the terminal front end

use crate::autosave::AutosavePolicy;
use crate::config::{load_session_state, save_config, save_session_state, Config, ResolvedKeys};
use crate::note::Field;
use crate::search::{filter_names, get_match_indices};
use crate::session::{PersistFn, SaveMode, Session};
use crate::store::NoteStore;
use crate::theme::ResolvedTheme;
use anyhow::Result;
use chrono::Local;
use nucleo_matcher::{Config as MatcherConfig, Matcher};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tui_textarea::{CursorMove, Input, TextArea};

/// Longest value accepted in a single-line field.
const MAX_FIELD_CHARS: usize = 128;

/// Seconds added or removed per autosave interval key press.
pub const INTERVAL_STEP: i64 = 5;

/// Which pane has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    /// Typing a filter for the notes list (/).
    Filter,
    Fields,
    Editor,
}

/// A row of the session details form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRow {
    File,
    Meta(Field),
}

impl FormRow {
    pub fn all() -> Vec<FormRow> {
        std::iter::once(FormRow::File)
            .chain(Field::all().iter().copied().map(FormRow::Meta))
            .collect()
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormRow::File => "File",
            FormRow::Meta(f) => f.label(),
        }
    }
}

/// Main application state.
pub struct App {
    pub config: Config,
    pub config_dir: PathBuf,
    pub resolved_keys: ResolvedKeys,
    pub theme: ResolvedTheme,
    pub session: Session,

    pub all_notes: Vec<String>,
    pub filtered_notes: Vec<String>,
    pub match_indices: Vec<Vec<u32>>,
    pub selected: usize,
    pub search_query: String,
    matcher: Matcher,

    pub focus: Focus,
    pub form_selected: usize,
    pub textarea: TextArea<'static>,

    pub save_indicator_until: Option<Instant>,
    pub last_saved_at: Option<String>,
}

impl App {
    pub fn new(config_dir: PathBuf, config: Config, notes_dir: PathBuf) -> Result<Self> {
        let theme = ResolvedTheme::from_config(&config.theme)?;
        let resolved_keys = ResolvedKeys::from_config(&config.keys);

        let store = NoteStore::new(notes_dir);
        let state = load_session_state(&config_dir);
        let persist_dir = config_dir.clone();
        let persist: PersistFn = Box::new(move |s| save_session_state(&persist_dir, s));
        let session = Session::restore(
            store,
            AutosavePolicy::from_config(&config.autosave),
            state,
            persist,
        );

        let mut app = Self {
            config,
            config_dir,
            resolved_keys,
            theme,
            session,
            all_notes: Vec::new(),
            filtered_notes: Vec::new(),
            match_indices: Vec::new(),
            selected: 0,
            search_query: String::new(),
            matcher: Matcher::new(MatcherConfig::DEFAULT.match_paths()),
            focus: Focus::List,
            form_selected: 0,
            textarea: TextArea::default(),
            save_indicator_until: None,
            last_saved_at: None,
        };
        app.reload_textarea();
        app.refresh_notes();
        app.select_current_note();
        Ok(app)
    }

    /// Re-read the notes directory, keeping the filter.
    pub fn refresh_notes(&mut self) {
        match self.session.store().list() {
            Ok(names) => self.all_notes = names,
            Err(e) => {
                tracing::warn!(error = %e, "cannot list notes");
                self.session.status = Some(format!("Cannot read notes folder: {}", e));
                self.all_notes.clear();
            }
        }
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        self.filtered_notes = filter_names(&self.all_notes, &self.search_query, &mut self.matcher);
        self.match_indices = self
            .filtered_notes
            .iter()
            .map(|n| get_match_indices(n, &self.search_query, &mut self.matcher))
            .collect();
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        if self.filtered_notes.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.filtered_notes.len() {
            self.selected = self.filtered_notes.len() - 1;
        }
    }

    /// Highlight the note currently open in the editor, if it is listed.
    fn select_current_note(&mut self) {
        let current = &self.session.note.file_name;
        if let Some(i) = self
            .filtered_notes
            .iter()
            .position(|n| n.eq_ignore_ascii_case(current))
        {
            self.selected = i;
        }
    }

    pub fn move_selection_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        if self.selected + 1 < self.filtered_notes.len() {
            self.selected += 1;
        }
    }

    pub fn enter_search_mode(&mut self) {
        self.focus = Focus::Filter;
    }

    pub fn exit_search_mode(&mut self) {
        self.search_query.clear();
        self.apply_filter();
        self.select_current_note();
        self.focus = Focus::List;
    }

    pub fn search_add_char(&mut self, c: char) {
        self.search_query.push(c);
        self.selected = 0;
        self.apply_filter();
    }

    pub fn search_backspace(&mut self) {
        self.search_query.pop();
        self.apply_filter();
    }

    pub fn get_selected_name(&self) -> Option<String> {
        self.filtered_notes.get(self.selected).cloned()
    }

    /// Open the highlighted note in the editor.
    pub fn load_selected(&mut self) {
        let Some(name) = self.get_selected_name() else { return };
        if self.session.load(&name) {
            self.reload_textarea();
            self.focus = Focus::Editor;
        }
    }

    /// Rebuild the editor widget from the session body.
    pub fn reload_textarea(&mut self) {
        let lines: Vec<String> = self.session.note.body.split('\n').map(String::from).collect();
        let mut textarea = TextArea::new(lines);
        textarea.set_max_histories(50);
        textarea.set_style(self.theme.text_style);
        textarea.set_cursor_style(self.theme.cursor_style);
        textarea.set_cursor_line_style(ratatui::style::Style::default());
        textarea.move_cursor(CursorMove::Bottom);
        textarea.move_cursor(CursorMove::End);
        self.textarea = textarea;
    }

    /// Feed a key to the editor and push the result into the session.
    pub fn editor_input(&mut self, input: Input) {
        if !self.textarea.input(input) {
            return;
        }
        let body = self.textarea.lines().join("\n");
        if !self.session.set_body(body) {
            self.reload_textarea();
            self.session.status = Some("Note is at the size limit.".to_string());
        }
    }

    pub fn form_rows(&self) -> Vec<FormRow> {
        FormRow::all()
    }

    pub fn form_value(&self, row: FormRow) -> &str {
        match row {
            FormRow::File => &self.session.note.file_name,
            FormRow::Meta(f) => self.session.metadata().get(f),
        }
    }

    fn selected_row(&self) -> FormRow {
        let rows = self.form_rows();
        rows[self.form_selected.min(rows.len() - 1)]
    }

    pub fn form_move_up(&mut self) {
        self.form_selected = self.form_selected.saturating_sub(1);
    }

    pub fn form_move_down(&mut self) {
        if self.form_selected + 1 < self.form_rows().len() {
            self.form_selected += 1;
        }
    }

    pub fn form_add_char(&mut self, c: char) {
        let row = self.selected_row();
        let mut value = self.form_value(row).to_string();
        if value.chars().count() >= MAX_FIELD_CHARS {
            return;
        }
        value.push(c);
        self.set_form_value(row, value);
    }

    pub fn form_backspace(&mut self) {
        let row = self.selected_row();
        let mut value = self.form_value(row).to_string();
        if value.pop().is_some() {
            self.set_form_value(row, value);
        }
    }

    fn set_form_value(&mut self, row: FormRow, value: String) {
        match row {
            FormRow::File => self.session.set_file_name(value),
            FormRow::Meta(f) => self.session.set_field(f, value),
        }
    }

    pub fn next_focus(&mut self) {
        self.focus = match self.focus {
            Focus::List | Focus::Filter => Focus::Fields,
            Focus::Fields => Focus::Editor,
            Focus::Editor => Focus::List,
        };
    }

    pub fn new_note(&mut self) {
        self.session.new_note();
        self.reload_textarea();
        self.focus = Focus::Fields;
        self.form_selected = 0;
    }

    pub fn save(&mut self, mode: SaveMode) {
        if self.session.save(mode, Instant::now()) {
            self.mark_saved();
        }
    }

    pub fn delete_current(&mut self) {
        if self.session.delete() {
            self.reload_textarea();
            self.refresh_notes();
            self.focus = Focus::List;
        }
    }

    /// Flip autosave and write it back to config.toml.
    pub fn toggle_autosave(&mut self) {
        self.config.autosave.enabled = !self.config.autosave.enabled;
        let state = if self.config.autosave.enabled { "on" } else { "off" };
        self.apply_autosave_config(format!("Autosave {}.", state));
    }

    /// Lengthen (positive) or shorten (negative) the autosave interval.
    pub fn adjust_autosave_interval(&mut self, delta: i64) {
        self.config.autosave.adjust_interval(delta);
        let msg = format!(
            "Autosave every {}s.",
            self.config.autosave.interval_seconds
        );
        self.apply_autosave_config(msg);
    }

    fn apply_autosave_config(&mut self, msg: String) {
        self.session
            .set_policy(AutosavePolicy::from_config(&self.config.autosave));
        self.session.status = Some(match save_config(&self.config_dir, &self.config) {
            Ok(()) => msg,
            Err(e) => {
                tracing::warn!(error = %e, "could not write config");
                format!("{} (not saved: {})", msg, e)
            }
        });
    }

    /// Open the highlighted match and drop the filter.
    pub fn confirm_search(&mut self) {
        let name = self.get_selected_name();
        self.exit_search_mode();
        let Some(name) = name else { return };
        if let Some(i) = self.filtered_notes.iter().position(|n| *n == name) {
            self.selected = i;
            self.load_selected();
        }
    }

    /// Autosave check for this tick. Returns true if a save was attempted.
    pub fn check_auto_save(&mut self) -> bool {
        if !self.session.tick(Instant::now()) {
            return false;
        }
        if !self.session.is_dirty() {
            self.mark_saved();
        }
        true
    }

    fn mark_saved(&mut self) {
        self.last_saved_at = Some(Local::now().format("%H:%M:%S").to_string());
        self.save_indicator_until = Some(Instant::now() + Duration::from_secs(2));
        self.refresh_notes();
        self.select_current_note();
    }

    /// Clear the "saved" indicator when expired.
    pub fn tick_save_indicator(&mut self) {
        if let Some(until) = self.save_indicator_until {
            if Instant::now() >= until {
                self.save_indicator_until = None;
            }
        }
    }

    /// Flush unsaved edits of a named note before exiting.
    pub fn save_before_quit(&mut self) {
        if self.session.is_dirty() && !self.session.note.file_name.trim().is_empty() {
            self.session.save(SaveMode::Save, Instant::now());
        }
    }
}

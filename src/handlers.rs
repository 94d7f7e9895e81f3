// SPDX-License-Identifier: GPL-3.0-or-later
// rpnotes - Input handling: key dispatch per focused pane

use crate::app::{App, Focus, INTERVAL_STEP};
use crate::session::SaveMode;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_textarea::Input;

/// Returns true if the pressed key matches any of the given keys (code + modifiers only).
pub fn key_matches(event: KeyEvent, keys: &[KeyEvent]) -> bool {
    keys.iter()
        .any(|k| event.code == k.code && event.modifiers == k.modifiers)
}

/// What the event loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Plain character input, allowing shift for capitals.
fn typed_char(key: KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c)
            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
        {
            Some(c)
        }
        _ => None,
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> Flow {
    let k = app.resolved_keys.clone();

    // Global
    if key_matches(key, &[k.quit]) {
        app.save_before_quit();
        return Flow::Quit;
    }
    if key_matches(key, &[k.save]) {
        app.save(SaveMode::Save);
        return Flow::Continue;
    }
    if key_matches(key, &[k.save_as]) {
        app.save(SaveMode::SaveAs);
        return Flow::Continue;
    }
    if key_matches(key, &[k.new_note]) {
        app.new_note();
        return Flow::Continue;
    }
    if key_matches(key, &[k.delete]) {
        app.delete_current();
        return Flow::Continue;
    }
    if key_matches(key, &[k.refresh]) {
        app.refresh_notes();
        return Flow::Continue;
    }
    if key_matches(key, &[k.toggle_autosave]) {
        app.toggle_autosave();
        return Flow::Continue;
    }
    if key_matches(key, &[k.autosave_longer]) {
        app.adjust_autosave_interval(INTERVAL_STEP);
        return Flow::Continue;
    }
    if key_matches(key, &[k.autosave_shorter]) {
        app.adjust_autosave_interval(-INTERVAL_STEP);
        return Flow::Continue;
    }
    if app.focus != Focus::Filter && key_matches(key, &[k.next_pane]) {
        app.next_focus();
        return Flow::Continue;
    }

    match app.focus {
        Focus::List => {
            if key_matches(key, &[k.search]) {
                app.enter_search_mode();
            } else if key_matches(key, &[k.move_up, k.move_up_alt]) {
                app.move_selection_up();
            } else if key_matches(key, &[k.move_down, k.move_down_alt]) {
                app.move_selection_down();
            } else if key_matches(key, &[k.enter]) {
                app.load_selected();
            }
        }
        Focus::Filter => {
            if key_matches(key, &[k.escape]) {
                app.exit_search_mode();
            } else if key_matches(key, &[k.enter]) {
                app.confirm_search();
            } else if key_matches(key, &[k.backspace]) {
                app.search_backspace();
            } else if key_matches(key, &[k.move_up_alt]) {
                app.move_selection_up();
            } else if key_matches(key, &[k.move_down_alt]) {
                app.move_selection_down();
            } else if let Some(c) = typed_char(key) {
                app.search_add_char(c);
            }
        }
        Focus::Fields => {
            if key_matches(key, &[k.escape]) {
                app.focus = Focus::List;
            } else if key_matches(key, &[k.move_up_alt]) {
                app.form_move_up();
            } else if key_matches(key, &[k.move_down_alt, k.enter]) {
                app.form_move_down();
            } else if key_matches(key, &[k.backspace]) {
                app.form_backspace();
            } else if let Some(c) = typed_char(key) {
                app.form_add_char(c);
            }
        }
        Focus::Editor => {
            if key_matches(key, &[k.escape]) {
                app.focus = Focus::List;
            } else {
                let input: Input = key.into();
                app.editor_input(input);
            }
        }
    }
    Flow::Continue
}

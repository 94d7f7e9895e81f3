// SPDX-License-Identifier: GPL-3.0-or-later
// rpnotes - Configuration and persisted session state

use crate::autosave::MIN_INTERVAL_SECS;
use crate::note::Metadata;
use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.toml";
pub const SESSION_FILE: &str = "session.toml";

/// Colors for the UI. Hex (#RRGGBB) or named colors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub background: String,
    pub foreground: String,
    pub accent: String,
    pub selection: String,
    pub border_color: String,
    pub inactive_border: String,
    pub status: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background: "black".to_string(),
            foreground: "white".to_string(),
            accent: "yellow".to_string(),
            selection: "green".to_string(),
            border_color: "cyan".to_string(),
            inactive_border: "dark_gray".to_string(),
            status: "magenta".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    pub enabled: bool,
    /// Seconds between autosaves. Values below the minimum are raised to it.
    pub interval_seconds: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_seconds: 60,
        }
    }
}

impl AutosaveConfig {
    fn normalized(mut self) -> Self {
        self.interval_seconds = self.interval_seconds.max(MIN_INTERVAL_SECS);
        self
    }

    /// Move the interval by `delta` seconds, never below the minimum.
    pub fn adjust_interval(&mut self, delta: i64) {
        self.interval_seconds = self
            .interval_seconds
            .saturating_add_signed(delta)
            .max(MIN_INTERVAL_SECS);
    }
}

/// Keybindings configuration (string form, e.g. "ctrl-s", "enter").
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    pub quit: String,
    pub save: String,
    pub save_as: String,
    pub new_note: String,
    pub delete: String,
    pub refresh: String,
    pub toggle_autosave: String,
    pub autosave_longer: String,
    pub autosave_shorter: String,
    pub next_pane: String,
    pub search: String,
    pub escape: String,
    pub enter: String,
    pub backspace: String,
    pub move_up: String,
    pub move_down: String,
    pub move_up_alt: String,
    pub move_down_alt: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            quit: "ctrl-q".to_string(),
            save: "ctrl-s".to_string(),
            save_as: "alt-s".to_string(),
            new_note: "ctrl-n".to_string(),
            delete: "ctrl-d".to_string(),
            refresh: "ctrl-r".to_string(),
            toggle_autosave: "alt-a".to_string(),
            autosave_longer: "alt-right".to_string(),
            autosave_shorter: "alt-left".to_string(),
            next_pane: "tab".to_string(),
            search: "/".to_string(),
            escape: "esc".to_string(),
            enter: "enter".to_string(),
            backspace: "backspace".to_string(),
            move_up: "k".to_string(),
            move_down: "j".to_string(),
            move_up_alt: "up".to_string(),
            move_down_alt: "down".to_string(),
        }
    }
}

/// Parses a key string (e.g. "ctrl-q", "enter", "f1") into a KeyEvent.
pub fn parse_key_event(s: &str) -> Option<KeyEvent> {
    let s = s.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }
    let parts: Vec<&str> = s.split('-').collect();
    let (modifiers, key_part) = match parts.split_last() {
        Some((key, mods)) if !mods.is_empty() && !key.is_empty() => {
            let mut m = KeyModifiers::empty();
            for p in mods {
                match *p {
                    "ctrl" => m.insert(KeyModifiers::CONTROL),
                    "alt" => m.insert(KeyModifiers::ALT),
                    "shift" => m.insert(KeyModifiers::SHIFT),
                    _ => return None,
                }
            }
            (m, *key)
        }
        _ => (KeyModifiers::empty(), s.as_str()),
    };

    let code = match key_part {
        "enter" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "delete" => KeyCode::Delete,
        "space" => KeyCode::Char(' '),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        f if f.len() > 1 && f.starts_with('f') => {
            let n: u8 = f[1..].parse().ok()?;
            if !(1..=12).contains(&n) {
                return None;
            }
            KeyCode::F(n)
        }
        _ => {
            let mut chars = key_part.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        }
    };

    Some(KeyEvent::new(code, modifiers))
}

/// Resolved keybindings (parsed KeyEvents for fast comparison).
#[derive(Debug, Clone)]
pub struct ResolvedKeys {
    pub quit: KeyEvent,
    pub save: KeyEvent,
    pub save_as: KeyEvent,
    pub new_note: KeyEvent,
    pub delete: KeyEvent,
    pub refresh: KeyEvent,
    pub toggle_autosave: KeyEvent,
    pub autosave_longer: KeyEvent,
    pub autosave_shorter: KeyEvent,
    pub next_pane: KeyEvent,
    pub search: KeyEvent,
    pub escape: KeyEvent,
    pub enter: KeyEvent,
    pub backspace: KeyEvent,
    pub move_up: KeyEvent,
    pub move_down: KeyEvent,
    pub move_up_alt: KeyEvent,
    pub move_down_alt: KeyEvent,
}

impl ResolvedKeys {
    pub fn from_config(keys: &KeysConfig) -> Self {
        fn parse_or(s: &str, code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
            parse_key_event(s).unwrap_or(KeyEvent::new(code, modifiers))
        }
        let none = KeyModifiers::empty();
        let ctrl = KeyModifiers::CONTROL;
        let alt = KeyModifiers::ALT;

        Self {
            quit: parse_or(&keys.quit, KeyCode::Char('q'), ctrl),
            save: parse_or(&keys.save, KeyCode::Char('s'), ctrl),
            save_as: parse_or(&keys.save_as, KeyCode::Char('s'), alt),
            new_note: parse_or(&keys.new_note, KeyCode::Char('n'), ctrl),
            delete: parse_or(&keys.delete, KeyCode::Char('d'), ctrl),
            refresh: parse_or(&keys.refresh, KeyCode::Char('r'), ctrl),
            toggle_autosave: parse_or(&keys.toggle_autosave, KeyCode::Char('a'), alt),
            autosave_longer: parse_or(&keys.autosave_longer, KeyCode::Right, alt),
            autosave_shorter: parse_or(&keys.autosave_shorter, KeyCode::Left, alt),
            next_pane: parse_or(&keys.next_pane, KeyCode::Tab, none),
            search: parse_or(&keys.search, KeyCode::Char('/'), none),
            escape: parse_or(&keys.escape, KeyCode::Esc, none),
            enter: parse_or(&keys.enter, KeyCode::Enter, none),
            backspace: parse_or(&keys.backspace, KeyCode::Backspace, none),
            move_up: parse_or(&keys.move_up, KeyCode::Char('k'), none),
            move_down: parse_or(&keys.move_down, KeyCode::Char('j'), none),
            move_up_alt: parse_or(&keys.move_up_alt, KeyCode::Up, none),
            move_down_alt: parse_or(&keys.move_down_alt, KeyCode::Down, none),
        }
    }
}

/// Formats a key config string for display (e.g. "ctrl-q" -> "Ctrl+Q").
pub fn key_display_string(s: &str) -> String {
    let s = s.trim();
    if s.is_empty() {
        return String::new();
    }
    let parts: Vec<&str> = s.split('-').collect();
    let (mods, key_part) = match parts.split_last() {
        Some((key, mods)) if !mods.is_empty() && !key.is_empty() => {
            let mods: Vec<&str> = mods
                .iter()
                .map(|p| match *p {
                    "ctrl" => "Ctrl",
                    "alt" => "Alt",
                    "shift" => "Shift",
                    other => other,
                })
                .collect();
            (mods.join("+"), *key)
        }
        _ => (String::new(), s),
    };

    let key_display = match key_part.to_lowercase().as_str() {
        "enter" => "Enter".to_string(),
        "esc" | "escape" => "Esc".to_string(),
        "backspace" => "Backspace".to_string(),
        "tab" => "Tab".to_string(),
        "delete" => "Delete".to_string(),
        "space" => "Space".to_string(),
        "up" => "↑".to_string(),
        "down" => "↓".to_string(),
        "left" => "←".to_string(),
        "right" => "→".to_string(),
        _ => key_part.to_uppercase(),
    };

    if mods.is_empty() {
        key_display
    } else {
        format!("{}+{}", mods, key_display)
    }
}

/// Settings loaded from config.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding note files. Empty means `<config dir>/notes`.
    pub notes_directory: String,
    pub autosave: AutosaveConfig,
    pub theme: ThemeConfig,
    pub keys: KeysConfig,
}

impl Config {
    pub fn notes_dir(&self, config_dir: &Path) -> PathBuf {
        if self.notes_directory.trim().is_empty() {
            config_dir.join("notes")
        } else {
            expand_path(&self.notes_directory)
        }
    }
}

/// Returns the rpnotes config directory (~/.config/rpnotes).
/// Creates it if it does not exist.
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "rpnotes")
        .context("Could not determine XDG config directory")?;
    let config_dir = dirs.config_dir().to_path_buf();
    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;
    Ok(config_dir)
}

/// Load config.toml from `config_dir`, writing the default file if missing.
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let config_path = config_dir.join(CONFIG_FILE);

    let config: Config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", config_path.display()))?
    } else {
        let default = Config::default();
        save_config(config_dir, &default)?;
        default
    };

    Ok(Config {
        autosave: config.autosave.normalized(),
        ..config
    })
}

/// Write config.toml, keeping the commented layout.
pub fn save_config(config_dir: &Path, config: &Config) -> Result<()> {
    let config_path = config_dir.join(CONFIG_FILE);
    fs::write(&config_path, generate_config(config))
        .with_context(|| format!("Failed to write config: {}", config_path.display()))
}

fn generate_config(config: &Config) -> String {
    fn toml_str(s: &str) -> String {
        toml::Value::String(s.to_string()).to_string()
    }
    let a = &config.autosave;
    let t = &config.theme;
    let k = &config.keys;
    format!(
        r#"# rpnotes configuration

# Directory where note files are stored. Leave empty to keep them in the
# "notes" folder next to this file.
notes_directory = {}

[autosave]
enabled = {}
# Seconds between autosaves (minimum {})
interval_seconds = {}

[theme]
# Hex (#RRGGBB) or named colors
background = {}
foreground = {}
accent = {}
selection = {}
border_color = {}
inactive_border = {}
status = {}

[keys]
quit = {}
save = {}
save_as = {}
new_note = {}
delete = {}
refresh = {}
toggle_autosave = {}
autosave_longer = {}
autosave_shorter = {}
next_pane = {}
search = {}
escape = {}
enter = {}
backspace = {}
move_up = {}
move_down = {}
move_up_alt = {}
move_down_alt = {}
"#,
        toml_str(&config.notes_directory),
        a.enabled,
        MIN_INTERVAL_SECS,
        a.interval_seconds,
        toml_str(&t.background),
        toml_str(&t.foreground),
        toml_str(&t.accent),
        toml_str(&t.selection),
        toml_str(&t.border_color),
        toml_str(&t.inactive_border),
        toml_str(&t.status),
        toml_str(&k.quit),
        toml_str(&k.save),
        toml_str(&k.save_as),
        toml_str(&k.new_note),
        toml_str(&k.delete),
        toml_str(&k.refresh),
        toml_str(&k.toggle_autosave),
        toml_str(&k.autosave_longer),
        toml_str(&k.autosave_shorter),
        toml_str(&k.next_pane),
        toml_str(&k.search),
        toml_str(&k.escape),
        toml_str(&k.enter),
        toml_str(&k.backspace),
        toml_str(&k.move_up),
        toml_str(&k.move_down),
        toml_str(&k.move_up_alt),
        toml_str(&k.move_down_alt),
    )
}

/// What the editor remembers between runs, stored in session.toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub current_note_file_name: String,
    pub last_note_text: String,
    pub metadata: Metadata,
}

/// Load session.toml. A missing or unreadable file starts a fresh session.
pub fn load_session_state(config_dir: &Path) -> SessionState {
    let path = config_dir.join(SESSION_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return SessionState::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read session state");
            return SessionState::default();
        }
    };
    match toml::from_str(&content) {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable session state");
            SessionState::default()
        }
    }
}

pub fn save_session_state(config_dir: &Path, state: &SessionState) -> Result<()> {
    let path = config_dir.join(SESSION_FILE);
    let content = toml::to_string(state).context("Failed to serialize session state")?;
    fs::write(&path, content)
        .with_context(|| format!("Failed to write session state: {}", path.display()))
}

/// Resolves ~ in paths to the user's home directory.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();
    if path.starts_with("~/") || path == "~" {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/".to_string());
        PathBuf::from(path.replacen('~', &home, 1))
    } else {
        PathBuf::from(path)
    }
}

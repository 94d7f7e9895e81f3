// SPDX-License-Identifier: GPL-3.0-or-later
// rpnotes - Resolve configured colors into ratatui styles

use crate::config::ThemeConfig;
use anyhow::{Context, Result};
use ratatui::style::{Color, Modifier, Style};
use std::str::FromStr;

fn color(s: &str) -> Result<Color> {
    let s = s.trim();
    // ratatui has no orange
    let normalized = match s.to_lowercase().as_str() {
        "orange" => "yellow".to_string(),
        _ => s.to_string(),
    };
    Color::from_str(&normalized).with_context(|| format!("Invalid color: {}", s))
}

/// Styles used by the UI, built once from the [theme] section.
#[derive(Clone)]
pub struct ResolvedTheme {
    pub app_background_style: Style,
    pub text_style: Style,
    pub header_style: Style,
    pub border_active_style: Style,
    pub border_inactive_style: Style,
    pub selected_style: Style,
    pub search_match_style: Style,
    pub label_style: Style,
    pub status_style: Style,
    pub help_text_style: Style,
    pub cursor_style: Style,
    pub dirty_style: Style,
}

impl ResolvedTheme {
    pub fn from_config(theme: &ThemeConfig) -> Result<Self> {
        let fg = color(&theme.foreground)?;
        let bg = color(&theme.background)?;
        let accent = color(&theme.accent)?;
        let border = color(&theme.border_color)?;
        let inactive = color(&theme.inactive_border)?;

        Ok(Self {
            app_background_style: Style::default().bg(bg),
            text_style: Style::default().fg(fg),
            header_style: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            border_active_style: Style::default().fg(border),
            border_inactive_style: Style::default().fg(inactive),
            selected_style: Style::default()
                .fg(color(&theme.selection)?)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
            search_match_style: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            label_style: Style::default().fg(inactive),
            status_style: Style::default().fg(color(&theme.status)?),
            help_text_style: Style::default().fg(fg),
            cursor_style: Style::default().fg(border).add_modifier(Modifier::REVERSED),
            dirty_style: Style::default().fg(accent).add_modifier(Modifier::ITALIC),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_resolves() {
        assert!(ResolvedTheme::from_config(&ThemeConfig::default()).is_ok());
    }

    #[test]
    fn hex_and_orange_are_accepted() {
        assert_eq!(color("#ff0000").unwrap(), Color::Rgb(255, 0, 0));
        assert_eq!(color("Orange").unwrap(), Color::Yellow);
    }

    #[test]
    fn bad_color_is_an_error() {
        let theme = ThemeConfig {
            accent: "not-a-color".to_string(),
            ..ThemeConfig::default()
        };
        assert!(ResolvedTheme::from_config(&theme).is_err());
    }
}

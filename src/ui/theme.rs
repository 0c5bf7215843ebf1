//! Colors for the sync dashboard, picked from the terminal background.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::HealthStatus;

/// Palette shared by the header, sensor table and detail panel.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Help border and status messages.
    pub highlight: Color,
    pub warning: Color,
    pub critical: Color,
    pub healthy: Color,
    /// Readings that need a second sample.
    pub muted: Color,
    pub border: Color,
    /// Table header row and detail panel section titles.
    pub header: Style,
    /// Row of the selected sensor.
    pub selected: Style,
    pub border_type: BorderType,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            muted: Color::DarkGray,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            muted: Color::Gray,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            ..Self::dark()
        }
    }

    /// Light palette on bright backgrounds, dark otherwise or when the
    /// terminal does not answer.
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for a sync status bucket. Far behind is bold red.
    pub fn status_style(&self, status: HealthStatus) -> Style {
        let color = match status {
            HealthStatus::Healthy => self.healthy,
            HealthStatus::Warning => self.warning,
            HealthStatus::Critical => self.critical,
        };
        let style = Style::default().fg(color);
        if status == HealthStatus::Critical {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_keeps_status_colors() {
        let light = Theme::light();
        assert_eq!(light.healthy, Color::Green);
        assert_eq!(light.critical, Color::Red);
        assert_eq!(light.highlight, Color::Blue);
    }

    #[test]
    fn test_critical_is_bold() {
        let theme = Theme::dark();
        let style = theme.status_style(HealthStatus::Critical);
        assert_eq!(style.fg, Some(Color::Red));
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert!(!theme
            .status_style(HealthStatus::Warning)
            .add_modifier
            .contains(Modifier::BOLD));
    }
}

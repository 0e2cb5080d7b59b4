//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
/// Series colors follow the palette of the bench plot scripts so charts read
/// the same on the terminal as on the saved PNGs.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Setpoint series.
    pub setpoint: Color,
    /// Raw outlet temperature series.
    pub outlet_raw: Color,
    /// Filtered outlet temperature series.
    pub outlet_filtered: Color,
    /// Mix ratio series.
    pub ratio: Color,
    /// Controller output series.
    pub control_output: Color,
    /// Flow series.
    pub flow: Color,
    /// Link-loss overlay and warnings.
    pub link_lost: Color,
    /// Healthy link indicator.
    pub link_up: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows.
    pub header: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            setpoint: Color::Blue,
            outlet_raw: Color::DarkGray,
            outlet_filtered: Color::Yellow,
            ratio: Color::Green,
            control_output: Color::Magenta,
            flow: Color::LightRed,
            link_lost: Color::Red,
            link_up: Color::Green,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            setpoint: Color::Blue,
            outlet_raw: Color::DarkGray,
            outlet_filtered: Color::Rgb(208, 140, 0),
            ratio: Color::Rgb(0, 163, 108),
            control_output: Color::Rgb(155, 79, 150),
            flow: Color::Rgb(232, 93, 4),
            link_lost: Color::Red,
            link_up: Color::Green,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for the link state indicator
    pub fn link_style(&self, link_ok: bool) -> Style {
        if link_ok {
            Style::default().fg(self.link_up)
        } else {
            Style::default().fg(self.link_lost).add_modifier(Modifier::BOLD)
        }
    }
}

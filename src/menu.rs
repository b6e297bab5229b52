//! Tray menu rendering. Only reads the level display and running state, it
//! never decides anything itself.

use anyhow::Result;
use hark_core::{APP_NAME_PRETTY, LevelDisplay, RunningState};
use tray_icon::menu::{AboutMetadataBuilder, Menu, MenuId, MenuItem, PredefinedMenuItem};

use crate::VERSION;

pub const AVERAGE_LABEL: &str = "AveragePowerLevel";
pub const PEAK_LABEL: &str = "PeakHoldLevel";

/// Menu line for one level field.
pub fn level_line(label: &str, text: &str) -> String {
    format!("{}: {}", label, text)
}

/// Tooltip summarising both fields.
pub fn tooltip(display: &LevelDisplay) -> String {
    format!(
        "{} - avg {} / peak {}",
        APP_NAME_PRETTY,
        display.average_text(),
        display.peak_text()
    )
}

pub struct MeterMenu {
    menu: Menu,
    average: MenuItem,
    peak: MenuItem,
    toggle: MenuItem,
    copy_config: MenuItem,
    quit: MenuItem,
}

/// What a click on one of our items means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Toggle,
    CopyConfigPath,
    Quit,
}

impl MeterMenu {
    pub fn new(display: &LevelDisplay, state: RunningState) -> Result<Self> {
        let menu = Menu::new();
        let average = MenuItem::new(level_line(AVERAGE_LABEL, &display.average_text()), false, None);
        let peak = MenuItem::new(level_line(PEAK_LABEL, &display.peak_text()), false, None);
        let toggle = MenuItem::new(state.button_label(), true, None);
        let copy_config = MenuItem::new("Copy config path", true, None);
        let quit = MenuItem::new("Quit", true, None);

        menu.append_items(&[
            // the name of the app
            &MenuItem::new(APP_NAME_PRETTY, false, None),
            &PredefinedMenuItem::separator(),
            &average,
            &peak,
            &PredefinedMenuItem::separator(),
            &toggle,
            &PredefinedMenuItem::separator(),
            &PredefinedMenuItem::about(
                None,
                Some(
                    AboutMetadataBuilder::new()
                        .version(Some(VERSION.to_owned()))
                        .build(),
                ),
            ),
            &copy_config,
            &PredefinedMenuItem::separator(),
            &quit,
        ])?;

        Ok(Self {
            menu,
            average,
            peak,
            toggle,
            copy_config,
            quit,
        })
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn action(&self, id: &MenuId) -> Option<MenuAction> {
        if id == self.toggle.id() {
            Some(MenuAction::Toggle)
        } else if id == self.copy_config.id() {
            Some(MenuAction::CopyConfigPath)
        } else if id == self.quit.id() {
            Some(MenuAction::Quit)
        } else {
            None
        }
    }

    pub fn render_levels(&self, display: &LevelDisplay) {
        self.average
            .set_text(level_line(AVERAGE_LABEL, &display.average_text()));
        self.peak
            .set_text(level_line(PEAK_LABEL, &display.peak_text()));
    }

    pub fn render_state(&self, state: RunningState) {
        self.toggle.set_text(state.button_label());
    }
}

#[cfg(test)]
mod tests {
    use hark_core::LevelEvent;

    use super::*;

    #[test]
    fn test_level_lines_start_with_placeholder() {
        let display = LevelDisplay::default();
        assert_eq!(
            level_line(AVERAGE_LABEL, &display.average_text()),
            "AveragePowerLevel: -"
        );
        assert_eq!(level_line(PEAK_LABEL, &display.peak_text()), "PeakHoldLevel: -");
    }

    #[test]
    fn test_tooltip_shows_levels() {
        let mut display = LevelDisplay::new(1);
        display.apply(LevelEvent::AveragePower(-42.5));
        assert_eq!(tooltip(&display), "Hark - avg -42.5 dB / peak -");
    }
}

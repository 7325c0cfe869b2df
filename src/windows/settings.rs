// src/windows/settings.rs
//! Settings menu and the display / time settings screens

use core::fmt::Write;

use crate::app_state::{SystemView, WindowContext};
use crate::config::{MAX_GMT, MIN_DISPLAY_FPS, MIN_GMT, TITLE_DELAY_MS};
use crate::display_manager::DisplayConfig;
use crate::time_manager::ClockStatus;
use crate::ui::{Action, CharLcd, InputEvent, WindowResult};

use super::menu::{MenuCursor, on_off, render_menu};
use super::{ProbeSettings, TimeSet, ValueSetter, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsItem {
    Display,
    Time,
    Probes,
}

impl SettingsItem {
    const ALL: [SettingsItem; 3] = [Self::Display, Self::Time, Self::Probes];

    fn label(self) -> &'static str {
        match self {
            Self::Display => "Display",
            Self::Time => "Time",
            Self::Probes => "Probes",
        }
    }
}

/// Top level settings menu
#[derive(Debug)]
pub struct SettingsWindow {
    cursor: MenuCursor,
    print_title: bool,
    repaint: bool,
}

impl SettingsWindow {
    pub fn new() -> Self {
        Self {
            cursor: MenuCursor::new(SettingsItem::ALL.len() as u8),
            print_title: true,
            repaint: true,
        }
    }
}

impl Default for SettingsWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl Window for SettingsWindow {
    fn title(&self) -> &str {
        "Settings"
    }

    fn render<L: CharLcd>(
        &mut self,
        lcd: &mut L,
        _display: &DisplayConfig,
        _system: &SystemView<'_>,
    ) -> Result<(), L::Error> {
        if self.print_title {
            lcd.print_title(1, self.title(), TITLE_DELAY_MS)?;
            self.print_title = false;
            self.repaint = true;
        }
        if !self.repaint {
            return Ok(());
        }
        self.repaint = false;

        render_menu(lcd, 0, &self.cursor, |index, text| {
            text.push_str(SettingsItem::ALL[index as usize].label()).ok();
        })
    }

    fn handle_input(&mut self, event: InputEvent, _ctx: &mut WindowContext<'_, '_>) -> Option<Action> {
        self.repaint = true;
        if self.cursor.step(event) {
            return None;
        }
        match event {
            InputEvent::Select => {
                let window = match SettingsItem::ALL[self.cursor.position() as usize] {
                    SettingsItem::Display => DisplaySettings::new().into(),
                    SettingsItem::Time => TimeSettings::new().into(),
                    SettingsItem::Probes => ProbeSettings::new().into(),
                };
                Some(Action::Push(window))
            }
            InputEvent::Back => Some(Action::Close),
            _ => None,
        }
    }

    fn invalidate(&mut self) {
        self.repaint = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisplayItem {
    BacklightOffTime,
    Fps,
    AutoReset,
}

impl DisplayItem {
    const ALL: [DisplayItem; 3] = [Self::BacklightOffTime, Self::Fps, Self::AutoReset];
}

#[derive(Debug)]
pub struct DisplaySettings {
    cursor: MenuCursor,
    /// Field a value setter opened from this window is editing
    pending: Option<DisplayItem>,
    repaint: bool,
}

impl DisplaySettings {
    pub fn new() -> Self {
        Self {
            cursor: MenuCursor::new(DisplayItem::ALL.len() as u8),
            pending: None,
            repaint: true,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl Window for DisplaySettings {
    fn title(&self) -> &str {
        "Display"
    }

    fn render<L: CharLcd>(
        &mut self,
        lcd: &mut L,
        display: &DisplayConfig,
        _system: &SystemView<'_>,
    ) -> Result<(), L::Error> {
        if !self.repaint {
            return Ok(());
        }
        self.repaint = false;

        render_menu(lcd, 0, &self.cursor, |index, text| {
            match DisplayItem::ALL[index as usize] {
                DisplayItem::BacklightOffTime => match display.backlight_off_time() {
                    0 => text.push_str("Backlight: always").ok(),
                    seconds => write!(text, "Backlight: {}s", seconds).ok(),
                },
                DisplayItem::Fps => write!(text, "FPS: {}", display.fps()).ok(),
                DisplayItem::AutoReset => {
                    write!(text, "Auto reset: {}", on_off(display.auto_reset_flag())).ok()
                }
            };
        })
    }

    fn handle_input(&mut self, event: InputEvent, ctx: &mut WindowContext<'_, '_>) -> Option<Action> {
        self.repaint = true;
        if self.cursor.step(event) {
            return None;
        }
        match event {
            InputEvent::Select => {
                let item = DisplayItem::ALL[self.cursor.position() as usize];
                let display = &mut *ctx.display;
                let setter = match item {
                    DisplayItem::BacklightOffTime => ValueSetter::new(
                        "Backlight off",
                        display.backlight_off_time() as f32,
                        0.0,
                        u8::MAX as f32,
                        0,
                    ),
                    DisplayItem::Fps => ValueSetter::new(
                        "FPS",
                        display.fps() as f32,
                        MIN_DISPLAY_FPS as f32,
                        u8::MAX as f32,
                        0,
                    ),
                    DisplayItem::AutoReset => {
                        display.set_auto_reset_flag(!display.auto_reset_flag());
                        return None;
                    }
                };
                self.pending = Some(item);
                Some(Action::Push(setter.into()))
            }
            InputEvent::Back => Some(Action::Close),
            _ => None,
        }
    }

    fn on_result(&mut self, result: WindowResult, ctx: &mut WindowContext<'_, '_>) {
        self.repaint = true;
        let WindowResult::Value(value) = result else {
            return;
        };
        match self.pending.take() {
            Some(DisplayItem::BacklightOffTime) => ctx.display.set_backlight_off_time(value as u8),
            Some(DisplayItem::Fps) => ctx.display.set_fps(value as u8),
            _ => {}
        }
    }

    fn invalidate(&mut self) {
        self.repaint = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeItem {
    NtpSync,
    Gmt,
    SetTime,
}

impl TimeItem {
    const ALL: [TimeItem; 3] = [Self::NtpSync, Self::Gmt, Self::SetTime];
}

#[derive(Debug)]
pub struct TimeSettings {
    cursor: MenuCursor,
    repaint: bool,
}

impl TimeSettings {
    pub fn new() -> Self {
        Self {
            cursor: MenuCursor::new(TimeItem::ALL.len() as u8),
            repaint: true,
        }
    }
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl Window for TimeSettings {
    fn title(&self) -> &str {
        "Time"
    }

    fn render<L: CharLcd>(
        &mut self,
        lcd: &mut L,
        _display: &DisplayConfig,
        system: &SystemView<'_>,
    ) -> Result<(), L::Error> {
        if !self.repaint {
            return Ok(());
        }
        self.repaint = false;

        let time = system.time;
        render_menu(lcd, 0, &self.cursor, |index, text| {
            match TimeItem::ALL[index as usize] {
                TimeItem::NtpSync => {
                    write!(text, "NTP sync: {}", on_off(time.ntp_flag())).ok();
                }
                TimeItem::Gmt => {
                    write!(text, "GMT: {:+}", time.gmt()).ok();
                }
                TimeItem::SetTime => {
                    let label = match time.status() {
                        ClockStatus::Unset => "Set time (unset)",
                        _ => "Set time",
                    };
                    text.push_str(label).ok();
                }
            }
        })
    }

    fn handle_input(&mut self, event: InputEvent, ctx: &mut WindowContext<'_, '_>) -> Option<Action> {
        self.repaint = true;
        if self.cursor.step(event) {
            return None;
        }
        let now = ctx.system.now_ms;
        let time = &mut *ctx.system.time;
        match event {
            InputEvent::Select => match TimeItem::ALL[self.cursor.position() as usize] {
                TimeItem::NtpSync => {
                    time.set_ntp_flag(!time.ntp_flag());
                    None
                }
                TimeItem::Gmt => Some(Action::Push(
                    ValueSetter::new("GMT", time.gmt() as f32, MIN_GMT as f32, MAX_GMT as f32, 0)
                        .into(),
                )),
                TimeItem::SetTime => Some(Action::Push(
                    TimeSet::new(time.time(now)).into(),
                )),
            },
            InputEvent::Back => Some(Action::Close),
            _ => None,
        }
    }

    fn on_result(&mut self, result: WindowResult, ctx: &mut WindowContext<'_, '_>) {
        self.repaint = true;
        let now = ctx.system.now_ms;
        match result {
            WindowResult::Value(gmt) => ctx.system.time.set_gmt(gmt as i8),
            WindowResult::Time(time) => ctx.system.time.set_time(&time, now),
            _ => {}
        }
    }

    fn invalidate(&mut self) {
        self.repaint = true;
    }
}

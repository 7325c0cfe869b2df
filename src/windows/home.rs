// src/windows/home.rs
//! Main window: clock, home climate and probe overview

use core::fmt::Write;

use crate::app_state::{SystemView, WindowContext};
use crate::display_manager::DisplayConfig;
use crate::time_manager::ClockStatus;
use crate::ui::{Action, CharLcd, InputEvent, LCD_ROWS, LineBuffer, print_line};

use super::probes::write_probe_value;
use super::{ProbesWindow, SettingsWindow, Window};

/// Custom glyph slot holding the degree sign
pub const DEGREE_GLYPH: u8 = 0;

const DEGREE_BITMAP: [u8; 8] = [
    0b00110, 0b01001, 0b01001, 0b00110, 0b00000, 0b00000, 0b00000, 0b00000,
];

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainPage {
    Home,
    Modules,
}

#[derive(Debug)]
pub struct MainWindow {
    page: MainPage,
    create_glyphs: bool,
    repaint: bool,
}

impl MainWindow {
    pub fn new() -> Self {
        Self {
            page: MainPage::Home,
            create_glyphs: true,
            repaint: true,
        }
    }

    pub fn page(&self) -> MainPage {
        self.page
    }

    fn render_home<L: CharLcd>(&self, lcd: &mut L, system: &SystemView<'_>) -> Result<(), L::Error> {
        let time = system.time.time(system.now_ms);
        let mut line = LineBuffer::new();

        write!(
            line,
            "{:02}:{:02}:{:02}  {:02}.{:02}.{:04}",
            time.hour, time.minute, time.second, time.day, time.month, time.year
        )
        .ok();
        print_line(lcd, 0, &line)?;

        line.clear();
        let weekday = WEEKDAYS
            .get(time.weekday.wrapping_sub(1) as usize)
            .copied()
            .unwrap_or("---");
        let source = match system.time.status() {
            ClockStatus::Unset => "not set",
            ClockStatus::Manual => "manual",
            ClockStatus::Synced => "ntp",
        };
        write!(line, "{}  {}", weekday, source).ok();
        print_line(lcd, 1, &line)?;

        let modules = system.modules;
        line.clear();
        if modules.home_status() == 0 {
            write!(line, "{:.1}", modules.home_temperature()).ok();
            let degree_col = line.len() as u8;
            write!(line, " C  {:.1}%", modules.home_humidity()).ok();
            print_line(lcd, 2, &line)?;
            lcd.write_glyph(degree_col, 2, DEGREE_GLYPH)?;
        } else {
            write!(line, "Home sensor err {}", modules.home_status()).ok();
            print_line(lcd, 2, &line)?;
        }

        line.clear();
        let ok = (0..modules.probe_count())
            .filter(|&index| modules.probe_status(index).is_ok())
            .count();
        write!(line, "Probes ok: {}/{}", ok, modules.probe_count()).ok();
        print_line(lcd, 3, &line)
    }

    fn render_modules<L: CharLcd>(
        &self,
        lcd: &mut L,
        system: &SystemView<'_>,
    ) -> Result<(), L::Error> {
        let modules = system.modules;
        for row in 0..LCD_ROWS {
            let mut line = LineBuffer::new();
            let mut degree_col = None;
            if let Some(probe) = modules.probe(row as usize) {
                write!(line, "{}: ", probe.config.name).ok();
                if write_probe_value(&mut line, probe) {
                    degree_col = Some(line.len() as u8);
                    line.push_str(" C").ok();
                }
            }
            print_line(lcd, row, &line)?;
            if let Some(col) = degree_col {
                lcd.write_glyph(col, row, DEGREE_GLYPH)?;
            }
        }
        Ok(())
    }
}

impl Default for MainWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl Window for MainWindow {
    fn title(&self) -> &str {
        "Main"
    }

    fn render<L: CharLcd>(
        &mut self,
        lcd: &mut L,
        _display: &DisplayConfig,
        system: &SystemView<'_>,
    ) -> Result<(), L::Error> {
        if self.create_glyphs {
            lcd.create_glyph(DEGREE_GLYPH, &DEGREE_BITMAP)?;
            self.create_glyphs = false;
        }
        if self.repaint {
            lcd.clear()?;
            self.repaint = false;
        }

        match self.page {
            MainPage::Home => self.render_home(lcd, system),
            MainPage::Modules => self.render_modules(lcd, system),
        }
    }

    fn handle_input(&mut self, event: InputEvent, _ctx: &mut WindowContext<'_, '_>) -> Option<Action> {
        match event {
            InputEvent::Next | InputEvent::Previous => {
                self.page = match self.page {
                    MainPage::Home => MainPage::Modules,
                    MainPage::Modules => MainPage::Home,
                };
                self.repaint = true;
                None
            }
            InputEvent::Select => match self.page {
                MainPage::Home => Some(Action::Push(SettingsWindow::new().into())),
                MainPage::Modules => Some(Action::Push(ProbesWindow::new().into())),
            },
            InputEvent::Back => {
                if self.page != MainPage::Home {
                    self.page = MainPage::Home;
                    self.repaint = true;
                }
                None
            }
        }
    }

    fn invalidate(&mut self) {
        // Controller init wipes glyph memory too
        self.create_glyphs = true;
        self.repaint = true;
    }
}

//! Pick a probe address from a bus search
//!
//! The search itself runs inside the poller tick; the window only shows its
//! progress and results.

use core::fmt::Write;

use crate::app_state::{SystemView, WindowContext};
use crate::display_manager::DisplayConfig;
use crate::ui::{Action, CharLcd, InputEvent, WindowResult, print_line};

use super::Window;
use super::menu::{MenuCursor, render_menu};

/// First ROM byte shown; the family code and the start of the serial are
/// the same for every probe
const FIRST_SHOWN_BYTE: usize = 4;

#[derive(Debug)]
pub struct AddressPicker {
    cursor: MenuCursor,
}

impl AddressPicker {
    pub fn new() -> Self {
        Self {
            cursor: MenuCursor::new(0),
        }
    }
}

impl Default for AddressPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl Window for AddressPicker {
    fn title(&self) -> &str {
        "Address"
    }

    fn render<L: CharLcd>(
        &mut self,
        lcd: &mut L,
        _display: &DisplayConfig,
        system: &SystemView<'_>,
    ) -> Result<(), L::Error> {
        let modules = system.modules;
        if modules.scan_pending() {
            print_line(lcd, 0, "Searching...")?;
            for row in 1..4 {
                print_line(lcd, row, "")?;
            }
            return Ok(());
        }

        let found = modules.scanned_probes();
        self.cursor.set_len(found.len() as u8);
        if found.is_empty() {
            print_line(lcd, 0, "No probes found")?;
            for row in 1..4 {
                print_line(lcd, row, "")?;
            }
            return Ok(());
        }

        render_menu(lcd, 0, &self.cursor, |index, text| {
            if let Some(probe) = found.get(index as usize) {
                for byte in &probe.address[FIRST_SHOWN_BYTE..] {
                    write!(text, "{:02X}", byte).ok();
                }
                write!(text, " {:.1} C", probe.temperature).ok();
            }
        })
    }

    fn handle_input(&mut self, event: InputEvent, ctx: &mut WindowContext<'_, '_>) -> Option<Action> {
        let found = ctx.system.modules.scanned_probes();
        self.cursor.set_len(found.len() as u8);

        if self.cursor.step(event) {
            return None;
        }
        match event {
            InputEvent::Select => found
                .get(self.cursor.position() as usize)
                .map(|probe| Action::CloseWith(WindowResult::Address(probe.address))),
            InputEvent::Back => Some(Action::Close),
            _ => None,
        }
    }

    fn invalidate(&mut self) {}
}

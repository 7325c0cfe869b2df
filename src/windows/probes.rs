// src/windows/probes.rs
//! Live list of the DS18B20 probes

use core::fmt::Write;

use crate::app_state::{SystemView, WindowContext};
use crate::display_manager::DisplayConfig;
use crate::sensors::{Probe, ProbeStatus};
use crate::ui::{Action, CharLcd, InputEvent, LineBuffer};

use super::menu::{MenuCursor, render_menu};
use super::{ProbeEditor, Window};

/// Append the probe's corrected temperature, or its fault code.
///
/// Returns `true` when a temperature was written.
pub(crate) fn write_probe_value(text: &mut LineBuffer, probe: &Probe) -> bool {
    match probe.status {
        ProbeStatus::Ok => {
            write!(text, "{:.1}", probe.temperature()).ok();
            true
        }
        ProbeStatus::Unspecified => {
            text.push_str("--").ok();
            false
        }
        status => {
            write!(text, "err {}", status.code()).ok();
            false
        }
    }
}

#[derive(Debug)]
pub struct ProbesWindow {
    cursor: MenuCursor,
}

impl ProbesWindow {
    pub fn new() -> Self {
        Self {
            cursor: MenuCursor::new(0),
        }
    }
}

impl Default for ProbesWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl Window for ProbesWindow {
    fn title(&self) -> &str {
        "Probes"
    }

    fn render<L: CharLcd>(
        &mut self,
        lcd: &mut L,
        _display: &DisplayConfig,
        system: &SystemView<'_>,
    ) -> Result<(), L::Error> {
        let modules = system.modules;
        self.cursor.set_len(modules.probe_count() as u8);

        // Values change every poll, so every frame is a full redraw
        render_menu(lcd, 0, &self.cursor, |index, text| {
            if let Some(probe) = modules.probe(index as usize) {
                write!(text, "{} ", probe.config.name).ok();
                if write_probe_value(text, probe) {
                    text.push_str(" C").ok();
                }
            }
        })
    }

    fn handle_input(&mut self, event: InputEvent, ctx: &mut WindowContext<'_, '_>) -> Option<Action> {
        let modules = &*ctx.system.modules;
        self.cursor.set_len(modules.probe_count() as u8);

        if self.cursor.step(event) {
            return None;
        }
        match event {
            InputEvent::Select => {
                let index = self.cursor.position() as usize;
                let probe = modules.probe(index)?;
                Some(Action::Push(
                    ProbeEditor::new(index, probe.config.clone()).into(),
                ))
            }
            InputEvent::Back => Some(Action::Close),
            _ => None,
        }
    }

    fn invalidate(&mut self) {}
}

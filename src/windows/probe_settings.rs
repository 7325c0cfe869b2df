// src/windows/probe_settings.rs
//! Probe configuration: poll interval, per-probe editor

use core::fmt::Write;

use crate::app_state::{SystemView, WindowContext};
use crate::config::{MAX_PROBE_CORRECTION, MAX_READ_ATTEMPTS, MAX_READ_DATA_TIME, MIN_PROBE_CORRECTION};
use crate::display_manager::DisplayConfig;
use crate::sensors::{ProbeConfig, ProbeStatus};
use crate::ui::{Action, CharLcd, InputEvent, WindowResult};

use super::menu::{MenuCursor, render_menu};
use super::{AddressPicker, Keyboard, ValueSetter, Window};

/// Probe name length limit, matching `ProbeName`
const PROBE_NAME_LEN: usize = 2;

/// Read interval on the first row, then one row per probe
#[derive(Debug)]
pub struct ProbeSettings {
    cursor: MenuCursor,
    repaint: bool,
}

impl ProbeSettings {
    pub fn new() -> Self {
        Self {
            cursor: MenuCursor::new(1),
            repaint: true,
        }
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl Window for ProbeSettings {
    fn title(&self) -> &str {
        "Probe settings"
    }

    fn render<L: CharLcd>(
        &mut self,
        lcd: &mut L,
        _display: &DisplayConfig,
        system: &SystemView<'_>,
    ) -> Result<(), L::Error> {
        let modules = system.modules;
        self.cursor.set_len(modules.probe_count() as u8 + 1);
        if !self.repaint {
            return Ok(());
        }
        self.repaint = false;

        render_menu(lcd, 0, &self.cursor, |index, text| {
            if index == 0 {
                match modules.read_data_time() {
                    0 => text.push_str("Read time: off").ok(),
                    seconds => write!(text, "Read time: {}s", seconds).ok(),
                };
                return;
            }
            let probe_index = index as usize - 1;
            if let Some(probe) = modules.probe(probe_index) {
                write!(text, "{} ", probe.config.name).ok();
                for byte in &probe.config.address[6..] {
                    write!(text, "{:02X}", byte).ok();
                }
                write!(text, " x{}", probe.config.read_attempts).ok();
            }
        })
    }

    fn handle_input(&mut self, event: InputEvent, ctx: &mut WindowContext<'_, '_>) -> Option<Action> {
        let modules = &*ctx.system.modules;
        self.cursor.set_len(modules.probe_count() as u8 + 1);
        self.repaint = true;

        if self.cursor.step(event) {
            return None;
        }
        match event {
            InputEvent::Select => match self.cursor.position() as usize {
                0 => Some(Action::Push(
                    ValueSetter::new(
                        "Read time",
                        modules.read_data_time() as f32,
                        0.0,
                        MAX_READ_DATA_TIME as f32,
                        0,
                    )
                    .into(),
                )),
                position => {
                    let index = position - 1;
                    let probe = modules.probe(index)?;
                    Some(Action::Push(
                        ProbeEditor::new(index, probe.config.clone()).into(),
                    ))
                }
            },
            InputEvent::Back => Some(Action::Close),
            _ => None,
        }
    }

    fn on_result(&mut self, result: WindowResult, ctx: &mut WindowContext<'_, '_>) {
        self.repaint = true;
        if let WindowResult::Value(seconds) = result {
            ctx.system.modules.set_read_data_time(seconds as u8);
        }
    }

    fn invalidate(&mut self) {
        self.repaint = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditorItem {
    Name,
    Address,
    Correction,
    ReadAttempts,
}

impl EditorItem {
    const ALL: [EditorItem; 4] = [
        Self::Name,
        Self::Address,
        Self::Correction,
        Self::ReadAttempts,
    ];
}

/// Edits a copy of one probe's configuration; the copy is applied when the
/// editor is left with `Back`.
#[derive(Debug)]
pub struct ProbeEditor {
    index: usize,
    config: ProbeConfig,
    cursor: MenuCursor,
    pending: Option<EditorItem>,
}

impl ProbeEditor {
    pub fn new(index: usize, config: ProbeConfig) -> Self {
        Self {
            index,
            config,
            cursor: MenuCursor::new(EditorItem::ALL.len() as u8),
            pending: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }
}

impl Window for ProbeEditor {
    fn title(&self) -> &str {
        &self.config.name
    }

    fn render<L: CharLcd>(
        &mut self,
        lcd: &mut L,
        _display: &DisplayConfig,
        system: &SystemView<'_>,
    ) -> Result<(), L::Error> {
        // Live reading with the edited correction applied as a preview
        let reading = system
            .modules
            .probe(self.index)
            .map(|probe| (probe.raw_temperature, probe.status));
        let config = &self.config;

        render_menu(lcd, 0, &self.cursor, |index, text| {
            match EditorItem::ALL[index as usize] {
                EditorItem::Name => {
                    write!(text, "Name: {}", config.name).ok();
                    match reading {
                        Some((raw, ProbeStatus::Ok)) => {
                            write!(text, "  {:.1} C", raw + config.correction).ok();
                        }
                        Some((_, status)) => {
                            write!(text, "  err {}", status.code()).ok();
                        }
                        None => {}
                    }
                }
                EditorItem::Address => {
                    text.push_str("Addr: ").ok();
                    for byte in &config.address[2..] {
                        write!(text, "{:02X}", byte).ok();
                    }
                }
                EditorItem::Correction => {
                    write!(text, "Correction: {:+.1}", config.correction).ok();
                }
                EditorItem::ReadAttempts => {
                    write!(text, "Attempts: {}", config.read_attempts).ok();
                }
            }
        })
    }

    fn handle_input(&mut self, event: InputEvent, ctx: &mut WindowContext<'_, '_>) -> Option<Action> {
        if self.cursor.step(event) {
            return None;
        }
        match event {
            InputEvent::Select => {
                let item = EditorItem::ALL[self.cursor.position() as usize];
                let window = match item {
                    EditorItem::Name => Keyboard::new("Name", &self.config.name, PROBE_NAME_LEN).into(),
                    EditorItem::Address => {
                        ctx.system.modules.request_scan();
                        AddressPicker::new().into()
                    }
                    EditorItem::Correction => ValueSetter::new(
                        "Correction",
                        self.config.correction,
                        MIN_PROBE_CORRECTION,
                        MAX_PROBE_CORRECTION,
                        1,
                    )
                    .into(),
                    EditorItem::ReadAttempts => ValueSetter::new(
                        "Attempts",
                        self.config.read_attempts as f32,
                        0.0,
                        MAX_READ_ATTEMPTS as f32,
                        0,
                    )
                    .into(),
                };
                self.pending = Some(item);
                Some(Action::Push(window))
            }
            InputEvent::Back => {
                ctx.system.modules.set_probe(self.index, &self.config);
                Some(Action::Close)
            }
            _ => None,
        }
    }

    fn on_result(&mut self, result: WindowResult, _ctx: &mut WindowContext<'_, '_>) {
        match (self.pending.take(), result) {
            (Some(EditorItem::Name), WindowResult::Text(name)) => self.config.set_name(&name),
            (Some(EditorItem::Address), WindowResult::Address(address)) => {
                self.config.address = address
            }
            (Some(EditorItem::Correction), WindowResult::Value(correction)) => {
                self.config.set_correction(correction)
            }
            (Some(EditorItem::ReadAttempts), WindowResult::Value(attempts)) => {
                self.config.set_read_attempts(attempts as u8)
            }
            _ => {}
        }
    }

    fn invalidate(&mut self) {}
}

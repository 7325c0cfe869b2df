//! Modal numeric editor
//!
//! The value is kept as an integer count of the smallest step so repeated
//! increments never drift.

use core::fmt::Write;

use crate::app_state::{SystemView, WindowContext};
use crate::display_manager::DisplayConfig;
use crate::ui::{Action, CharLcd, InputEvent, LineBuffer, WindowResult, print_line};

use super::Window;

const MAX_DECIMALS: u8 = 3;

type Label = heapless::String<16>;

#[derive(Debug)]
pub struct ValueSetter {
    label: Label,
    units: i32,
    min: i32,
    max: i32,
    decimals: u8,
    repaint: bool,
}

impl ValueSetter {
    /// Edit `value` within `min..=max`, stepping by one unit of the last of
    /// `decimals` fractional digits.
    pub fn new(label: &str, value: f32, min: f32, max: f32, decimals: u8) -> Self {
        let decimals = decimals.min(MAX_DECIMALS);
        let scale = scale(decimals);
        let min = to_units(min, scale);
        let max = to_units(max, scale).max(min);

        let mut text = Label::new();
        for ch in label.chars() {
            if text.push(ch).is_err() {
                break;
            }
        }

        Self {
            label: text,
            units: to_units(value, scale).clamp(min, max),
            min,
            max,
            decimals,
            repaint: true,
        }
    }

    pub fn value(&self) -> f32 {
        self.units as f32 / scale(self.decimals) as f32
    }
}

fn scale(decimals: u8) -> i32 {
    10i32.pow(decimals as u32)
}

fn to_units(value: f32, scale: i32) -> i32 {
    let scaled = value * scale as f32;
    // Round half away from zero; `as` saturates
    if scaled >= 0.0 {
        (scaled + 0.5) as i32
    } else {
        (scaled - 0.5) as i32
    }
}

impl Window for ValueSetter {
    fn title(&self) -> &str {
        &self.label
    }

    fn render<L: CharLcd>(
        &mut self,
        lcd: &mut L,
        _display: &DisplayConfig,
        _system: &SystemView<'_>,
    ) -> Result<(), L::Error> {
        if !self.repaint {
            return Ok(());
        }
        self.repaint = false;

        let mut line = LineBuffer::new();
        write!(line, "{}:", self.label).ok();
        print_line(lcd, 0, &line)?;

        line.clear();
        write!(line, "  < {:.*} >", self.decimals as usize, self.value()).ok();
        print_line(lcd, 1, &line)?;

        print_line(lcd, 2, "")?;
        print_line(lcd, 3, "Select: save")
    }

    fn handle_input(&mut self, event: InputEvent, _ctx: &mut WindowContext<'_, '_>) -> Option<Action> {
        match event {
            InputEvent::Next => {
                self.units = (self.units + 1).min(self.max);
                self.repaint = true;
                None
            }
            InputEvent::Previous => {
                self.units = (self.units - 1).max(self.min);
                self.repaint = true;
                None
            }
            InputEvent::Select => Some(Action::CloseWith(WindowResult::Value(self.value()))),
            InputEvent::Back => Some(Action::Close),
        }
    }

    fn invalidate(&mut self) {
        self.repaint = true;
    }
}

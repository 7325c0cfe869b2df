//! Test doubles for the external collaborators: a recording character LCD,
//! scripted sensor buses and a scripted network time source.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use crate::config::MAX_SCANNED_PROBES;
use crate::sensors::{HumidityReading, HumiditySensor, ProbeAddress, ProbeBus};
use crate::time_manager::TimeSource;
use crate::ui::lcd::{CharLcd, LCD_COLUMNS, LCD_ROWS};

#[derive(Debug, Clone, PartialEq)]
pub enum LcdOp {
    Init,
    Backlight(bool),
    Title(u8, String),
    Print(u8, u8, String),
    Glyph(u8, u8, u8),
    CreateGlyph(u8),
    ClearLine(u8),
    ClearColumn(u8),
    Clear,
}

/// 20x4 character LCD that keeps a copy of the screen and a log of calls.
pub struct RecordingLcd {
    pub ops: Vec<LcdOp>,
    pub screen: [[u8; LCD_COLUMNS as usize]; LCD_ROWS as usize],
    pub backlight: bool,
}

impl RecordingLcd {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            screen: [[b' '; LCD_COLUMNS as usize]; LCD_ROWS as usize],
            backlight: false,
        }
    }

    pub fn row(&self, row: u8) -> String {
        self.screen[row as usize].iter().map(|&b| b as char).collect()
    }

    pub fn screen_contains(&self, text: &str) -> bool {
        (0..LCD_ROWS).any(|row| self.row(row).contains(text))
    }

    pub fn count(&self, predicate: impl Fn(&LcdOp) -> bool) -> usize {
        self.ops.iter().filter(|op| predicate(op)).count()
    }

    pub fn renders(&self) -> usize {
        self.count(|op| matches!(op, LcdOp::Print(..) | LcdOp::Title(..)))
    }

    fn put(&mut self, col: u8, row: u8, text: &str) {
        if row >= LCD_ROWS {
            return;
        }
        for (offset, byte) in text.bytes().enumerate() {
            let x = col as usize + offset;
            if x >= LCD_COLUMNS as usize {
                break;
            }
            self.screen[row as usize][x] = byte;
        }
    }
}

impl CharLcd for RecordingLcd {
    type Error = core::convert::Infallible;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.ops.push(LcdOp::Init);
        self.screen = [[b' '; LCD_COLUMNS as usize]; LCD_ROWS as usize];
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error> {
        self.ops.push(LcdOp::Backlight(on));
        self.backlight = on;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.ops.push(LcdOp::Clear);
        self.screen = [[b' '; LCD_COLUMNS as usize]; LCD_ROWS as usize];
        Ok(())
    }

    fn print_title(&mut self, row: u8, title: &str, _delay_ms: u16) -> Result<(), Self::Error> {
        self.ops.push(LcdOp::Title(row, title.into()));
        self.screen = [[b' '; LCD_COLUMNS as usize]; LCD_ROWS as usize];
        Ok(())
    }

    fn print_str(&mut self, col: u8, row: u8, text: &str) -> Result<(), Self::Error> {
        self.ops.push(LcdOp::Print(col, row, text.into()));
        self.put(col, row, text);
        Ok(())
    }

    fn write_glyph(&mut self, col: u8, row: u8, code: u8) -> Result<(), Self::Error> {
        self.ops.push(LcdOp::Glyph(col, row, code));
        if row < LCD_ROWS && col < LCD_COLUMNS {
            self.screen[row as usize][col as usize] = code;
        }
        Ok(())
    }

    fn create_glyph(&mut self, slot: u8, _bitmap: &[u8; 8]) -> Result<(), Self::Error> {
        self.ops.push(LcdOp::CreateGlyph(slot));
        Ok(())
    }

    fn clear_line(&mut self, row: u8) -> Result<(), Self::Error> {
        self.ops.push(LcdOp::ClearLine(row));
        if row < LCD_ROWS {
            self.screen[row as usize] = [b' '; LCD_COLUMNS as usize];
        }
        Ok(())
    }

    fn clear_column(&mut self, col: u8) -> Result<(), Self::Error> {
        self.ops.push(LcdOp::ClearColumn(col));
        if col < LCD_COLUMNS {
            for row in self.screen.iter_mut() {
                row[col as usize] = b' ';
            }
        }
        Ok(())
    }
}

/// One-wire bus that replays scripted temperatures in order and then keeps
/// returning `fallback`.
pub struct ScriptedProbeBus {
    pub script: Vec<f32>,
    pub fallback: f32,
    pub reads: Vec<ProbeAddress>,
    pub present: Vec<(ProbeAddress, f32)>,
    pub searches: usize,
}

impl ScriptedProbeBus {
    pub fn new(script: &[f32], fallback: f32) -> Self {
        Self {
            script: script.iter().rev().copied().collect(),
            fallback,
            reads: Vec::new(),
            present: Vec::new(),
            searches: 0,
        }
    }

    pub fn always(value: f32) -> Self {
        Self::new(&[], value)
    }
}

impl ProbeBus for ScriptedProbeBus {
    fn read_temperature(&mut self, address: &ProbeAddress) -> f32 {
        self.reads.push(*address);
        if let Some((_, temperature)) = self.present.iter().find(|(a, _)| a == address) {
            return *temperature;
        }
        self.script.pop().unwrap_or(self.fallback)
    }

    fn search(&mut self, found: &mut heapless::Vec<ProbeAddress, MAX_SCANNED_PROBES>) {
        self.searches += 1;
        for (address, _) in &self.present {
            if found.push(*address).is_err() {
                break;
            }
        }
    }
}

pub struct FixedHumidity {
    pub reading: HumidityReading,
    pub reads: usize,
}

impl FixedHumidity {
    pub fn new(temperature: f32, humidity: f32, status: u8) -> Self {
        Self {
            reading: HumidityReading {
                temperature,
                humidity,
                status,
            },
            reads: 0,
        }
    }
}

impl HumiditySensor for FixedHumidity {
    fn read(&mut self) -> HumidityReading {
        self.reads += 1;
        self.reading
    }
}

/// Network time source answering with a fixed unix time, or failing.
pub struct FixedTimeSource {
    pub unix: Option<u32>,
    pub requests: usize,
}

impl FixedTimeSource {
    pub fn new(unix: Option<u32>) -> Self {
        Self { unix, requests: 0 }
    }
}

impl TimeSource for FixedTimeSource {
    fn fetch_unix(&mut self) -> Option<u32> {
        self.requests += 1;
        self.unix
    }
}

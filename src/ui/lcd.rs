//! HD44780-style character LCD behind an I2C backpack

use core::fmt::{Debug, Write};

pub const LCD_COLUMNS: u8 = 20;
pub const LCD_ROWS: u8 = 4;

/// One formatted line; longer than a row so the LCD does the clipping
pub type LineBuffer = heapless::String<32>;

/// Capabilities the display subsystem needs from the LCD driver.
///
/// Coordinates are `(column, row)` from the top-left corner. Text running past
/// the last column is dropped by the driver.
pub trait CharLcd {
    type Error: Debug;

    /// Full controller (re)initialization; clears the screen and the custom
    /// glyph memory.
    fn init(&mut self) -> Result<(), Self::Error>;

    fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error>;

    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Clear the screen, show `title` centered on `row` for `delay_ms` and
    /// clear the screen again.
    fn print_title(&mut self, row: u8, title: &str, delay_ms: u16) -> Result<(), Self::Error>;

    fn print_str(&mut self, col: u8, row: u8, text: &str) -> Result<(), Self::Error>;

    /// Write a single character code, including custom glyph slots 0..=7.
    fn write_glyph(&mut self, col: u8, row: u8, code: u8) -> Result<(), Self::Error>;

    /// Upload a 5x8 custom glyph bitmap into `slot` (0..=7).
    fn create_glyph(&mut self, slot: u8, bitmap: &[u8; 8]) -> Result<(), Self::Error>;

    fn clear_line(&mut self, row: u8) -> Result<(), Self::Error>;

    fn clear_column(&mut self, col: u8) -> Result<(), Self::Error>;

    fn print_int(&mut self, col: u8, row: u8, value: i32) -> Result<(), Self::Error> {
        let mut text = LineBuffer::new();
        write!(text, "{}", value).ok();
        self.print_str(col, row, &text)
    }

    fn print_float(&mut self, col: u8, row: u8, value: f32, decimals: u8) -> Result<(), Self::Error> {
        let mut text = LineBuffer::new();
        write!(text, "{:.*}", decimals as usize, value).ok();
        self.print_str(col, row, &text)
    }
}

/// Print `text` on `row`, padded with spaces to the full width so leftovers of
/// a longer previous line disappear without a separate clear.
pub fn print_line<L: CharLcd>(lcd: &mut L, row: u8, text: &str) -> Result<(), L::Error> {
    let mut line = LineBuffer::new();
    for ch in text.chars().take(LCD_COLUMNS as usize) {
        line.push(ch).ok();
    }
    while line.len() < LCD_COLUMNS as usize {
        if line.push(' ').is_err() {
            break;
        }
    }
    lcd.print_str(0, row, &line)
}

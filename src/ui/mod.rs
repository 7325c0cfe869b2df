// src/ui/mod.rs
//! Character LCD UI contracts
//!
//! This module provides:
//! - The [`CharLcd`] capability interface implemented by the board's LCD driver
//! - Input events and the navigation actions windows hand back to the display
//! - Small line-formatting helpers shared by the windows

pub mod core;
pub mod lcd;

// Re-export commonly used items
pub use self::core::{Action, InputEvent, InputOutcome, TEXT_RESULT_LEN, TextResult, WindowResult};
pub use lcd::{CharLcd, LCD_COLUMNS, LCD_ROWS, LineBuffer, print_line};

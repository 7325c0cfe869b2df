// src/ui/core.rs
//! Core UI types shared by the display manager and the windows

use crate::sensors::ProbeAddress;
use crate::time_manager::DateTime;
use crate::windows::WindowWrapper;

/// Semantic input from the buttons / encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Next,
    Previous,
    Select,
    Back,
}

/// What happened to an input event handed to the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// The event only woke the backlight and was swallowed
    Woke,
    /// The head window handled the event
    Handled,
    /// The stack was empty
    Ignored,
}

pub const TEXT_RESULT_LEN: usize = 16;

pub type TextResult = heapless::String<TEXT_RESULT_LEN>;

/// Value a modal window hands back to the window below it
#[derive(Debug, Clone, PartialEq)]
pub enum WindowResult {
    Value(f32),
    Text(TextResult),
    Address(ProbeAddress),
    Time(DateTime),
}

/// Navigation requested by a window in response to input
#[derive(Debug)]
pub enum Action {
    /// Open a window on top of the current one
    Push(WindowWrapper),
    /// Close the current window
    Close,
    /// Close the current window and deliver a result to its parent
    CloseWith(WindowResult),
}

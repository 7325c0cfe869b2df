// src/windows/window.rs
//! Window trait and the closed set of window kinds

use crate::app_state::{SystemView, WindowContext};
use crate::display_manager::DisplayConfig;
use crate::ui::{Action, CharLcd, InputEvent, WindowResult};

use super::{
    AddressPicker, DisplaySettings, Keyboard, MainWindow, ProbeEditor, ProbeSettings, ProbesWindow,
    SettingsWindow, TimeSet, TimeSettings, ValueSetter,
};

extern crate alloc;
use alloc::boxed::Box;

/// Trait for windows that can be rendered and interacted with
pub trait Window {
    /// Get the title of this window
    fn title(&self) -> &str;

    /// Draw the window. Called by the display scheduler at most once per frame
    /// while this window is the head of the stack.
    fn render<L: CharLcd>(
        &mut self,
        lcd: &mut L,
        display: &DisplayConfig,
        system: &SystemView<'_>,
    ) -> Result<(), L::Error>;

    /// Handle input, return a navigation action if any
    fn handle_input(&mut self, event: InputEvent, ctx: &mut WindowContext<'_, '_>) -> Option<Action>;

    /// Receive the result of a modal window that was closed on top of this one
    fn on_result(&mut self, _result: WindowResult, _ctx: &mut WindowContext<'_, '_>) {}

    /// Request a full repaint on the next render
    fn invalidate(&mut self);
}

/// Window wrapper enum for storing different window types
#[derive(Debug)]
pub enum WindowWrapper {
    Main(Box<MainWindow>),
    Probes(Box<ProbesWindow>),
    Settings(Box<SettingsWindow>),
    DisplaySettings(Box<DisplaySettings>),
    TimeSettings(Box<TimeSettings>),
    ProbeSettings(Box<ProbeSettings>),
    ProbeEditor(Box<ProbeEditor>),
    TimeSet(Box<TimeSet>),
    ValueSetter(Box<ValueSetter>),
    Keyboard(Box<Keyboard>),
    AddressPicker(Box<AddressPicker>),
}

macro_rules! dispatch {
    ($self:expr, $window:ident => $body:expr) => {
        match $self {
            WindowWrapper::Main($window) => $body,
            WindowWrapper::Probes($window) => $body,
            WindowWrapper::Settings($window) => $body,
            WindowWrapper::DisplaySettings($window) => $body,
            WindowWrapper::TimeSettings($window) => $body,
            WindowWrapper::ProbeSettings($window) => $body,
            WindowWrapper::ProbeEditor($window) => $body,
            WindowWrapper::TimeSet($window) => $body,
            WindowWrapper::ValueSetter($window) => $body,
            WindowWrapper::Keyboard($window) => $body,
            WindowWrapper::AddressPicker($window) => $body,
        }
    };
}

impl Window for WindowWrapper {
    fn title(&self) -> &str {
        dispatch!(self, window => window.title())
    }

    fn render<L: CharLcd>(
        &mut self,
        lcd: &mut L,
        display: &DisplayConfig,
        system: &SystemView<'_>,
    ) -> Result<(), L::Error> {
        dispatch!(self, window => window.render(lcd, display, system))
    }

    fn handle_input(&mut self, event: InputEvent, ctx: &mut WindowContext<'_, '_>) -> Option<Action> {
        dispatch!(self, window => window.handle_input(event, ctx))
    }

    fn on_result(&mut self, result: WindowResult, ctx: &mut WindowContext<'_, '_>) {
        dispatch!(self, window => window.on_result(result, ctx))
    }

    fn invalidate(&mut self) {
        dispatch!(self, window => window.invalidate())
    }
}

impl From<MainWindow> for WindowWrapper {
    fn from(window: MainWindow) -> Self {
        Self::Main(Box::new(window))
    }
}

impl From<ProbesWindow> for WindowWrapper {
    fn from(window: ProbesWindow) -> Self {
        Self::Probes(Box::new(window))
    }
}

impl From<SettingsWindow> for WindowWrapper {
    fn from(window: SettingsWindow) -> Self {
        Self::Settings(Box::new(window))
    }
}

impl From<DisplaySettings> for WindowWrapper {
    fn from(window: DisplaySettings) -> Self {
        Self::DisplaySettings(Box::new(window))
    }
}

impl From<TimeSettings> for WindowWrapper {
    fn from(window: TimeSettings) -> Self {
        Self::TimeSettings(Box::new(window))
    }
}

impl From<ProbeSettings> for WindowWrapper {
    fn from(window: ProbeSettings) -> Self {
        Self::ProbeSettings(Box::new(window))
    }
}

impl From<ProbeEditor> for WindowWrapper {
    fn from(window: ProbeEditor) -> Self {
        Self::ProbeEditor(Box::new(window))
    }
}

impl From<TimeSet> for WindowWrapper {
    fn from(window: TimeSet) -> Self {
        Self::TimeSet(Box::new(window))
    }
}

impl From<ValueSetter> for WindowWrapper {
    fn from(window: ValueSetter) -> Self {
        Self::ValueSetter(Box::new(window))
    }
}

impl From<Keyboard> for WindowWrapper {
    fn from(window: Keyboard) -> Self {
        Self::Keyboard(Box::new(window))
    }
}

impl From<AddressPicker> for WindowWrapper {
    fn from(window: AddressPicker) -> Self {
        Self::AddressPicker(Box::new(window))
    }
}

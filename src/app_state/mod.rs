//! Application-wide state and the contexts handed to windows
//!
//! [`AppState`] owns the three managers and drives them from the board's main
//! loop. Windows never see the managers directly; they receive a
//! [`SystemView`] while rendering and a [`WindowContext`] while handling input.

use log::info;
use thiserror_no_std::Error;

use crate::display_manager::{DisplayConfig, DisplayManager, TickOutcome};
use crate::module_manager::ModuleManager;
use crate::remote::{ElementList, ElementValue, RemoteElements, RemoteError};
use crate::sensors::{HumiditySensor, ProbeBus};
use crate::storage::{Persistent, SettingsBuffer, SettingsError};
use crate::time_manager::{TimeManager, TimeSource};
use crate::ui::{CharLcd, InputEvent, InputOutcome};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("Remote element error: {0}")]
    Remote(#[from] RemoteError),
}

/// Read-only view of the sibling managers used while rendering
#[derive(Clone, Copy)]
pub struct SystemView<'a> {
    pub modules: &'a ModuleManager,
    pub time: &'a TimeManager,
    pub now_ms: u32,
}

/// Mutable access to the sibling managers used while handling input
pub struct SystemContext<'a> {
    pub modules: &'a mut ModuleManager,
    pub time: &'a mut TimeManager,
    pub now_ms: u32,
}

impl<'a> SystemContext<'a> {
    pub fn new(modules: &'a mut ModuleManager, time: &'a mut TimeManager, now_ms: u32) -> Self {
        Self {
            modules,
            time,
            now_ms,
        }
    }

    pub fn view(&self) -> SystemView<'_> {
        SystemView {
            modules: &*self.modules,
            time: &*self.time,
            now_ms: self.now_ms,
        }
    }
}

/// Everything a window may change in response to input
pub struct WindowContext<'a, 's> {
    pub display: &'a mut DisplayConfig,
    pub system: &'a mut SystemContext<'s>,
}

/// Main application state container
///
/// Holds the display, the sensor modules and the clock, and fans the main
/// loop tick, input events and settings persistence out to them.
pub struct AppState<L: CharLcd> {
    pub display: DisplayManager<L>,
    pub modules: ModuleManager,
    pub time: TimeManager,
}

impl<L: CharLcd> AppState<L> {
    pub fn new(lcd: L) -> Self {
        Self {
            display: DisplayManager::new(lcd),
            modules: ModuleManager::new(),
            time: TimeManager::new(),
        }
    }

    pub fn begin(&mut self, now: u32) -> Result<(), L::Error> {
        self.display.begin(now)?;
        info!("Controller started with {} probes", self.modules.probe_count());
        Ok(())
    }

    /// One main loop iteration: clock, sensors, then the display.
    pub fn tick<H, B, S>(
        &mut self,
        now: u32,
        humidity: &mut H,
        bus: &mut B,
        source: &mut S,
    ) -> Result<TickOutcome, L::Error>
    where
        H: HumiditySensor,
        B: ProbeBus,
        S: TimeSource,
    {
        self.time.tick(now, source);
        self.modules.tick(now, humidity, bus);

        let view = SystemView {
            modules: &self.modules,
            time: &self.time,
            now_ms: now,
        };
        self.display.tick(now, &view)
    }

    pub fn handle_input(&mut self, now: u32, event: InputEvent) -> Result<InputOutcome, L::Error> {
        let mut system = SystemContext::new(&mut self.modules, &mut self.time, now);
        self.display.handle_input(now, event, &mut system)
    }

    pub fn make_default(&mut self) {
        self.display.make_default();
        self.modules.make_default();
        self.time.make_default();
    }

    /// Write every manager's fields into `buffer`.
    ///
    /// The save is all or nothing: on error `buffer` keeps its previous
    /// contents.
    pub fn save_settings<const N: usize>(
        &self,
        buffer: &mut SettingsBuffer<N>,
    ) -> Result<(), AppError> {
        let mut scratch = buffer.clone();
        self.display.write_settings(&mut scratch)?;
        self.modules.write_settings(&mut scratch)?;
        self.time.write_settings(&mut scratch)?;
        *buffer = scratch;
        info!("Settings saved ({} bytes)", buffer.len());
        Ok(())
    }

    pub fn load_settings<const N: usize>(&mut self, buffer: &SettingsBuffer<N>) {
        self.display.read_settings(buffer);
        self.modules.read_settings(buffer);
        self.time.read_settings(buffer);
        info!("Settings loaded ({} bytes)", buffer.len());
    }

    /// Elements of every manager, in display, modules, time order
    pub fn remote_elements(&self) -> Result<ElementList, AppError> {
        let mut list = ElementList::new();
        self.display.add_remote_elements(&mut list)?;
        self.modules.add_remote_elements(&mut list)?;
        self.time.add_remote_elements(&mut list)?;
        Ok(list)
    }

    pub fn read_element(&self, key: &str) -> Option<ElementValue> {
        self.display
            .read_element(key)
            .or_else(|| self.modules.read_element(key))
            .or_else(|| self.time.read_element(key))
    }

    pub fn write_element(&mut self, key: &str, value: ElementValue) -> bool {
        self.display.write_element(key, value)
            || self.modules.write_element(key, value)
            || self.time.write_element(key, value)
    }
}

pub mod address_picker;
pub mod home;
pub mod keyboard;
pub mod menu;
pub mod probe_settings;
pub mod probes;
pub mod settings;
pub mod stack;
pub mod time_set;
pub mod value_setter;
pub mod window;

pub use address_picker::AddressPicker;
pub use home::{MainPage, MainWindow};
pub use keyboard::Keyboard;
pub use probe_settings::{ProbeEditor, ProbeSettings};
pub use probes::ProbesWindow;
pub use settings::{DisplaySettings, SettingsWindow, TimeSettings};
pub use stack::{WindowId, WindowStack, WindowStackError};
pub use time_set::TimeSet;
pub use value_setter::ValueSetter;
pub use window::{Window, WindowWrapper};

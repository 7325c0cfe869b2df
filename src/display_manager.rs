//! Display Manager for the character LCD
//!
//! This module owns the LCD and the window stack and runs the display
//! scheduler on every tick:
//! - Turns the backlight off after a period without input
//! - Re-initializes the LCD controller periodically to recover from I2C glitches
//! - Redraws the head window at most `fps` times per second
//!
//! Input events go through [`DisplayManager::handle_input`], which wakes the
//! backlight first and forwards the event to the head window otherwise.

use log::{debug, info, warn};

use crate::app_state::{SystemContext, SystemView, WindowContext};
use crate::config::{
    DEFAULT_BACKLIGHT_OFF_TIME, DEFAULT_DISPLAY_AUTO_RESET_FLAG, DEFAULT_DISPLAY_FPS,
    DEFAULT_DISPLAY_WORK_FLAG, DISPLAY_AUTO_RESET_MINUTES, MIN_DISPLAY_FPS,
};
use crate::remote::{ElementList, ElementType, ElementValue, RemoteElements, RemoteError, register};
use crate::storage::{Persistent, SettingKey, SettingsBuffer, SettingsError, key};
use crate::timing::{Timer, mins_to_ms, secs_to_ms};
use crate::ui::{Action, CharLcd, InputEvent, InputOutcome};
use crate::windows::{MainWindow, Window, WindowId, WindowStack, WindowStackError, WindowWrapper};

/// Persisted display fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayField {
    AutoReset,
    BacklightOffTime,
    Fps,
}

impl DisplayField {
    pub fn key(self) -> SettingKey {
        match self {
            Self::AutoReset => key("SDar"),
            Self::BacklightOffTime => key("SDbot"),
            Self::Fps => key("SDf"),
        }
    }
}

/// User adjustable display configuration.
///
/// Fields are private so every mutation goes through the clamping setters;
/// `fps` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    work_flag: bool,
    auto_reset_flag: bool,
    backlight_off_time: u8,
    fps: u8,
}

impl DisplayConfig {
    pub const fn new() -> Self {
        Self {
            work_flag: DEFAULT_DISPLAY_WORK_FLAG,
            auto_reset_flag: DEFAULT_DISPLAY_AUTO_RESET_FLAG,
            backlight_off_time: DEFAULT_BACKLIGHT_OFF_TIME,
            fps: DEFAULT_DISPLAY_FPS,
        }
    }

    pub const fn work_flag(&self) -> bool {
        self.work_flag
    }

    pub fn set_work_flag(&mut self, work_flag: bool) {
        self.work_flag = work_flag;
    }

    pub const fn auto_reset_flag(&self) -> bool {
        self.auto_reset_flag
    }

    pub fn set_auto_reset_flag(&mut self, auto_reset_flag: bool) {
        self.auto_reset_flag = auto_reset_flag;
    }

    /// Seconds without input before the backlight goes off; 0 = never
    pub const fn backlight_off_time(&self) -> u8 {
        self.backlight_off_time
    }

    pub fn set_backlight_off_time(&mut self, seconds: u8) {
        self.backlight_off_time = seconds;
    }

    pub const fn fps(&self) -> u8 {
        self.fps
    }

    pub fn set_fps(&mut self, fps: u8) {
        self.fps = fps.max(MIN_DISPLAY_FPS);
    }

    /// Minimum time between two renders
    pub const fn frame_interval_ms(&self) -> u32 {
        1000 / self.fps as u32
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// What a display tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// LCD controller was re-initialized
    pub reset: bool,
    /// Backlight was turned off
    pub dimmed: bool,
    /// Head window was rendered
    pub rendered: bool,
}

/// Display manager that owns the LCD and the window stack
pub struct DisplayManager<L: CharLcd> {
    lcd: L,
    stack: WindowStack,
    config: DisplayConfig,
    auto_reset_timer: Timer,
    backlight_off_timer: Timer,
    fps_timer: Timer,
    backlight_on: bool,
}

impl<L: CharLcd> DisplayManager<L> {
    /// Create a display manager showing the main window
    pub fn new(lcd: L) -> Self {
        let mut manager = Self {
            lcd,
            stack: WindowStack::new(),
            config: DisplayConfig::new(),
            auto_reset_timer: Timer::new(0),
            backlight_off_timer: Timer::new(0),
            fps_timer: Timer::new(0),
            backlight_on: true,
        };
        manager.seed_stack();
        manager
    }

    /// Initialize the LCD and turn the backlight on
    pub fn begin(&mut self, now: u32) -> Result<(), L::Error> {
        self.lcd.init()?;
        self.lcd.set_backlight(true)?;
        self.backlight_on = true;
        self.auto_reset_timer.restart(now);
        self.backlight_off_timer.restart(now);
        info!("Display started");
        Ok(())
    }

    /// Run the display scheduler once
    pub fn tick(&mut self, now: u32, system: &SystemView<'_>) -> Result<TickOutcome, L::Error> {
        let mut outcome = TickOutcome::default();
        if !self.config.work_flag {
            return Ok(outcome);
        }

        if self.config.auto_reset_flag
            && self
                .auto_reset_timer
                .has_elapsed(now, mins_to_ms(DISPLAY_AUTO_RESET_MINUTES))
        {
            self.reset_lcd()?;
            self.auto_reset_timer.restart(now);
            outcome.reset = true;
        }

        let backlight_off_time = self.config.backlight_off_time;
        if backlight_off_time != 0
            && self.backlight_on
            && self
                .backlight_off_timer
                .has_elapsed(now, secs_to_ms(backlight_off_time as u32))
        {
            self.lcd.set_backlight(false)?;
            self.backlight_on = false;
            outcome.dimmed = true;
            debug!("Backlight off after {} s without input", backlight_off_time);
        }

        if !self.backlight_on {
            return Ok(outcome);
        }

        let Some(window) = self.stack.peek_mut() else {
            return Ok(outcome);
        };

        if self.fps_timer.has_elapsed(now, self.config.frame_interval_ms()) {
            self.fps_timer.restart(now);
            window.render(&mut self.lcd, &self.config, system)?;
            outcome.rendered = true;
        }
        Ok(outcome)
    }

    /// Register user activity.
    ///
    /// Restarts the backlight timeout. Returns `true` when the backlight was
    /// off and has been turned back on.
    pub fn action(&mut self, now: u32) -> Result<bool, L::Error> {
        self.backlight_off_timer.restart(now);

        if !self.backlight_on {
            self.lcd.set_backlight(true)?;
            self.backlight_on = true;
            return Ok(true);
        }
        Ok(false)
    }

    /// Deliver an input event.
    ///
    /// An event that wakes the backlight is swallowed. Otherwise the head
    /// window handles it and the resulting navigation is applied.
    pub fn handle_input(
        &mut self,
        now: u32,
        event: InputEvent,
        system: &mut SystemContext<'_>,
    ) -> Result<InputOutcome, L::Error> {
        if self.action(now)? {
            debug!("Input {:?} woke the display", event);
            return Ok(InputOutcome::Woke);
        }

        let Some(window) = self.stack.peek_mut() else {
            return Ok(InputOutcome::Ignored);
        };

        let mut ctx = WindowContext {
            display: &mut self.config,
            system: &mut *system,
        };
        if let Some(action) = window.handle_input(event, &mut ctx) {
            self.apply(action, system);
        }
        Ok(InputOutcome::Handled)
    }

    fn apply(&mut self, action: Action, system: &mut SystemContext<'_>) {
        match action {
            Action::Push(window) => {
                if let Err(err) = self.push_window(window) {
                    warn!("Cannot open window: {}", err);
                }
            }
            Action::Close => {
                self.close_head();
            }
            Action::CloseWith(result) => {
                if !self.close_head() {
                    return;
                }
                if let Some(parent) = self.stack.peek_mut() {
                    let mut ctx = WindowContext {
                        display: &mut self.config,
                        system,
                    };
                    parent.on_result(result, &mut ctx);
                }
            }
        }
    }

    fn close_head(&mut self) -> bool {
        match self.stack.head_id() {
            Some(id) => self.pop_window(id),
            None => false,
        }
    }

    /// Open `window` on top of the stack
    pub fn push_window(&mut self, window: WindowWrapper) -> Result<WindowId, WindowStackError> {
        self.stack.push(window)
    }

    /// Close the window `id` if it is the head; the window below repaints.
    pub fn pop_window(&mut self, id: WindowId) -> bool {
        if !self.stack.pop_specific(id) {
            return false;
        }
        if let Some(head) = self.stack.peek_mut() {
            head.invalidate();
        }
        true
    }

    pub fn window_stack(&self) -> &WindowStack {
        &self.stack
    }

    pub fn head(&self) -> Option<&WindowWrapper> {
        self.stack.peek()
    }

    pub fn lcd(&self) -> &L {
        &self.lcd
    }

    pub fn lcd_mut(&mut self) -> &mut L {
        &mut self.lcd
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn backlight_on(&self) -> bool {
        self.backlight_on
    }

    pub fn work_flag(&self) -> bool {
        self.config.work_flag()
    }

    pub fn set_work_flag(&mut self, work_flag: bool) {
        self.config.set_work_flag(work_flag);
    }

    pub fn auto_reset_flag(&self) -> bool {
        self.config.auto_reset_flag()
    }

    pub fn set_auto_reset_flag(&mut self, auto_reset_flag: bool) {
        self.config.set_auto_reset_flag(auto_reset_flag);
    }

    pub fn backlight_off_time(&self) -> u8 {
        self.config.backlight_off_time()
    }

    pub fn set_backlight_off_time(&mut self, seconds: u8) {
        self.config.set_backlight_off_time(seconds);
    }

    pub fn fps(&self) -> u8 {
        self.config.fps()
    }

    pub fn set_fps(&mut self, fps: u8) {
        self.config.set_fps(fps);
    }

    /// Re-initialize the controller and restore what it forgot
    fn reset_lcd(&mut self) -> Result<(), L::Error> {
        debug!("Periodic LCD reset");
        self.lcd.init()?;
        self.lcd.set_backlight(self.backlight_on)?;
        if let Some(head) = self.stack.peek_mut() {
            head.invalidate();
        }
        Ok(())
    }

    fn seed_stack(&mut self) {
        if let Err(err) = self.stack.push(MainWindow::new().into()) {
            warn!("Cannot open main window: {}", err);
        }
    }
}

impl<L: CharLcd> Persistent for DisplayManager<L> {
    fn make_default(&mut self) {
        self.stack.teardown();
        self.seed_stack();
        self.config = DisplayConfig::new();
        self.auto_reset_timer.restart(0);
        self.backlight_off_timer.restart(0);
        self.fps_timer.restart(0);
        info!("Display settings reset to defaults");
    }

    fn write_settings<const N: usize>(
        &self,
        buffer: &mut SettingsBuffer<N>,
    ) -> Result<(), SettingsError> {
        buffer.set(&DisplayField::AutoReset.key(), &self.config.auto_reset_flag)?;
        buffer.set(
            &DisplayField::BacklightOffTime.key(),
            &self.config.backlight_off_time,
        )?;
        buffer.set(&DisplayField::Fps.key(), &self.config.fps)
    }

    fn read_settings<const N: usize>(&mut self, buffer: &SettingsBuffer<N>) {
        if let Some(flag) = buffer.get::<bool>(&DisplayField::AutoReset.key()) {
            self.set_auto_reset_flag(flag);
        }
        if let Some(seconds) = buffer.get::<u8>(&DisplayField::BacklightOffTime.key()) {
            self.set_backlight_off_time(seconds);
        }
        if let Some(fps) = buffer.get::<u8>(&DisplayField::Fps.key()) {
            self.set_fps(fps);
        }
    }
}

impl<L: CharLcd> RemoteElements for DisplayManager<L> {
    fn add_remote_elements(&self, list: &mut ElementList) -> Result<(), RemoteError> {
        register(
            list,
            "P dspl time",
            DisplayField::BacklightOffTime.key(),
            ElementType::U8,
        )?;
        register(list, "P dspl fps", DisplayField::Fps.key(), ElementType::U8)?;
        register(
            list,
            "P dspl reset",
            DisplayField::AutoReset.key(),
            ElementType::Bool,
        )
    }

    fn read_element(&self, key: &str) -> Option<ElementValue> {
        if key == DisplayField::BacklightOffTime.key().as_str() {
            Some(ElementValue::U8(self.backlight_off_time()))
        } else if key == DisplayField::Fps.key().as_str() {
            Some(ElementValue::U8(self.fps()))
        } else if key == DisplayField::AutoReset.key().as_str() {
            Some(ElementValue::Bool(self.auto_reset_flag()))
        } else {
            None
        }
    }

    fn write_element(&mut self, key: &str, value: ElementValue) -> bool {
        match value {
            ElementValue::U8(seconds) if key == DisplayField::BacklightOffTime.key().as_str() => {
                self.set_backlight_off_time(seconds);
                true
            }
            ElementValue::U8(fps) if key == DisplayField::Fps.key().as_str() => {
                self.set_fps(fps);
                true
            }
            ElementValue::Bool(flag) if key == DisplayField::AutoReset.key().as_str() => {
                self.set_auto_reset_flag(flag);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module_manager::ModuleManager;
    use crate::testing::{LcdOp, RecordingLcd};
    use crate::time_manager::TimeManager;

    struct Fixture {
        display: DisplayManager<RecordingLcd>,
        modules: ModuleManager,
        time: TimeManager,
    }

    impl Fixture {
        fn new() -> Self {
            let mut display = DisplayManager::new(RecordingLcd::new());
            display.begin(0).unwrap();
            Self {
                display,
                modules: ModuleManager::new(),
                time: TimeManager::new(),
            }
        }

        fn tick(&mut self, now: u32) -> TickOutcome {
            let view = SystemView {
                modules: &self.modules,
                time: &self.time,
                now_ms: now,
            };
            self.display.tick(now, &view).unwrap()
        }

        fn input(&mut self, now: u32, event: InputEvent) -> InputOutcome {
            let mut system = SystemContext::new(&mut self.modules, &mut self.time, now);
            self.display.handle_input(now, event, &mut system).unwrap()
        }

        fn backlight_ops(&self, on: bool) -> usize {
            self.display
                .lcd()
                .count(|op| *op == LcdOp::Backlight(on))
        }
    }

    #[test]
    fn test_backlight_turns_off_once() {
        let mut fixture = Fixture::new();
        fixture.display.set_backlight_off_time(10);

        assert!(!fixture.tick(9_999).dimmed);
        assert!(fixture.tick(10_000).dimmed);
        for now in (10_100..60_000).step_by(100) {
            assert!(!fixture.tick(now).dimmed);
        }

        assert!(!fixture.display.backlight_on());
        assert_eq!(fixture.backlight_ops(false), 1);
    }

    #[test]
    fn test_action_wakes_backlight() {
        let mut fixture = Fixture::new();
        fixture.tick(10_000);
        assert!(!fixture.display.backlight_on());

        assert!(fixture.display.action(12_000).unwrap());
        assert!(fixture.display.backlight_on());
        assert!(!fixture.display.action(12_500).unwrap());

        // The timeout restarts from the last action
        assert!(!fixture.tick(22_499).dimmed);
        assert!(fixture.tick(22_500).dimmed);
    }

    #[test]
    fn test_timers_survive_counter_overflow() {
        let mut fixture = Fixture::new();
        fixture.display.begin(u32::MAX - 500).unwrap();
        fixture.tick(u32::MAX - 400);

        // 10 s after start is 9_499 ms past the wrap
        assert!(fixture.tick(50).rendered);
        assert!(!fixture.tick(9_498).dimmed);
        assert!(fixture.tick(9_499).dimmed);
        assert!(!fixture.display.backlight_on());
    }

    #[test]
    fn test_zero_backlight_time_never_dims() {
        let mut fixture = Fixture::new();
        fixture.display.set_backlight_off_time(0);

        for minute in 1..=120u32 {
            assert!(!fixture.tick(minute * 60_000).dimmed);
        }
        assert!(fixture.display.backlight_on());
        assert_eq!(fixture.backlight_ops(false), 0);
    }

    #[test]
    fn test_no_render_while_dark() {
        let mut fixture = Fixture::new();
        fixture.tick(10_000);
        let renders = fixture.display.lcd().renders();

        assert!(!fixture.tick(11_000).rendered);
        assert_eq!(fixture.display.lcd().renders(), renders);
    }

    #[test]
    fn test_fps_limits_renders() {
        let mut fixture = Fixture::new();
        fixture.display.set_backlight_off_time(0);
        fixture.display.set_fps(10);

        let mut renders = 0;
        for now in (0..1_000).step_by(10) {
            if fixture.tick(now).rendered {
                renders += 1;
            }
        }
        // Frames at 100, 200, ... 900 ms
        assert_eq!(renders, 9);
    }

    #[test]
    fn test_fps_is_clamped() {
        let mut fixture = Fixture::new();
        fixture.display.set_fps(0);
        assert_eq!(fixture.display.fps(), 1);
        assert_eq!(fixture.display.config().frame_interval_ms(), 1000);

        fixture.display.set_fps(255);
        assert_eq!(fixture.display.config().frame_interval_ms(), 3);
    }

    #[test]
    fn test_suspended_display_does_nothing() {
        let mut fixture = Fixture::new();
        fixture.display.set_work_flag(false);
        let ops = fixture.display.lcd().ops.len();

        for minute in 0..=60u32 {
            assert_eq!(fixture.tick(minute * 60_000), TickOutcome::default());
        }
        assert_eq!(fixture.display.lcd().ops.len(), ops);
        assert!(fixture.display.backlight_on());
    }

    #[test]
    fn test_auto_reset_reinitializes() {
        let mut fixture = Fixture::new();
        fixture.display.set_backlight_off_time(0);
        fixture.tick(100);
        let stack_len = fixture.display.window_stack().len();

        let period = mins_to_ms(DISPLAY_AUTO_RESET_MINUTES);
        assert!(!fixture.tick(period - 1).reset);
        let outcome = fixture.tick(period);
        assert!(outcome.reset);
        assert!(outcome.rendered);

        let lcd = fixture.display.lcd();
        assert_eq!(lcd.count(|op| *op == LcdOp::Init), 2);
        // Main window reloads its glyphs after the controller lost them
        assert_eq!(lcd.count(|op| matches!(op, LcdOp::CreateGlyph(_))), 2);
        assert_eq!(fixture.display.window_stack().len(), stack_len);
        assert!(fixture.display.backlight_on());

        assert!(!fixture.tick(period + 1).reset);
        assert!(fixture.tick(2 * period).reset);
    }

    #[test]
    fn test_auto_reset_keeps_backlight_off() {
        let mut fixture = Fixture::new();
        fixture.tick(10_000);
        let outcome = fixture.tick(mins_to_ms(DISPLAY_AUTO_RESET_MINUTES));

        assert!(outcome.reset);
        assert!(!outcome.rendered);
        assert!(!fixture.display.backlight_on());
        assert_eq!(fixture.display.lcd().ops.last(), Some(&LcdOp::Backlight(false)));
    }

    #[test]
    fn test_auto_reset_disabled() {
        let mut fixture = Fixture::new();
        fixture.display.set_auto_reset_flag(false);
        assert!(!fixture.tick(mins_to_ms(DISPLAY_AUTO_RESET_MINUTES)).reset);
    }

    #[test]
    fn test_waking_input_is_swallowed() {
        let mut fixture = Fixture::new();
        fixture.tick(10_000);

        assert_eq!(fixture.input(11_000, InputEvent::Select), InputOutcome::Woke);
        assert_eq!(fixture.display.window_stack().len(), 1);

        assert_eq!(fixture.input(11_100, InputEvent::Select), InputOutcome::Handled);
        assert_eq!(fixture.display.window_stack().len(), 2);
        assert_eq!(fixture.display.head().map(|w| w.title()), Some("Settings"));
    }

    #[test]
    fn test_value_setter_result_reaches_parent() {
        let mut fixture = Fixture::new();
        fixture.display.set_fps(10);

        // Main -> Settings -> Display -> FPS setter
        fixture.input(1, InputEvent::Select);
        fixture.input(2, InputEvent::Select);
        fixture.input(3, InputEvent::Next);
        fixture.input(4, InputEvent::Select);
        assert_eq!(fixture.display.window_stack().len(), 4);
        assert_eq!(fixture.display.head().map(|w| w.title()), Some("FPS"));

        for now in 5..10 {
            fixture.input(now, InputEvent::Next);
        }
        fixture.input(10, InputEvent::Select);

        assert_eq!(fixture.display.fps(), 15);
        assert_eq!(fixture.display.window_stack().len(), 3);
        assert_eq!(fixture.display.head().map(|w| w.title()), Some("Display"));
    }

    #[test]
    fn test_closing_returns_to_previous_window() {
        let mut fixture = Fixture::new();
        fixture.input(1, InputEvent::Select);
        fixture.input(2, InputEvent::Back);

        assert_eq!(fixture.display.window_stack().len(), 1);
        assert_eq!(fixture.display.head().map(|w| w.title()), Some("Main"));
    }

    #[test]
    fn test_pop_window_only_pops_head() {
        let mut fixture = Fixture::new();
        let main = fixture.display.window_stack().head_id().unwrap();
        let settings = fixture
            .display
            .push_window(crate::windows::SettingsWindow::new().into())
            .unwrap();

        assert!(!fixture.display.pop_window(main));
        assert!(fixture.display.pop_window(settings));
        assert!(!fixture.display.pop_window(settings));
        assert_eq!(fixture.display.window_stack().len(), 1);
    }

    #[test]
    fn test_make_default_reseeds_main() {
        let mut fixture = Fixture::new();
        fixture.input(1, InputEvent::Select);
        fixture.display.set_fps(50);
        fixture.display.make_default();

        assert_eq!(fixture.display.window_stack().len(), 1);
        assert_eq!(fixture.display.head().map(|w| w.title()), Some("Main"));
        assert_eq!(fixture.display.fps(), DEFAULT_DISPLAY_FPS);
    }

    #[test]
    fn test_settings_round_trip() {
        let mut display = DisplayManager::new(RecordingLcd::new());
        display.set_auto_reset_flag(!DEFAULT_DISPLAY_AUTO_RESET_FLAG);
        display.set_backlight_off_time(0);
        display.set_fps(42);

        let mut buffer: SettingsBuffer<128> = SettingsBuffer::new();
        display.write_settings(&mut buffer).unwrap();

        let mut restored = DisplayManager::new(RecordingLcd::new());
        restored.read_settings(&buffer);
        assert_eq!(restored.config(), display.config());
    }

    #[test]
    fn test_loaded_fps_is_clamped() {
        let buffer: SettingsBuffer<64> = SettingsBuffer::from_text("SDf=0\n").unwrap();
        let mut display = DisplayManager::new(RecordingLcd::new());
        display.read_settings(&buffer);
        assert_eq!(display.fps(), MIN_DISPLAY_FPS);
    }

    #[test]
    fn test_remote_elements() {
        let mut display = DisplayManager::new(RecordingLcd::new());
        let mut list = ElementList::new();
        display.add_remote_elements(&mut list).unwrap();

        assert_eq!(list.len(), 3);
        assert_eq!(list[0].label.as_str(), "P dspl time");
        assert!(display.write_element("SDf", ElementValue::U8(0)));
        assert_eq!(display.read_element("SDf"), Some(ElementValue::U8(1)));
        assert!(!display.write_element("SDf", ElementValue::Bool(true)));
        assert_eq!(display.read_element("SMrdt"), None);
    }
}

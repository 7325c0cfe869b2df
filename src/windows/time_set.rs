//! Modal date and time editor
//!
//! `Next`/`Previous` change the selected field, `Select` moves on to the next
//! one and confirms after the year.

use core::fmt::Write;

use crate::app_state::{SystemView, WindowContext};
use crate::display_manager::DisplayConfig;
use crate::time_manager::{DateTime, days_in_month};
use crate::ui::{Action, CharLcd, InputEvent, LineBuffer, WindowResult, print_line};

use super::Window;

const MIN_YEAR: u16 = 2000;
const MAX_YEAR: u16 = 2099;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Hour,
    Minute,
    Second,
    Day,
    Month,
    Year,
}

impl TimeField {
    const ORDER: [TimeField; 6] = [
        Self::Hour,
        Self::Minute,
        Self::Second,
        Self::Day,
        Self::Month,
        Self::Year,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// Step `value` by one within `min..=max`, wrapping at both ends.
fn wrap_step(value: u16, min: u16, max: u16, up: bool) -> u16 {
    if up {
        if value >= max { min } else { value + 1 }
    } else if value <= min {
        max
    } else {
        value - 1
    }
}

#[derive(Debug)]
pub struct TimeSet {
    time: DateTime,
    field: usize,
    repaint: bool,
}

impl TimeSet {
    pub fn new(initial: DateTime) -> Self {
        let mut time = initial;
        time.year = time.year.clamp(MIN_YEAR, MAX_YEAR);
        time.month = time.month.clamp(1, 12);
        time.day = time.day.clamp(1, days_in_month(time.year, time.month));
        time.hour = time.hour.min(23);
        time.minute = time.minute.min(59);
        time.second = time.second.min(59);
        Self {
            time,
            field: 0,
            repaint: true,
        }
    }

    pub fn time(&self) -> &DateTime {
        &self.time
    }

    pub fn field(&self) -> TimeField {
        TimeField::ORDER[self.field]
    }

    fn adjust(&mut self, up: bool) {
        let field = self.field();
        let time = &mut self.time;
        match field {
            TimeField::Hour => time.hour = wrap_step(time.hour as u16, 0, 23, up) as u8,
            TimeField::Minute => time.minute = wrap_step(time.minute as u16, 0, 59, up) as u8,
            TimeField::Second => time.second = wrap_step(time.second as u16, 0, 59, up) as u8,
            TimeField::Day => {
                let last = days_in_month(time.year, time.month) as u16;
                time.day = wrap_step(time.day as u16, 1, last, up) as u8;
            }
            TimeField::Month => time.month = wrap_step(time.month as u16, 1, 12, up) as u8,
            TimeField::Year => time.year = wrap_step(time.year, MIN_YEAR, MAX_YEAR, up),
        }
        // Keep the day valid after month or year changes
        time.day = time.day.clamp(1, days_in_month(time.year, time.month));
    }
}

impl Window for TimeSet {
    fn title(&self) -> &str {
        "Set time"
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

        let time = &self.time;
        let mut line = LineBuffer::new();
        print_line(lcd, 0, "Set time")?;

        write!(line, "{:02}:{:02}:{:02}", time.hour, time.minute, time.second).ok();
        print_line(lcd, 1, &line)?;

        line.clear();
        write!(line, "{:02}.{:02}.{:04}", time.day, time.month, time.year).ok();
        print_line(lcd, 2, &line)?;

        line.clear();
        write!(line, "Edit: {}", self.field().name()).ok();
        print_line(lcd, 3, &line)
    }

    fn handle_input(&mut self, event: InputEvent, _ctx: &mut WindowContext<'_, '_>) -> Option<Action> {
        self.repaint = true;
        match event {
            InputEvent::Next => self.adjust(true),
            InputEvent::Previous => self.adjust(false),
            InputEvent::Select => {
                if self.field + 1 < TimeField::ORDER.len() {
                    self.field += 1;
                } else {
                    let time = &self.time;
                    let result = DateTime::new(
                        time.year,
                        time.month,
                        time.day,
                        time.hour,
                        time.minute,
                        time.second,
                    );
                    return Some(Action::CloseWith(WindowResult::Time(result)));
                }
            }
            InputEvent::Back => return Some(Action::Close),
        }
        None
    }

    fn invalidate(&mut self) {
        self.repaint = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::SystemContext;
    use crate::module_manager::ModuleManager;
    use crate::time_manager::TimeManager;

    fn send(window: &mut TimeSet, events: &[InputEvent]) -> Option<Action> {
        let mut modules = ModuleManager::new();
        let mut time = TimeManager::new();
        let mut config = DisplayConfig::new();
        let mut system = SystemContext::new(&mut modules, &mut time, 0);
        let mut ctx = WindowContext {
            display: &mut config,
            system: &mut system,
        };
        let mut action = None;
        for event in events {
            action = window.handle_input(*event, &mut ctx);
        }
        action
    }

    #[test]
    fn test_fields_wrap() {
        let mut window = TimeSet::new(DateTime::new(2025, 1, 14, 23, 0, 0));
        send(&mut window, &[InputEvent::Next]);
        assert_eq!(window.time().hour, 0);
        send(&mut window, &[InputEvent::Select, InputEvent::Previous]);
        assert_eq!(window.field(), TimeField::Minute);
        assert_eq!(window.time().minute, 59);
    }

    #[test]
    fn test_day_follows_month_length() {
        let mut window = TimeSet::new(DateTime::new(2025, 1, 31, 12, 0, 0));
        // Skip to the month field and step to February
        send(
            &mut window,
            &[
                InputEvent::Select,
                InputEvent::Select,
                InputEvent::Select,
                InputEvent::Select,
                InputEvent::Next,
            ],
        );
        assert_eq!(window.time().month, 2);
        assert_eq!(window.time().day, 28);
    }

    #[test]
    fn test_confirm_after_last_field() {
        let mut window = TimeSet::new(DateTime::new(2025, 1, 14, 10, 0, 0));
        let mut events = [InputEvent::Select; 7];
        events[0] = InputEvent::Next;
        send(&mut window, &events[..1]);

        match send(&mut window, &events[1..]) {
            Some(Action::CloseWith(WindowResult::Time(time))) => {
                assert_eq!(time, DateTime::new(2025, 1, 14, 11, 0, 0));
                assert_eq!(time.weekday, 2);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_back_cancels() {
        let mut window = TimeSet::new(DateTime::EPOCH);
        assert_eq!(window.time().year, MIN_YEAR);
        assert!(matches!(
            send(&mut window, &[InputEvent::Back]),
            Some(Action::Close)
        ));
    }

    #[test]
    fn test_invalid_initial_time_is_normalised() {
        let mut initial = DateTime::new(2025, 1, 31, 12, 0, 0);
        initial.month = 0;
        initial.day = 40;
        initial.hour = 30;
        let mut window = TimeSet::new(initial);

        assert_eq!(window.time().month, 1);
        assert_eq!(window.time().day, 31);
        assert_eq!(window.time().hour, 23);

        initial.month = 13;
        initial.day = 0;
        window = TimeSet::new(initial);
        assert_eq!(window.time().month, 12);
        assert_eq!(window.time().day, 1);

        // Editing no longer hits an empty day range
        send(
            &mut window,
            &[
                InputEvent::Select,
                InputEvent::Select,
                InputEvent::Select,
                InputEvent::Next,
            ],
        );
        assert_eq!(window.time().day, 2);
    }
}

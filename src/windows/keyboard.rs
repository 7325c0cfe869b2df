//! On-screen keyboard for short text fields (probe names)

use crate::app_state::{SystemView, WindowContext};
use crate::display_manager::DisplayConfig;
use crate::ui::{
    Action, CharLcd, InputEvent, LineBuffer, TEXT_RESULT_LEN, TextResult, WindowResult,
    print_line,
};

use super::Window;

const CHARSET: &str = "abcdefghijklmnopqrstuvwxyz0123456789 -_";

/// Keys shown either side of the selected one
const STRIP_RADIUS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Char(char),
    Caps,
    Delete,
    Done,
}

impl Key {
    const SPECIAL: [Key; 3] = [Key::Caps, Key::Delete, Key::Done];

    fn count() -> usize {
        CHARSET.len() + Self::SPECIAL.len()
    }

    fn at(index: usize) -> Key {
        match CHARSET.chars().nth(index) {
            Some(ch) => Key::Char(ch),
            None => Self::SPECIAL[(index - CHARSET.len()) % Self::SPECIAL.len()],
        }
    }
}

#[derive(Debug)]
pub struct Keyboard {
    label: &'static str,
    text: TextResult,
    max_len: usize,
    key_cursor: usize,
    caps: bool,
    repaint: bool,
}

impl Keyboard {
    /// Edit `initial`, allowing at most `max_len` characters.
    pub fn new(label: &'static str, initial: &str, max_len: usize) -> Self {
        let max_len = max_len.min(TEXT_RESULT_LEN);
        let mut text = TextResult::new();
        for ch in initial.chars().take(max_len) {
            text.push(ch).ok();
        }

        Self {
            label,
            text,
            max_len,
            key_cursor: 0,
            caps: false,
            repaint: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn shown(&self, ch: char) -> char {
        if self.caps { ch.to_ascii_uppercase() } else { ch }
    }

    fn key_label(&self, key: Key) -> &'static str {
        match key {
            Key::Char(_) => "",
            Key::Caps => "CAPS",
            Key::Delete => "DEL",
            Key::Done => "OK",
        }
    }

    fn key_glyph(&self, key: Key) -> char {
        match key {
            Key::Char(ch) => self.shown(ch),
            Key::Caps => '^',
            Key::Delete => '<',
            Key::Done => '#',
        }
    }

    fn press(&mut self) -> Option<Action> {
        match Key::at(self.key_cursor) {
            Key::Char(ch) => {
                if self.text.chars().count() < self.max_len {
                    self.text.push(self.shown(ch)).ok();
                }
            }
            Key::Caps => self.caps = !self.caps,
            Key::Delete => {
                self.text.pop();
            }
            Key::Done => return Some(Action::CloseWith(WindowResult::Text(self.text.clone()))),
        }
        None
    }
}

impl Window for Keyboard {
    fn title(&self) -> &str {
        self.label
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

        print_line(lcd, 0, self.label)?;

        let mut line = LineBuffer::new();
        line.push_str(&self.text).ok();
        if self.text.chars().count() < self.max_len {
            line.push('_').ok();
        }
        print_line(lcd, 1, &line)?;

        let count = Key::count();
        line.clear();
        for offset in 0..=2 * STRIP_RADIUS {
            let index = (self.key_cursor + count + offset - STRIP_RADIUS) % count;
            let glyph = self.key_glyph(Key::at(index));
            if offset == STRIP_RADIUS {
                line.push('[').ok();
                line.push(glyph).ok();
                line.push(']').ok();
            } else {
                line.push(' ').ok();
                line.push(glyph).ok();
                line.push(' ').ok();
            }
        }
        print_line(lcd, 2, &line)?;

        print_line(lcd, 3, self.key_label(Key::at(self.key_cursor)))
    }

    fn handle_input(&mut self, event: InputEvent, _ctx: &mut WindowContext<'_, '_>) -> Option<Action> {
        let count = Key::count();
        self.repaint = true;
        match event {
            InputEvent::Next => {
                self.key_cursor = (self.key_cursor + 1) % count;
                None
            }
            InputEvent::Previous => {
                self.key_cursor = (self.key_cursor + count - 1) % count;
                None
            }
            InputEvent::Select => self.press(),
            InputEvent::Back => Some(Action::Close),
        }
    }

    fn invalidate(&mut self) {
        self.repaint = true;
    }
}

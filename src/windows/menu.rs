//! Cursor and paging for vertical menus

use crate::ui::{CharLcd, InputEvent, LCD_ROWS, LineBuffer, print_line};

/// Selected row of a list of `len` items, shown one LCD page at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuCursor {
    position: u8,
    len: u8,
}

impl MenuCursor {
    pub const fn new(len: u8) -> Self {
        Self { position: 0, len }
    }

    pub const fn position(&self) -> u8 {
        self.position
    }

    pub const fn len(&self) -> u8 {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Resize the list, keeping the cursor on the last item if it shrank.
    pub fn set_len(&mut self, len: u8) {
        self.len = len;
        if self.position >= len {
            self.position = len.saturating_sub(1);
        }
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.position = (self.position + 1) % self.len;
        }
    }

    pub fn previous(&mut self) {
        if self.len > 0 {
            self.position = if self.position == 0 {
                self.len - 1
            } else {
                self.position - 1
            };
        }
    }

    /// Move on `Next` / `Previous`. Returns `true` if the event was a move.
    pub fn step(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::Next => self.next(),
            InputEvent::Previous => self.previous(),
            _ => return false,
        }
        true
    }

    /// First item of the page holding the cursor, `rows` items per page.
    pub const fn page_start(&self, rows: u8) -> u8 {
        if rows == 0 {
            return 0;
        }
        self.position / rows * rows
    }
}

/// Draw the page holding the cursor from `first_row` down, with a `>` marker
/// in front of the selected item. `line` formats item `index` into the buffer.
pub fn render_menu<L, F>(
    lcd: &mut L,
    first_row: u8,
    cursor: &MenuCursor,
    mut line: F,
) -> Result<(), L::Error>
where
    L: CharLcd,
    F: FnMut(u8, &mut LineBuffer),
{
    let rows = LCD_ROWS.saturating_sub(first_row);
    let start = cursor.page_start(rows);

    for offset in 0..rows {
        let index = start + offset;
        let mut text = LineBuffer::new();
        if index < cursor.len() {
            text.push(if index == cursor.position() { '>' } else { ' ' })
                .ok();
            line(index, &mut text);
        }
        print_line(lcd, first_row + offset, &text)?;
    }
    Ok(())
}

/// "on" / "off" for boolean settings
pub const fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingLcd;
    use core::fmt::Write;

    #[test]
    fn test_cursor_wraps() {
        let mut cursor = MenuCursor::new(3);
        cursor.previous();
        assert_eq!(cursor.position(), 2);
        cursor.next();
        assert_eq!(cursor.position(), 0);
        assert!(!cursor.step(InputEvent::Select));
    }

    #[test]
    fn test_empty_cursor_stays_put() {
        let mut cursor = MenuCursor::new(0);
        cursor.next();
        cursor.previous();
        assert_eq!(cursor.position(), 0);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_shrinking_list_clamps_cursor() {
        let mut cursor = MenuCursor::new(6);
        for _ in 0..5 {
            cursor.next();
        }
        cursor.set_len(2);
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_render_pages() {
        let mut lcd = RecordingLcd::new();
        let mut cursor = MenuCursor::new(6);
        for _ in 0..4 {
            cursor.next();
        }

        render_menu(&mut lcd, 0, &cursor, |index, text| {
            write!(text, "Item {}", index).ok();
        })
        .unwrap();

        assert_eq!(lcd.row(0).trim_end(), ">Item 4");
        assert_eq!(lcd.row(1).trim_end(), " Item 5");
        assert_eq!(lcd.row(2).trim_end(), "");
    }
}

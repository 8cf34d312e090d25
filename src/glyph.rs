use core::fmt;
use crate::constants::vga::{BUFFER_CELLS, BUFFER_WIDTH, TEXT_ROWS};
use crate::serial::SerialSink;
use crate::vga_buffer::{ColorCode, Screen, ScreenChar, DEFAULT_COLOR};

/// One unit of console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Byte(u8),
    /// Step back one cell; the blank cursor cell hides what was there.
    Erase,
}

/// Renders glyphs onto a `Screen` at the hardware cursor, mirroring each one
/// to a serial sink first.
pub struct GlyphSink<S, W> {
    screen: S,
    serial: W,
    color: Option<ColorCode>,
}

impl<S: Screen, W: SerialSink> GlyphSink<S, W> {
    pub fn new(screen: S, serial: W) -> GlyphSink<S, W> {
        GlyphSink { screen, serial, color: None }
    }

    /// Attribute locked in through the color picker, if any.
    pub fn color(&self) -> Option<ColorCode> {
        self.color
    }

    pub fn set_color(&mut self, color: Option<ColorCode>) {
        self.color = color;
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut S {
        &mut self.screen
    }

    pub fn serial(&self) -> &W {
        &self.serial
    }

    pub fn put(&mut self, glyph: Glyph) {
        match glyph {
            Glyph::Byte(byte) => self.serial.put(byte),
            Glyph::Erase => self.serial.erase(),
        }
        self.render(glyph);
    }

    pub fn put_byte(&mut self, byte: u8) {
        self.put(Glyph::Byte(byte));
    }

    fn render(&mut self, glyph: Glyph) {
        let mut pos = self.screen.cursor();

        match glyph {
            Glyph::Byte(b'\n') => pos += BUFFER_WIDTH - pos % BUFFER_WIDTH,
            Glyph::Erase => pos = pos.saturating_sub(1),
            Glyph::Byte(byte) => {
                let color = self.color.unwrap_or(DEFAULT_COLOR);
                self.screen.write(pos, ScreenChar::new(byte, color));
                pos += 1;
            }
        }

        if pos > BUFFER_CELLS {
            panic!("pos under/overflow");
        }

        if pos / BUFFER_WIDTH >= TEXT_ROWS {
            self.screen.scroll_up();
            pos -= BUFFER_WIDTH;
        }

        self.screen.set_cursor(pos);
        self.screen.write(pos, ScreenChar::blank());
    }
}

impl<S: Screen, W: SerialSink> fmt::Write for GlyphSink<S, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            self.put_byte(byte);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryScreen, SerialLog};
    use crate::vga_buffer::Color;

    fn sink() -> GlyphSink<MemoryScreen, SerialLog> {
        GlyphSink::new(MemoryScreen::new(), SerialLog::default())
    }

    fn put_all(sink: &mut GlyphSink<MemoryScreen, SerialLog>, bytes: &[u8]) {
        for &b in bytes {
            sink.put_byte(b);
        }
    }

    #[test]
    fn newline_moves_to_next_row_start() {
        let mut s = sink();
        put_all(&mut s, b"A\n");
        assert_eq!(s.screen_mut().cursor(), BUFFER_WIDTH);
        put_all(&mut s, b"B");
        assert_eq!(s.screen().read(0).ascii_character, b'A');
        assert_eq!(s.screen().read(BUFFER_WIDTH).ascii_character, b'B');
        assert_eq!(s.screen_mut().cursor(), BUFFER_WIDTH + 1);
    }

    #[test]
    fn erase_steps_back_and_blanks_cursor_cell() {
        let mut s = sink();
        put_all(&mut s, b"ab");
        s.put(Glyph::Erase);
        assert_eq!(s.screen_mut().cursor(), 1);
        assert_eq!(s.screen().read(1), ScreenChar::blank());
        assert_eq!(s.screen().read(0).ascii_character, b'a');
        assert_eq!(s.serial().bytes, b"ab\x08 \x08");
    }

    #[test]
    fn erase_at_origin_stays_put() {
        let mut s = sink();
        s.put(Glyph::Erase);
        assert_eq!(s.screen_mut().cursor(), 0);
    }

    #[test]
    fn locked_color_applies_to_glyphs_not_cursor() {
        let mut s = sink();
        let color = ColorCode::new(Color::Cyan, Color::Red);
        s.set_color(Some(color));
        put_all(&mut s, b"x");
        assert_eq!(s.screen().read(0), ScreenChar::new(b'x', color));
        assert_eq!(s.screen().read(1), ScreenChar::blank());
    }

    #[test]
    fn one_scroll_per_overflow_row() {
        let mut s = sink();
        for row in 0..TEXT_ROWS {
            put_all(&mut s, &[b'L', b'a' + row as u8, b'\n']);
        }
        // the 24th newline reached the last row and scrolled once
        assert_eq!(s.screen().row_text(0), "Lb");
        assert_eq!(s.screen().row_text(TEXT_ROWS - 2), "Lx");
        assert!(s.screen().row(TEXT_ROWS - 1).iter().all(|c| *c == ScreenChar::blank()));
        assert_eq!(s.screen_mut().cursor(), (TEXT_ROWS - 1) * BUFFER_WIDTH);

        put_all(&mut s, b"Lz\n");
        assert_eq!(s.screen().row_text(0), "Lc");
        assert_eq!(s.screen().row_text(TEXT_ROWS - 2), "Lz");
        assert!(s.screen().row(TEXT_ROWS - 1).iter().all(|c| *c == ScreenChar::blank()));
    }

    #[test]
    fn wrapping_past_last_column_scrolls_too() {
        let mut s = sink();
        s.screen_mut().set_cursor(TEXT_ROWS * BUFFER_WIDTH - 1);
        put_all(&mut s, b"q");
        assert_eq!(s.screen_mut().cursor(), (TEXT_ROWS - 1) * BUFFER_WIDTH);
        assert_eq!(s.screen().read((TEXT_ROWS - 1) * BUFFER_WIDTH - 1).ascii_character, b'q');
    }

    #[test]
    #[should_panic]
    fn cursor_past_screen_is_fatal() {
        let mut s = GlyphSink::new(MemoryScreen::with_cursor(BUFFER_CELLS), SerialLog::default());
        s.put_byte(b'x');
    }
}

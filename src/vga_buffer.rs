use volatile::Volatile;
use x86_64::instructions::port::Port;
use crate::constants::vga::{
    BUFFER_ADDR, BUFFER_CELLS, BUFFER_WIDTH, COMMAND_PORT, CURSOR_LOCATION_HIGH,
    CURSOR_LOCATION_LOW, DATA_PORT, TEXT_ROWS,
};

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

/// Attribute byte of a cell: background in the high nibble, foreground in the low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorCode(u8);

impl ColorCode {
    pub const fn new(foreground: Color, background: Color) -> ColorCode {
        ColorCode((background as u8) << 4 | (foreground as u8))
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// Light gray on black.
pub const DEFAULT_COLOR: ColorCode = ColorCode::new(Color::LightGray, Color::Black);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct ScreenChar {
    pub ascii_character: u8,
    pub color_code: ColorCode,
}

impl ScreenChar {
    pub const fn new(ascii_character: u8, color_code: ColorCode) -> ScreenChar {
        ScreenChar { ascii_character, color_code }
    }

    /// The blank glyph left under the cursor and used to clear rows.
    pub const fn blank() -> ScreenChar {
        ScreenChar::new(b' ', DEFAULT_COLOR)
    }

    /// Cell as the 16-bit word the hardware stores.
    pub const fn to_word(self) -> u16 {
        (self.color_code.0 as u16) << 8 | self.ascii_character as u16
    }

    pub const fn from_word(word: u16) -> ScreenChar {
        ScreenChar::new(word as u8, ColorCode((word >> 8) as u8))
    }
}

/// A flat grid of `BUFFER_CELLS` cells addressed by `row * 80 + col`,
/// plus the hardware cursor register.
///
/// Offsets outside the grid are a fatal error; implementations panic
/// instead of clamping.
pub trait Screen {
    fn read(&self, offset: usize) -> ScreenChar;
    fn write(&mut self, offset: usize, cell: ScreenChar);
    fn cursor(&mut self) -> usize;
    fn set_cursor(&mut self, offset: usize);

    /// Moves text rows 1.. up by one row and blanks the last text row.
    fn scroll_up(&mut self) {
        for offset in 0..(TEXT_ROWS - 1) * BUFFER_WIDTH {
            let cell = self.read(offset + BUFFER_WIDTH);
            self.write(offset, cell);
        }
        for offset in (TEXT_ROWS - 1) * BUFFER_WIDTH..TEXT_ROWS * BUFFER_WIDTH {
            self.write(offset, ScreenChar::blank());
        }
    }
}

#[repr(transparent)]
struct Buffer {
    chars: [Volatile<ScreenChar>; BUFFER_CELLS],
}

/// Memory-mapped CGA text buffer and the CRT controller's cursor registers.
pub struct VgaScreen {
    buffer: &'static mut Buffer,
    command: Port<u8>,
    data: Port<u8>,
}

impl VgaScreen {
    /// # Safety
    ///
    /// At most one `VgaScreen` may exist; it owns the text buffer at
    /// `BUFFER_ADDR` and the CRT controller ports.
    pub unsafe fn new() -> VgaScreen {
        VgaScreen {
            buffer: &mut *(BUFFER_ADDR as *mut Buffer),
            command: Port::new(COMMAND_PORT),
            data: Port::new(DATA_PORT),
        }
    }

    fn check(offset: usize) {
        if offset >= BUFFER_CELLS {
            panic!("video cell {} out of range", offset);
        }
    }
}

impl Screen for VgaScreen {
    fn read(&self, offset: usize) -> ScreenChar {
        Self::check(offset);
        self.buffer.chars[offset].read()
    }

    fn write(&mut self, offset: usize, cell: ScreenChar) {
        Self::check(offset);
        self.buffer.chars[offset].write(cell);
    }

    fn cursor(&mut self) -> usize {
        unsafe {
            self.command.write(CURSOR_LOCATION_HIGH);
            let high = self.data.read() as usize;
            self.command.write(CURSOR_LOCATION_LOW);
            let low = self.data.read() as usize;
            high << 8 | low
        }
    }

    fn set_cursor(&mut self, offset: usize) {
        unsafe {
            self.command.write(CURSOR_LOCATION_HIGH);
            self.data.write((offset >> 8) as u8);
            self.command.write(CURSOR_LOCATION_LOW);
            self.data.write(offset as u8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryScreen;

    #[test]
    fn color_code_packs_background_high() {
        assert_eq!(DEFAULT_COLOR.bits(), 0x07);
        assert_eq!(ColorCode::new(Color::LightGray, Color::Green).bits(), 0x27);
        assert_eq!(ColorCode::new(Color::Black, Color::LightGray).bits(), 0x70);
    }

    #[test]
    fn cell_word_layout() {
        let cell = ScreenChar::new(b'A', ColorCode::new(Color::Cyan, Color::Red));
        assert_eq!(cell.to_word(), 0x4341);
        assert_eq!(ScreenChar::from_word(0x4341), cell);
        assert_eq!(ScreenChar::blank().to_word(), 0x0720);
    }

    #[test]
    fn scroll_up_moves_rows_and_blanks_last_text_row() {
        let mut screen = MemoryScreen::new();
        let marker = ScreenChar::new(b'x', DEFAULT_COLOR);
        screen.write(BUFFER_WIDTH + 3, marker);
        screen.write((TEXT_ROWS - 1) * BUFFER_WIDTH + 7, marker);

        screen.scroll_up();

        assert_eq!(screen.read(3), marker);
        assert_eq!(screen.read((TEXT_ROWS - 2) * BUFFER_WIDTH + 7), marker);
        assert!(screen.row(TEXT_ROWS - 1).iter().all(|c| *c == ScreenChar::blank()));
    }
}

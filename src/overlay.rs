//! Color-picker overlay.
//!
//! A 9×9 cell menu drawn straight into video memory above the cursor. Rows
//! 1, 3, 5 and 7 are swatches, the rows between them separators. The cells it
//! covers are captured once per open and written back verbatim on close.

use crate::constants::console::{OVERLAY_NEXT, OVERLAY_PREVIOUS};
use crate::constants::vga::{BUFFER_CELLS, BUFFER_WIDTH};
use crate::vga_buffer::{Color, ColorCode, Screen, ScreenChar};

pub const MENU_WIDTH: usize = 9;
pub const MENU_ROWS: usize = 9;
pub const MENU_CELLS: usize = MENU_WIDTH * MENU_ROWS;
pub const SWATCH_COUNT: usize = 4;
/// Length of a swatch label, the cells between its two `:` borders.
pub const NAME_LEN: usize = 7;

/// Cells skipped between the end of one menu row and the start of the next.
const ROW_GAP: usize = BUFFER_WIDTH - MENU_WIDTH;

/// Row starts scanned for "cursor sits in the last cells of the row above".
const EDGE_SCAN_FIRST: usize = 880;
const EDGE_SCAN_END: usize = BUFFER_CELLS;
const EDGE_MARGIN: usize = MENU_WIDTH;

/// Distance from the cursor back to the anchor, normally and near a row end.
/// The two differ by ten, not nine; the menu lands one column further left
/// than a symmetric layout would put it.
const ANCHOR_BACK: usize = 719;
const ANCHOR_BACK_AT_EDGE: usize = 729;

const MENU_COLOR: ColorCode = ColorCode::new(Color::Black, Color::LightGray);
const HIGHLIGHT_COLOR: ColorCode = ColorCode::new(Color::LightGray, Color::Green);

const MENU: [&[u8; MENU_WIDTH]; MENU_ROWS] = [
    b"_________",
    b":WHT BLK:",
    b"_________",
    b":PUR WHT:",
    b"_________",
    b":RED AQU:",
    b"_________",
    b":WHT YEL:",
    b"_________",
];

/// Offset of the top-left menu cell for a given cursor position, or `None`
/// when the menu would not fit on screen there.
pub fn anchor_for_cursor(cursor: usize) -> Option<usize> {
    let near_row_end = (EDGE_SCAN_FIRST..EDGE_SCAN_END)
        .step_by(BUFFER_WIDTH)
        .any(|limit| limit > cursor && limit - cursor < EDGE_MARGIN);
    let back = if near_row_end { ANCHOR_BACK_AT_EDGE } else { ANCHOR_BACK };

    let anchor = cursor.checked_sub(back)?;
    if cell_offset(anchor, MENU_CELLS - 1) >= BUFFER_CELLS {
        return None;
    }
    Some(anchor)
}

/// Screen offset of the `index`th menu cell, counted row by row.
pub const fn cell_offset(anchor: usize, index: usize) -> usize {
    anchor + (index / MENU_WIDTH) * (MENU_WIDTH + ROW_GAP) + index % MENU_WIDTH
}

/// Screen offset of the first cell of a swatch row.
pub const fn swatch_offset(anchor: usize, swatch: usize) -> usize {
    cell_offset(anchor, (2 * swatch + 1) * MENU_WIDTH)
}

/// Foreground/background pairs offered by the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swatch {
    WhiteBlack,
    PurpleWhite,
    RedAqua,
    WhiteYellow,
}

impl Swatch {
    /// Looks up a swatch by its 7-character label. Unknown labels fall back
    /// to `WhiteYellow`.
    pub fn from_name(name: &[u8; NAME_LEN]) -> Swatch {
        match name {
            b"WHT BLK" => Swatch::WhiteBlack,
            b"PUR WHT" => Swatch::PurpleWhite,
            b"RED AQU" => Swatch::RedAqua,
            _ => Swatch::WhiteYellow,
        }
    }

    pub const fn color_code(self) -> ColorCode {
        match self {
            Swatch::WhiteBlack => ColorCode::new(Color::Black, Color::LightGray),
            Swatch::PurpleWhite => ColorCode::new(Color::LightGray, Color::Magenta),
            Swatch::RedAqua => ColorCode::new(Color::Cyan, Color::Red),
            Swatch::WhiteYellow => ColorCode::new(Color::Brown, Color::LightGray),
        }
    }
}

/// What a key pressed while the menu is open asks the driver to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    None,
    /// Lock in this attribute for subsequent output.
    Select(ColorCode),
}

pub struct Overlay {
    /// Top-left cell while open; fixed from open to close.
    anchor: Option<usize>,
    content_saved: bool,
    saved: [ScreenChar; MENU_CELLS],
    selection: usize,
    highlighted: bool,
    pending: Option<[u8; NAME_LEN]>,
}

impl Overlay {
    pub const fn new() -> Overlay {
        Overlay {
            anchor: None,
            content_saved: false,
            saved: [ScreenChar::blank(); MENU_CELLS],
            selection: 0,
            highlighted: false,
            pending: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    /// Index of the highlighted swatch, if navigation has started.
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted.then_some(self.selection)
    }

    /// Label recorded by the last navigation step.
    pub fn pending_name(&self) -> Option<&[u8; NAME_LEN]> {
        self.pending.as_ref()
    }

    /// Draws the menu above the hardware cursor. Already open: redraws at the
    /// anchor it was opened at. Returns false when there is no room to open.
    pub fn open<S: Screen>(&mut self, screen: &mut S) -> bool {
        if self.anchor.is_none() {
            let cursor = screen.cursor();
            let Some(anchor) = anchor_for_cursor(cursor) else {
                kwarn!("color picker: no room above cursor {}", cursor);
                return false;
            };
            self.anchor = Some(anchor);
            self.selection = 0;
            self.highlighted = false;
            self.pending = None;
            kdebug!("color picker: open at {}", anchor);
        }
        self.draw(screen);
        true
    }

    /// Restores the captured cells and hides the menu.
    pub fn close<S: Screen>(&mut self, screen: &mut S) {
        let Some(anchor) = self.anchor.take() else {
            return;
        };
        if self.content_saved {
            for (index, cell) in self.saved.iter().enumerate() {
                screen.write(cell_offset(anchor, index), *cell);
            }
        }
        self.content_saved = false;
        self.highlighted = false;
        self.pending = None;
        kdebug!("color picker: closed");
    }

    /// Handles a key while the menu is open.
    pub fn handle_key<S: Screen>(&mut self, key: u8, screen: &mut S) -> MenuAction {
        if !self.is_visible() {
            return MenuAction::None;
        }
        match key {
            OVERLAY_PREVIOUS => {
                self.selection = (self.selection + SWATCH_COUNT - 1) % SWATCH_COUNT;
                self.highlight(screen);
                MenuAction::None
            }
            OVERLAY_NEXT => {
                self.selection = (self.selection + 1) % SWATCH_COUNT;
                self.highlight(screen);
                MenuAction::None
            }
            b'\r' | b'\n' => match self.pending {
                Some(name) => MenuAction::Select(Swatch::from_name(&name).color_code()),
                None => MenuAction::None,
            },
            _ => MenuAction::None,
        }
    }

    fn draw<S: Screen>(&mut self, screen: &mut S) {
        let Some(anchor) = self.anchor else {
            return;
        };
        for index in 0..MENU_CELLS {
            let offset = cell_offset(anchor, index);
            if !self.content_saved {
                self.saved[index] = screen.read(offset);
            }
            let glyph = MENU[index / MENU_WIDTH][index % MENU_WIDTH];
            screen.write(offset, ScreenChar::new(glyph, MENU_COLOR));
        }
        self.content_saved = true;
    }

    fn highlight<S: Screen>(&mut self, screen: &mut S) {
        let Some(anchor) = self.anchor else {
            return;
        };
        self.draw(screen);

        let start = swatch_offset(anchor, self.selection);
        let mut name = [0u8; NAME_LEN];
        for column in 0..MENU_WIDTH {
            let cell = screen.read(start + column);
            if (1..=NAME_LEN).contains(&column) {
                name[column - 1] = cell.ascii_character;
            }
            screen.write(start + column, ScreenChar::new(cell.ascii_character, HIGHLIGHT_COLOR));
        }
        self.pending = Some(name);
        self.highlighted = true;
    }
}

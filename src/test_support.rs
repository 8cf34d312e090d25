//! Host-side stand-ins for the video surface, the serial line and the
//! scheduler, used by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use spin::{Mutex, MutexGuard};

use crate::constants::vga::{BUFFER_CELLS, BUFFER_WIDTH};
use crate::serial::SerialSink;
use crate::task::Scheduler;
use crate::vga_buffer::{Screen, ScreenChar};

/// Video memory backed by a plain vector; starts blank with the cursor at 0.
pub struct MemoryScreen {
    cells: Vec<ScreenChar>,
    cursor: usize,
}

impl MemoryScreen {
    pub fn new() -> MemoryScreen {
        MemoryScreen {
            cells: vec![ScreenChar::blank(); BUFFER_CELLS],
            cursor: 0,
        }
    }

    pub fn with_cursor(cursor: usize) -> MemoryScreen {
        let mut screen = MemoryScreen::new();
        screen.cursor = cursor;
        screen
    }

    pub fn row(&self, row: usize) -> &[ScreenChar] {
        &self.cells[row * BUFFER_WIDTH..(row + 1) * BUFFER_WIDTH]
    }

    /// Glyphs of a row with trailing blanks removed.
    pub fn row_text(&self, row: usize) -> String {
        let text: String = self.row(row).iter().map(|c| c.ascii_character as char).collect();
        text.trim_end().to_string()
    }

    pub fn cells(&self) -> &[ScreenChar] {
        &self.cells
    }
}

impl Screen for MemoryScreen {
    fn read(&self, offset: usize) -> ScreenChar {
        self.cells[offset]
    }

    fn write(&mut self, offset: usize, cell: ScreenChar) {
        self.cells[offset] = cell;
    }

    fn cursor(&mut self) -> usize {
        self.cursor
    }

    fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset;
    }
}

/// Records every byte sent down the serial line.
#[derive(Default)]
pub struct SerialLog {
    pub bytes: Vec<u8>,
}

impl SerialSink for SerialLog {
    fn put(&mut self, byte: u8) {
        self.bytes.push(byte);
    }
}

/// Sleep/wakeup over real threads: a sleeper spins on a wakeup generation
/// counter that it sampled while still holding the device lock, so a wakeup
/// issued between unlock and park is never lost.
#[derive(Default)]
pub struct ThreadScheduler {
    generation: AtomicUsize,
    sleepers: AtomicUsize,
    killed: AtomicBool,
    dumps: AtomicUsize,
}

impl ThreadScheduler {
    pub fn new() -> ThreadScheduler {
        ThreadScheduler::default()
    }

    pub fn sleepers(&self) -> usize {
        self.sleepers.load(Ordering::SeqCst)
    }

    pub fn dumps(&self) -> usize {
        self.dumps.load(Ordering::SeqCst)
    }

    pub fn kill(&self) {
        self.killed.store(true, Ordering::SeqCst);
    }

    /// Blocks the calling test thread until `count` tasks are parked.
    pub fn wait_for_sleepers(&self, count: usize) {
        while self.sleepers() < count {
            thread::yield_now();
        }
    }
}

impl Scheduler for ThreadScheduler {
    fn sleep<'a, T>(&self, lock: &'a Mutex<T>, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
        let seen = self.generation.load(Ordering::SeqCst);
        self.sleepers.fetch_add(1, Ordering::SeqCst);
        drop(guard);
        while self.generation.load(Ordering::SeqCst) == seen && !self.killed.load(Ordering::SeqCst) {
            thread::yield_now();
        }
        self.sleepers.fetch_sub(1, Ordering::SeqCst);
        lock.lock()
    }

    fn wakeup(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }

    fn procdump(&self) {
        self.dumps.fetch_add(1, Ordering::SeqCst);
    }
}

/// A `getc` source that yields the given bytes and then reports "no more input".
pub fn keys(bytes: &[u8]) -> impl FnMut() -> Option<u8> + '_ {
    let mut iter = bytes.iter().copied();
    move || iter.next()
}

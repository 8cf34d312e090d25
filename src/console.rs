//! Console device: keyboard and serial input through a line discipline into
//! blocking readers, output onto the video surface and COM1, and the
//! color-picker overlay.
//!
//! All state sits behind one spin lock. The interrupt path and the reader
//! path both take it with interrupts masked; readers release it only inside
//! `Scheduler::sleep`.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use spin::Mutex;
use lazy_static::lazy_static;

use crate::constants::console::{
    CONSOLE_MAJOR, CTRL_H, DEL, END_OF_INPUT, KILL_LINE, OVERLAY_TOGGLE, PROCESS_DUMP,
};
use crate::device::{CharDevice, InodeLock, DEVSW};
use crate::error::{Error, Result};
use crate::glyph::{Glyph, GlyphSink};
use crate::kprintf::{self, Arg};
use crate::line_buffer::LineBuffer;
use crate::overlay::{MenuAction, Overlay};
use crate::serial::{Com1, SerialSink};
use crate::task::{KernelTasks, Scheduler};
use crate::vga_buffer::{ColorCode, Screen, VgaScreen};

struct ConsoleState<S, W> {
    out: GlyphSink<S, W>,
    input: LineBuffer,
    overlay: Overlay,
    echo: bool,
}

impl<S: Screen, W: SerialSink> ConsoleState<S, W> {
    fn echo(&mut self, glyph: Glyph) {
        if self.echo {
            self.out.put(glyph);
        }
    }

    fn toggle_overlay(&mut self) {
        if self.overlay.is_visible() {
            self.overlay.close(self.out.screen_mut());
        } else {
            self.overlay.open(self.out.screen_mut());
        }
    }

    /// One raw key. Returns true when a line was published.
    fn key(&mut self, c: u8) -> bool {
        match c {
            KILL_LINE => {
                if !self.overlay.is_visible() {
                    while self.input.kill_one() {
                        self.echo(Glyph::Erase);
                    }
                }
            }
            CTRL_H | DEL => {
                if !self.overlay.is_visible() && self.input.erase() {
                    self.echo(Glyph::Erase);
                }
            }
            OVERLAY_TOGGLE => self.toggle_overlay(),
            _ if self.overlay.is_visible() => {
                if let MenuAction::Select(color) = self.overlay.handle_key(c, self.out.screen_mut()) {
                    kinfo!("console: color {:#04x} locked in", color.bits());
                    self.out.set_color(Some(color));
                }
            }
            _ => {
                if c != 0 && self.input.has_room() {
                    let c = if c == b'\r' { b'\n' } else { c };
                    self.input.push(c);
                    self.echo(Glyph::Byte(c));
                    if c == b'\n' || c == END_OF_INPUT || self.input.is_full() {
                        self.input.commit();
                        return true;
                    }
                }
            }
        }
        false
    }
}

/// The console device. One instance lives for the whole run of the kernel.
pub struct Console<S, W, T> {
    state: Mutex<ConsoleState<S, W>>,
    tasks: T,
    panicked: AtomicBool,
}

impl<S: Screen, W: SerialSink, T: Scheduler> Console<S, W, T> {
    pub fn new(screen: S, serial: W, tasks: T) -> Self {
        Console {
            state: Mutex::new(ConsoleState {
                out: GlyphSink::new(screen, serial),
                input: LineBuffer::new(),
                overlay: Overlay::new(),
                echo: true,
            }),
            tasks,
            panicked: AtomicBool::new(false),
        }
    }

    /// After a fatal error every producer stops here.
    fn freeze_if_panicked(&self) {
        if self.panicked.load(Ordering::SeqCst) {
            loop {
                core::hint::spin_loop();
            }
        }
    }

    /// Scheduler the device sleeps and wakes through.
    pub fn tasks(&self) -> &T {
        &self.tasks
    }

    pub fn is_panicked(&self) -> bool {
        self.panicked.load(Ordering::SeqCst)
    }

    /// Interrupt entry: drains `getc` through the line discipline. Never sleeps.
    pub fn interrupt(&self, mut getc: impl FnMut() -> Option<u8>) {
        self.freeze_if_panicked();
        let mut procdump = false;
        self.tasks.without_interrupts(|| {
            let mut state = self.state.lock();
            while let Some(c) = getc() {
                if c == PROCESS_DUMP {
                    // the dump prints through this console; run it after unlocking
                    procdump = true;
                } else if state.key(c) {
                    self.tasks.wakeup();
                }
            }
        });
        if procdump {
            self.tasks.procdump();
        }
    }

    /// Copies at most one published line into `dst`, blocking until one
    /// exists. Returns the number of bytes copied; 0 means end of input.
    pub fn read(&self, dst: &mut [u8]) -> Result<usize> {
        self.tasks.without_interrupts(|| {
            let mut state = self.state.lock();
            let mut n = 0;
            while n < dst.len() {
                while !state.input.has_ready() {
                    if self.tasks.killed() {
                        return Err(Error::Killed);
                    }
                    state = self.tasks.sleep(&self.state, state);
                }
                let Some(c) = state.input.pop() else {
                    continue;
                };
                if c == END_OF_INPUT {
                    if n > 0 {
                        // keep the marker so the next read returns 0
                        state.input.unread();
                    }
                    break;
                }
                dst[n] = c;
                n += 1;
                if c == b'\n' {
                    break;
                }
            }
            Ok(n)
        })
    }

    /// Renders every byte of `src`. Never fails part way.
    pub fn write(&self, src: &[u8]) -> usize {
        self.freeze_if_panicked();
        self.tasks.without_interrupts(|| {
            let mut state = self.state.lock();
            for &byte in src {
                state.out.put_byte(byte);
            }
        });
        src.len()
    }

    pub fn write_fmt(&self, args: fmt::Arguments) {
        use core::fmt::Write;
        self.freeze_if_panicked();
        self.tasks.without_interrupts(|| {
            let _ = self.state.lock().out.write_fmt(args);
        });
    }

    /// `%`-format printing for kernel diagnostics. A null format is fatal.
    pub fn cprintf(&self, fmt: Option<&str>, args: &[Arg]) {
        self.freeze_if_panicked();
        self.tasks.without_interrupts(|| {
            let mut state = self.state.lock();
            kprintf::format(fmt, args, |byte| state.out.put_byte(byte));
        });
    }

    /// Turns input echo on or off, returning the previous setting.
    pub fn set_echo(&self, on: bool) -> bool {
        self.tasks.without_interrupts(|| {
            let mut state = self.state.lock();
            core::mem::replace(&mut state.echo, on)
        })
    }

    /// Attribute locked in through the color picker.
    pub fn color(&self) -> Option<ColorCode> {
        self.tasks.without_interrupts(|| self.state.lock().out.color())
    }

    /// Fatal-error report. Takes the device lock even if a dead holder still
    /// owns it, prints the message and saved return addresses, then freezes
    /// every other producer.
    pub fn fatal(&self, cpu: u32, message: &dyn fmt::Display, pcs: &[usize]) {
        use core::fmt::Write;
        // SAFETY: nothing else runs once the fatal path starts
        unsafe { self.state.force_unlock() };
        let mut state = self.state.lock();
        let _ = write!(state.out, "cpu {}: panic: {}\n", cpu, message);
        for pc in pcs {
            let _ = write!(state.out, " {:x}", pc);
        }
        state.out.put_byte(b'\n');
        self.panicked.store(true, Ordering::SeqCst);
    }
}

impl<S, W, T> CharDevice for Console<S, W, T>
where
    S: Screen + Send,
    W: SerialSink + Send,
    T: Scheduler + Sync,
{
    fn read(&self, ip: &dyn InodeLock, dst: &mut [u8]) -> Result<usize> {
        ip.unlock();
        let result = Console::read(self, dst);
        ip.lock();
        result
    }

    fn write(&self, ip: &dyn InodeLock, src: &[u8]) -> Result<usize> {
        ip.unlock();
        let n = Console::write(self, src);
        ip.lock();
        Ok(n)
    }
}

pub type KernelConsole = Console<VgaScreen, Com1, KernelTasks>;

lazy_static! {
    pub static ref CONSOLE: KernelConsole =
        Console::new(unsafe { VgaScreen::new() }, Com1, KernelTasks::new());
}

/// Registers the console in the device-switch table.
pub fn init() -> Result<()> {
    let console: &'static KernelConsole = &CONSOLE;
    DEVSW.register(CONSOLE_MAJOR, console)?;
    kinfo!("console: registered as major {}", CONSOLE_MAJOR);
    Ok(())
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ($crate::console::_print(format_args!($($arg)*)));
}

#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)));
}

/// `printf`-style output: `kprintf!("%d items\n", n)`.
#[macro_export]
macro_rules! kprintf {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::console::CONSOLE.cprintf(
            ::core::option::Option::Some($fmt),
            &[$($crate::kprintf::Arg::from($arg)),*],
        )
    };
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    CONSOLE.write_fmt(args);
}

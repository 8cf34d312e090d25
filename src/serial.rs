use core::fmt;
use uart_16550::SerialPort;
use spin::Mutex;
use lazy_static::lazy_static;
use x86_64::instructions::port::Port;
use crate::constants::serial::{COM1, LINE_STATUS, LINE_STATUS_DATA_READY};
use crate::klog::Level;

lazy_static! {
    pub static ref SERIAL1: Mutex<SerialPort> = {
        let mut serial_port = unsafe { SerialPort::new(COM1) };
        serial_port.init();
        Mutex::new(serial_port)
    };
}

/// Byte-at-a-time output that mirrors what the console renders.
pub trait SerialSink {
    fn put(&mut self, byte: u8);

    /// Erase the previous character on the remote terminal.
    fn erase(&mut self) {
        self.put(0x08);
        self.put(b' ');
        self.put(0x08);
    }
}

/// The console's handle on COM1. Callers already run with interrupts masked.
pub struct Com1;

impl SerialSink for Com1 {
    fn put(&mut self, byte: u8) {
        SERIAL1.lock().send(byte);
    }

    // SerialPort::send expands a backspace into "\b \b" itself
    fn erase(&mut self) {
        SERIAL1.lock().send(0x08);
    }
}

/// Next byte received on COM1, if the line status register reports one.
pub fn serial_getc() -> Option<u8> {
    let mut status: Port<u8> = Port::new(LINE_STATUS);
    let mut data: Port<u8> = Port::new(COM1);
    unsafe {
        if status.read() & LINE_STATUS_DATA_READY == 0 {
            return None;
        }
        Some(data.read())
    }
}

#[doc(hidden)]
#[cfg(not(test))]
pub fn _log(level: Level, args: fmt::Arguments) {
    use core::fmt::Write;
    x86_64::instructions::interrupts::without_interrupts(|| {
        let mut port = SERIAL1.lock();
        let _ = write!(port, "{}{}\r\n", level.prefix(), args);
    });
}

#[doc(hidden)]
#[cfg(test)]
pub fn _log(level: Level, args: fmt::Arguments) {
    std::eprintln!("{}{}", level.prefix(), args);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SerialLog;

    #[test]
    fn default_erase_is_backspace_space_backspace() {
        let mut log = SerialLog::default();
        log.put(b'a');
        log.erase();
        assert_eq!(log.bytes, b"a\x08 \x08");
    }
}

use spin::Mutex;
use pc_keyboard::{layouts, DecodedKey, HandleControl, Keyboard, ScancodeSet1};
use x86_64::instructions::port::Port;
use crate::constants::keyboard::{
    CMD_RESET_CPU, DATA_PORT, STATUS_COMMAND_PORT, STATUS_OUTPUT_BUFFER_FULL,
};

/// Turns set-1 scancodes into the bytes the console line discipline eats.
/// Ctrl-letter chords arrive as control bytes (Ctrl-U is 0x15).
pub struct KeyDecoder {
    keyboard: Keyboard<layouts::Us104Key, ScancodeSet1>,
}

impl KeyDecoder {
    pub const fn new() -> KeyDecoder {
        KeyDecoder {
            keyboard: Keyboard::new(
                ScancodeSet1::new(),
                layouts::Us104Key,
                HandleControl::MapLettersToUnicode,
            ),
        }
    }

    /// Feeds one scancode. Returns a byte once a key press decodes to ASCII;
    /// releases, modifiers and keys without an ASCII meaning yield `None`.
    pub fn decode(&mut self, scancode: u8) -> Option<u8> {
        let event = self.keyboard.add_byte(scancode).ok().flatten()?;
        match self.keyboard.process_keyevent(event)? {
            DecodedKey::Unicode(c) if c.is_ascii() => Some(c as u8),
            _ => None,
        }
    }
}

static KEYBOARD_DECODER: Mutex<KeyDecoder> = Mutex::new(KeyDecoder::new());

/// Next decoded byte waiting in the PS/2 controller, if any. Scancodes that
/// do not decode to a byte are consumed and skipped.
pub fn kbd_getc() -> Option<u8> {
    let mut status_port: Port<u8> = Port::new(STATUS_COMMAND_PORT);
    let mut data_port: Port<u8> = Port::new(DATA_PORT);
    let mut decoder = KEYBOARD_DECODER.lock();

    loop {
        let status = unsafe { status_port.read() };
        if status & STATUS_OUTPUT_BUFFER_FULL == 0 {
            return None;
        }
        let scancode = unsafe { data_port.read() };
        if let Some(byte) = decoder.decode(scancode) {
            return Some(byte);
        }
    }
}

/// Send reset command to keyboard controller (for reboot)
pub fn reset_cpu() -> ! {
    unsafe {
        let mut port = Port::<u8>::new(STATUS_COMMAND_PORT);
        port.write(CMD_RESET_CPU);
    }

    loop {
        x86_64::instructions::hlt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::console::{CTRL_C, CTRL_U};

    fn decode_all(scancodes: &[u8]) -> Vec<u8> {
        let mut decoder = KeyDecoder::new();
        scancodes.iter().filter_map(|&sc| decoder.decode(sc)).collect()
    }

    #[test]
    fn letters_and_enter() {
        // a press, a release, Enter press, Enter release
        assert_eq!(decode_all(&[0x1E, 0x9E, 0x1C, 0x9C]), b"a\n");
    }

    #[test]
    fn control_chords_become_control_bytes() {
        // LCtrl down, U down/up, C down/up, LCtrl up
        assert_eq!(decode_all(&[0x1D, 0x16, 0x96, 0x2E, 0xAE, 0x9D]), [CTRL_U, CTRL_C]);
    }

    #[test]
    fn backspace_key() {
        assert_eq!(decode_all(&[0x0E, 0x8E]), [0x08]);
    }

    #[test]
    fn shift_only_yields_nothing() {
        assert_eq!(decode_all(&[0x2A, 0xAA]), b"");
    }
}

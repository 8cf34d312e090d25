/// System-wide constants to avoid magic numbers

/// VGA text mode constants
pub mod vga {
    /// VGA text buffer physical address
    pub const BUFFER_ADDR: usize = 0xb8000;

    /// VGA text mode dimensions
    pub const BUFFER_HEIGHT: usize = 25;
    pub const BUFFER_WIDTH: usize = 80;
    pub const BUFFER_CELLS: usize = BUFFER_WIDTH * BUFFER_HEIGHT;

    /// Rows available to text; reaching this row scrolls the surface up
    pub const TEXT_ROWS: usize = 24;

    /// CRT controller ports
    pub const COMMAND_PORT: u16 = 0x3D4;
    pub const DATA_PORT: u16 = 0x3D5;

    /// Cursor location registers
    pub const CURSOR_LOCATION_HIGH: u8 = 0x0E;
    pub const CURSOR_LOCATION_LOW: u8 = 0x0F;
}

/// PS/2 Keyboard controller constants
pub mod keyboard {
    /// PS/2 keyboard data port
    pub const DATA_PORT: u16 = 0x60;

    /// PS/2 keyboard status/command port
    pub const STATUS_COMMAND_PORT: u16 = 0x64;

    /// Status register bit flags
    pub const STATUS_OUTPUT_BUFFER_FULL: u8 = 0x01;

    /// Command to reset CPU via keyboard controller
    pub const CMD_RESET_CPU: u8 = 0xFE;
}

/// 16550 UART on COM1
pub mod serial {
    pub const COM1: u16 = 0x3F8;

    /// Line status register and its "data ready" bit
    pub const LINE_STATUS: u16 = COM1 + 5;
    pub const LINE_STATUS_DATA_READY: u8 = 0x01;
}

/// Interrupt constants
pub mod interrupts {
    /// PIC (Programmable Interrupt Controller) offset
    /// We remap PIC interrupts to start at 32 to avoid conflicts with CPU exceptions
    pub const PIC_1_OFFSET: u8 = 32;
    pub const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;
}

/// Console line discipline and device numbers
pub mod console {
    /// Capacity of the input line buffer
    pub const INPUT_BUF: usize = 128;

    /// Control-x
    const fn ctrl(key: u8) -> u8 {
        key - b'@'
    }

    pub const CTRL_C: u8 = ctrl(b'C');
    pub const CTRL_D: u8 = ctrl(b'D');
    pub const CTRL_H: u8 = ctrl(b'H');
    pub const CTRL_P: u8 = ctrl(b'P');
    pub const CTRL_U: u8 = ctrl(b'U');
    pub const DEL: u8 = 0x7f;

    /// Keys with special meaning to the line discipline
    pub const PROCESS_DUMP: u8 = CTRL_P;
    pub const KILL_LINE: u8 = CTRL_U;
    pub const END_OF_INPUT: u8 = CTRL_D;
    pub const OVERLAY_TOGGLE: u8 = CTRL_C;

    /// Keys understood by the color picker while it is open
    pub const OVERLAY_PREVIOUS: u8 = b'w';
    pub const OVERLAY_NEXT: u8 = b's';

    /// Return addresses printed by the fatal path
    pub const BACKTRACE_DEPTH: usize = 10;

    /// Device-switch table size and the console's major number
    pub const NDEV: usize = 10;
    pub const CONSOLE_MAJOR: usize = 1;
}

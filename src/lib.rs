//! HueOS console subsystem: keyboard and serial input through a line
//! discipline into blocking readers, a VGA text surface with a serial
//! mirror, and a color-picker overlay drawn over the text.

#![cfg_attr(not(test), no_std)]

#[macro_use]
pub mod klog;

pub mod constants;
pub mod error;
pub mod vga_buffer;
pub mod serial;
pub mod glyph;
pub mod line_buffer;
pub mod overlay;
pub mod kprintf;
pub mod task;
pub mod device;
pub mod console;
pub mod keyboard;
pub mod panic;

#[cfg(test)]
mod test_support;

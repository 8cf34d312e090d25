#![no_std]
#![no_main]
#![feature(abi_x86_interrupt)]

mod gdt;
mod interrupts;
mod shell;

use core::arch::asm;
use core::panic::PanicInfo;
use hueos::console::{self, CONSOLE};
use hueos::constants::console::BACKTRACE_DEPTH;
use hueos::{kerror, kinfo, println};

/// Fatal path: stop taking interrupts, report through the console with a
/// short call-stack dump, freeze every other producer, spin forever.
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    x86_64::instructions::interrupts::disable();

    let frame: usize;
    unsafe { asm!("mov {}, rbp", out(reg) frame, options(nomem, nostack)) };
    let mut pcs = [0usize; BACKTRACE_DEPTH];
    hueos::panic::caller_pcs(frame, &mut pcs, |addr| unsafe {
        core::ptr::read_volatile(addr as *const usize)
    });

    CONSOLE.fatal(hueos::panic::cpu_id(), info, &pcs);
    loop {
        x86_64::instructions::hlt();
    }
}

#[no_mangle]
pub extern "C" fn _start() -> ! {
    kinfo!("boot: starting HueOS");

    // Initialize GDT with TSS for double fault protection
    gdt::init();

    if let Err(err) = console::init() {
        kerror!("boot: console init failed: {}", err);
    }

    // IDT, PICs, keyboard and COM1 lines, then sti
    interrupts::init();

    println!("Welcome to HueOS");
    println!("Ctrl-C opens the color picker: w/s to move, Enter to pick.");

    shell::run()
}

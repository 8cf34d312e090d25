use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame, PageFaultErrorCode};
use x86_64::instructions::port::Port;
use lazy_static::lazy_static;
use pic8259::ChainedPics;
use spin::Mutex;
use hueos::console::CONSOLE;
use hueos::constants::interrupts::{PIC_1_OFFSET, PIC_2_OFFSET};
use hueos::{keyboard, serial};

/// Hardware interrupt numbers (after remapping)
#[derive(Debug, Clone, Copy)]
#[repr(u8)]
pub enum InterruptIndex {
    Timer = PIC_1_OFFSET,
    Keyboard,
    Cascade,
    Com1 = PIC_1_OFFSET + 4,
}

impl InterruptIndex {
    fn as_u8(self) -> u8 {
        self as u8
    }

    /// Bit of this line in the master PIC's mask register
    fn irq_bit(self) -> u8 {
        1 << (self.as_u8() - PIC_1_OFFSET)
    }
}

const PIC_1_DATA: u16 = 0x21;

/// Programmable Interrupt Controller (PIC) setup
pub static PICS: Mutex<ChainedPics> =
    Mutex::new(unsafe { ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET) });

lazy_static! {
    static ref IDT: InterruptDescriptorTable = {
        let mut idt = InterruptDescriptorTable::new();

        // CPU exceptions
        idt.breakpoint.set_handler_fn(breakpoint_handler);
        unsafe {
            idt.double_fault
                .set_handler_fn(double_fault_handler)
                .set_stack_index(crate::gdt::DOUBLE_FAULT_IST_INDEX);
        }
        idt.page_fault.set_handler_fn(page_fault_handler);
        idt.general_protection_fault.set_handler_fn(general_protection_fault_handler);

        // Hardware interrupts; every line gets a handler so a stray IRQ cannot triple fault
        for vector in PIC_1_OFFSET..PIC_2_OFFSET + 8 {
            idt[vector].set_handler_fn(spurious_interrupt_handler);
        }
        idt[InterruptIndex::Timer.as_u8()].set_handler_fn(timer_interrupt_handler);
        idt[InterruptIndex::Keyboard.as_u8()].set_handler_fn(keyboard_interrupt_handler);
        idt[InterruptIndex::Com1.as_u8()].set_handler_fn(serial_interrupt_handler);

        idt
    };
}

/// Load the IDT, remap the PICs, unmask timer, keyboard and COM1, enable interrupts
pub fn init() {
    IDT.load();

    unsafe {
        PICS.lock().initialize();

        let mut pic1_data: Port<u8> = Port::new(PIC_1_DATA);
        let enabled = InterruptIndex::Timer.irq_bit()
            | InterruptIndex::Keyboard.irq_bit()
            | InterruptIndex::Cascade.irq_bit()
            | InterruptIndex::Com1.irq_bit();
        let mask = pic1_data.read() & !enabled;
        pic1_data.write(mask);
        hueos::kdebug!("pic: master mask {:#04x}", mask);
    }

    x86_64::instructions::interrupts::enable();
    hueos::kinfo!("interrupts: enabled");
}

// Exception handlers
extern "x86-interrupt" fn breakpoint_handler(stack_frame: InterruptStackFrame) {
    hueos::kwarn!("EXCEPTION: BREAKPOINT\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn double_fault_handler(
    stack_frame: InterruptStackFrame,
    _error_code: u64,
) -> ! {
    panic!("EXCEPTION: DOUBLE FAULT\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn page_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: PageFaultErrorCode,
) {
    use x86_64::registers::control::Cr2;

    panic!(
        "EXCEPTION: PAGE FAULT at {:?} ({:?})\n{:#?}",
        Cr2::read(),
        error_code,
        stack_frame
    );
}

extern "x86-interrupt" fn general_protection_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: u64,
) {
    panic!("EXCEPTION: GENERAL PROTECTION FAULT ({})\n{:#?}", error_code, stack_frame);
}

// Hardware interrupt handlers
extern "x86-interrupt" fn timer_interrupt_handler(_stack_frame: InterruptStackFrame) {
    // wakes a reader halted in sleep so it re-checks for input
    unsafe {
        PICS.lock()
            .notify_end_of_interrupt(InterruptIndex::Timer.as_u8());
    }
}

extern "x86-interrupt" fn keyboard_interrupt_handler(_stack_frame: InterruptStackFrame) {
    CONSOLE.interrupt(keyboard::kbd_getc);

    unsafe {
        PICS.lock()
            .notify_end_of_interrupt(InterruptIndex::Keyboard.as_u8());
    }
}

extern "x86-interrupt" fn serial_interrupt_handler(_stack_frame: InterruptStackFrame) {
    CONSOLE.interrupt(serial::serial_getc);

    unsafe {
        PICS.lock()
            .notify_end_of_interrupt(InterruptIndex::Com1.as_u8());
    }
}

extern "x86-interrupt" fn spurious_interrupt_handler(_stack_frame: InterruptStackFrame) {
    // We don't know which line this was, so acknowledge both PICs
    unsafe {
        PICS.lock().notify_end_of_interrupt(PIC_2_OFFSET);
    }
}

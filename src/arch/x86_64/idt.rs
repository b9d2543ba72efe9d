/*
 * Interrupt Descriptor Table (IDT)
 *
 * Two classes of entry are installed here:
 *
 * - CPU exception handlers (0-31). None of them are recoverable in this
 *   kernel (there is no paging, no lazy allocation, no user mode to fault
 *   from) so they all log and halt.
 * - The tick source (IRQ0, remapped to vector 32 by `interrupts::init`),
 *   which drives `kernel::tick::on_tick` and is the only interrupt this
 *   kernel ever unmasks.
 */

use lazy_static::lazy_static;
use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame};

lazy_static! {
    static ref IDT: InterruptDescriptorTable = {
        let mut idt = InterruptDescriptorTable::new();

        idt.divide_error.set_handler_fn(divide_error_handler);
        idt.debug.set_handler_fn(debug_handler);
        idt.non_maskable_interrupt.set_handler_fn(nmi_handler);
        idt.breakpoint.set_handler_fn(breakpoint_handler);
        idt.overflow.set_handler_fn(overflow_handler);
        idt.bound_range_exceeded.set_handler_fn(bound_range_exceeded_handler);
        idt.invalid_opcode.set_handler_fn(invalid_opcode_handler);
        idt.device_not_available.set_handler_fn(device_not_available_handler);
        unsafe {
            idt.double_fault
                .set_handler_fn(double_fault_handler)
                .set_stack_index(crate::arch::x86_64::gdt::DOUBLE_FAULT_IST_INDEX);
        }
        idt.invalid_tss.set_handler_fn(invalid_tss_handler);
        idt.segment_not_present.set_handler_fn(segment_not_present_handler);
        idt.stack_segment_fault.set_handler_fn(stack_segment_fault_handler);
        idt.general_protection_fault.set_handler_fn(general_protection_fault_handler);
        idt.page_fault.set_handler_fn(page_fault_handler);
        idt.x87_floating_point.set_handler_fn(x87_floating_point_handler);
        idt.alignment_check.set_handler_fn(alignment_check_handler);
        idt.machine_check.set_handler_fn(machine_check_handler);
        idt.simd_floating_point.set_handler_fn(simd_floating_point_handler);
        idt.virtualization.set_handler_fn(virtualization_handler);
        idt.security_exception.set_handler_fn(security_exception_handler);

        idt[crate::arch::x86_64::interrupts::TICK_VECTOR as usize]
            .set_handler_fn(tick_interrupt_handler);

        idt
    };
}

/// Load the IDT. Must run after `gdt::init` (the double fault entry
/// references the GDT's IST slot).
pub fn init() {
    IDT.load();
    log::info!("IDT loaded");
}

macro_rules! halting_handler {
    ($name:ident, $label:expr) => {
        extern "x86-interrupt" fn $name(_stack_frame: InterruptStackFrame) {
            crate::utils::debug::irq_log::irq_log_simple($label);
            loop {
                x86_64::instructions::hlt();
            }
        }
    };
}

macro_rules! halting_handler_errcode {
    ($name:ident, $label:expr) => {
        extern "x86-interrupt" fn $name(_stack_frame: InterruptStackFrame, _error_code: u64) {
            crate::utils::debug::irq_log::irq_log_simple($label);
            loop {
                x86_64::instructions::hlt();
            }
        }
    };
}

halting_handler!(divide_error_handler, "DIVIDE_ERROR");
halting_handler!(nmi_handler, "NMI");
halting_handler!(overflow_handler, "OVERFLOW");
halting_handler!(bound_range_exceeded_handler, "BOUND_RANGE_EXCEEDED");
halting_handler!(invalid_opcode_handler, "INVALID_OPCODE");
halting_handler!(device_not_available_handler, "DEVICE_NOT_AVAILABLE");
halting_handler_errcode!(invalid_tss_handler, "INVALID_TSS");
halting_handler_errcode!(segment_not_present_handler, "SEGMENT_NOT_PRESENT");
halting_handler_errcode!(stack_segment_fault_handler, "STACK_SEGMENT_FAULT");
halting_handler_errcode!(general_protection_fault_handler, "GENERAL_PROTECTION_FAULT");

extern "x86-interrupt" fn debug_handler(_stack_frame: InterruptStackFrame) {
    crate::utils::debug::irq_log::irq_log_simple("DEBUG_EXCEPTION");
}

extern "x86-interrupt" fn breakpoint_handler(_stack_frame: InterruptStackFrame) {
    crate::utils::debug::irq_log::irq_log_simple("BREAKPOINT");
}

extern "x86-interrupt" fn double_fault_handler(
    _stack_frame: InterruptStackFrame,
    _error_code: u64,
) -> ! {
    crate::utils::debug::irq_log::irq_log_simple("DOUBLE_FAULT");
    loop {
        x86_64::instructions::hlt();
    }
}

extern "x86-interrupt" fn page_fault_handler(
    _stack_frame: InterruptStackFrame,
    _error_code: x86_64::structures::idt::PageFaultErrorCode,
) {
    // There is no paging and no dynamic memory in this kernel: a page
    // fault can only mean a stack overflow or a stray pointer. Neither is
    // recoverable.
    crate::utils::debug::irq_log::irq_log_simple("PAGE_FAULT");
    loop {
        x86_64::instructions::hlt();
    }
}

extern "x86-interrupt" fn x87_floating_point_handler(_stack_frame: InterruptStackFrame) {
    crate::utils::debug::irq_log::irq_log_simple("X87_FP_EXCEPTION");
    loop {
        x86_64::instructions::hlt();
    }
}

extern "x86-interrupt" fn alignment_check_handler(
    _stack_frame: InterruptStackFrame,
    _error_code: u64,
) {
    crate::utils::debug::irq_log::irq_log_simple("ALIGNMENT_CHECK");
    loop {
        x86_64::instructions::hlt();
    }
}

extern "x86-interrupt" fn machine_check_handler(_stack_frame: InterruptStackFrame) -> ! {
    crate::utils::debug::irq_log::irq_log_simple("MACHINE_CHECK");
    loop {
        x86_64::instructions::hlt();
    }
}

extern "x86-interrupt" fn simd_floating_point_handler(_stack_frame: InterruptStackFrame) {
    crate::utils::debug::irq_log::irq_log_simple("SIMD_FP_EXCEPTION");
    loop {
        x86_64::instructions::hlt();
    }
}

extern "x86-interrupt" fn virtualization_handler(_stack_frame: InterruptStackFrame) {
    crate::utils::debug::irq_log::irq_log_simple("VIRTUALIZATION_EXCEPTION");
    loop {
        x86_64::instructions::hlt();
    }
}

extern "x86-interrupt" fn security_exception_handler(
    _stack_frame: InterruptStackFrame,
    _error_code: u64,
) {
    crate::utils::debug::irq_log::irq_log_simple("SECURITY_EXCEPTION");
    loop {
        x86_64::instructions::hlt();
    }
}

/// The periodic tick. Expires sleeping descriptors and sends EOI; never
/// touches `current` and never context-switches (the dispatcher is only
/// ever entered from the trap loop, never from interrupt context).
extern "x86-interrupt" fn tick_interrupt_handler(_stack_frame: InterruptStackFrame) {
    crate::kernel::tick::on_tick();

    unsafe {
        crate::arch::x86_64::interrupts::notify_end_of_tick();
    }
}

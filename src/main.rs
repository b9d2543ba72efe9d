/*
 * cluu-rt Kernel Entry Point
 *
 * Bare-metal entry point for a cooperative, full-served kernel core,
 * booted under the BOOTBOOT loader protocol on x86_64. Handles the early
 * multi-core boot handshake (BSP vs AP), brings up the minimal hardware
 * the kernel core needs (debug UART, GDT/IDT, tick source), creates the
 * demo task set, and hands off to the kernel's own trap loop.
 */

#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]
#![feature(abi_x86_interrupt)]
#![allow(dead_code)]

#[cfg(not(test))]
use core::panic::PanicInfo;

mod arch;
mod bootboot;
mod config;
mod demos;
mod kernel;
mod utils;

#[cfg(not(test))]
#[repr(C, align(16))]
pub struct AlignedBspStack([u8; 64 * 1024]);

#[cfg(not(test))]
#[unsafe(no_mangle)]
pub static mut BSP_STACK: AlignedBspStack = AlignedBspStack([0; 64 * 1024]);

/// Called directly by the BOOTBOOT loader, on every core. Identifies the
/// bootstrap processor, switches onto this kernel's own stack, and jumps
/// into `kstart`. Application processors are parked; this kernel core is
/// single-core (an explicit non-goal is multi-core support).
///
/// Gated out under `cfg(test)`: a `#[no_mangle] _start` collides with the
/// host test harness's own C runtime entry point.
#[cfg(not(test))]
#[unsafe(naked)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn _start() -> ! {
    core::arch::naked_asm!(
        "mov eax, 1",
        "cpuid",
        "shr ebx, 24",

        "lea rax, [rip + bootboot]",
        "movzx ecx, word ptr [rax + 0x0C]",

        "cmp ebx, ecx",
        "jne 2f",

        "lea rax, [rip + BSP_STACK]",
        "add rax, {stack_size}",
        "mov rsp, rax",

        "jmp kstart",

        "2:",
        "1:",
        "hlt",
        "jmp 1b",

        stack_size = const 64 * 1024,
    );
}

/// Running on the BSP stack now. Brings up everything the kernel core
/// needs, creates the demo tasks, and hands off to `kernel::boot::start`,
/// which never returns.
#[cfg(not(test))]
#[unsafe(no_mangle)]
pub extern "C" fn kstart() -> ! {
    arch::x86_64::init();
    utils::debug::logger::init();
    log::info!("cluu-rt kernel starting");

    kernel::boot::init();
    demos::spawn_all();

    log::info!(
        "{} task(s) created, starting trap loop",
        kernel::stats::task_count()
    );
    kernel::boot::start();
}

#[cfg(not(test))]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    x86_64::instructions::interrupts::disable();
    utils::debug::irq_log::irq_log_str("PANIC: ");
    if let Some(location) = info.location() {
        utils::debug::irq_log::irq_log_str(location.file());
    }
    utils::debug::irq_log::irq_log_newline();
    loop {
        x86_64::instructions::hlt();
    }
}

pub mod context;
pub mod gdt;
pub mod idt;
pub mod interrupts;
pub mod serial;

/// Bring up everything the kernel core needs from the hardware, in the
/// order it needs to happen: debug console first (so the rest of boot can
/// log), then GDT, then IDT (depends on the GDT's IST slot), then the PIC
/// remap. The PIT itself is armed later, by `kernel::boot::start` (see
/// `interrupts::arm_tick`). Interrupts remain disabled on return; the
/// kernel enables them once it is ready to run its first task.
pub fn init() {
    serial::init_debug_port();
    gdt::init();
    idt::init();
    interrupts::init();
}

/// Disable maskable interrupts. The kernel's only synchronization
/// primitive: every access to shared kernel state happens with
/// interrupts off.
#[inline(always)]
pub fn disable_interrupts() {
    x86_64::instructions::interrupts::disable();
}

#[inline(always)]
pub fn enable_interrupts() {
    x86_64::instructions::interrupts::enable();
}

#[inline(always)]
pub fn interrupts_enabled() -> bool {
    x86_64::instructions::interrupts::are_enabled()
}

#[inline(always)]
pub fn halt() {
    x86_64::instructions::hlt();
}

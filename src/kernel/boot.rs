/*
 * Boot & Initialization
 *
 * `init` and `start` are the only two kernel entry points meant to be
 * called from outside `kernel::*` before the trap loop takes over. Between
 * them, a board's `main` creates its initial tasks.
 */

use crate::arch::x86_64;
use crate::kernel::process::{ProcessDescriptor, ProcessState};
use crate::kernel::{error::KernelError, trap, with_state, with_state_mut};

/// Zero the process table, mark every slot DEAD, clear every counter, and
/// leave the kernel inactive. Descriptors are reset one at a time rather
/// than by replacing the whole table at once, to avoid momentarily
/// materializing the entire (multi-slot) table as a stack temporary.
pub fn init() {
    with_state_mut(|state| {
        for slot in state.table.slots.iter_mut() {
            *slot = ProcessDescriptor::reset();
            debug_assert_eq!(slot.state, ProcessState::Dead);
        }
        state.current = 0;
        state.next_cursor = 0;
        state.task_count = 0;
        state.last_pid = 0;
        state.err = KernelError::NoErr;
    });
    crate::kernel::set_kernel_active(false);
    crate::kernel::set_last_created_pid(0);
    log::info!("kernel state initialized, {} task slots", crate::config::MAX_THREAD);
}

/// Arm the tick source, mark the kernel active, and enter the trap loop.
/// Never returns. No-op (but logged) if already active or if no task has
/// been created yet.
///
/// `kernel_active` is checked as a bare atomic, not under `STATE`'s lock -
/// every syscall wrapper needs that same check before it has decided
/// whether to disable interrupts at all, so the check itself must never
/// take the lock.
pub fn start() -> ! {
    if crate::kernel::kernel_active() {
        log::warn!("OS_Start called while already active; halting");
        loop {
            x86_64::halt();
        }
    }

    let has_tasks = with_state(|state| state.task_count > 0);
    if !has_tasks {
        log::warn!("OS_Start called with no tasks; halting");
        loop {
            x86_64::halt();
        }
    }

    x86_64::disable_interrupts();
    crate::arch::x86_64::interrupts::arm_tick();
    crate::kernel::set_kernel_active(true);

    log::info!("kernel active, entering trap loop");
    trap::run();
}

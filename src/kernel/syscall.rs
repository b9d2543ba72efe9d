/*
 * Syscall Facade
 *
 * The only code a task runs that is allowed to reach into kernel state
 * directly (to populate its own request) before handing off control.
 * Every operation here disables interrupts, writes into the RUNNING
 * descriptor, and traps via `enter_kernel`; `service` in `trap.rs` does
 * the rest once the kernel resumes.
 */

use crate::arch::x86_64::{self, context};
use crate::kernel::error::KernelError;
use crate::kernel::process::{EntryFn, Request};
use crate::kernel::{with_state, with_state_irqsafe, with_state_mut};

/// Sentinel PID returned by `task_create` and read by `task_get_pid` on
/// failure/lookup-miss respectively.
pub const NO_PID: u32 = 0;
pub const PID_LOOKUP_MISS: i32 = -1;

fn kernel_active() -> bool {
    crate::kernel::kernel_active()
}

/// Create a task running `code` at the given priority (0 highest, 10
/// lowest) with entry argument `arg`. Returns the new PID, or 0 with
/// `KernelError::MaxProcessErr` recorded if the table is full.
///
/// Before `OS_Start`, this builds the task directly (there is no running
/// task whose descriptor could carry the request). After, it must trap
/// so the parameters are conveyed via `current`.
pub fn task_create(code: EntryFn, priority: u8, arg: i32) -> u32 {
    if !kernel_active() {
        return with_state_mut(|state| {
            match crate::kernel::process::allocate(
                &mut state.table,
                &mut state.last_pid,
                terminate_trap,
                code,
                priority,
                arg,
            ) {
                Ok(pid) => {
                    state.task_count += 1;
                    state.err = KernelError::NoErr;
                    pid
                }
                Err(e) => {
                    state.err = e;
                    NO_PID
                }
            }
        });
    }

    x86_64::disable_interrupts();
    with_state_mut(|state| {
        let idx = state.current;
        state.table.slots[idx].request = Request::Create;
        state.table.slots[idx].code = Some(code);
        state.table.slots[idx].priority = priority;
        state.table.slots[idx].arg = arg;
    });
    unsafe {
        context::enter_kernel();
    }
    // `exit_kernel`'s `sti` has already re-enabled interrupts by the time
    // control returns here, so this must read the lock-free side channel
    // rather than take `STATE` - the tick ISR could otherwise land between
    // this read and its own `with_state_mut` call and spin forever.
    crate::kernel::last_created_pid()
}

/// Give up the remainder of this task's turn.
pub fn task_yield() {
    if !kernel_active() {
        with_state_mut(|state| state.err = KernelError::KernelInactiveErr);
        return;
    }
    x86_64::disable_interrupts();
    with_state_mut(|state| {
        let idx = state.current;
        state.table.slots[idx].request = Request::Yield;
    });
    unsafe {
        context::enter_kernel();
    }
}

/// End this task. Never returns: its slot goes DEAD and the dispatcher
/// will never select it again.
pub fn task_terminate() -> ! {
    if !kernel_active() {
        with_state_mut(|state| state.err = KernelError::KernelInactiveErr);
        // Nothing sensible to return to; a task that calls this before
        // `OS_Start` exists only in the initial creation pass.
        loop {
            x86_64::halt();
        }
    }
    x86_64::disable_interrupts();
    with_state_mut(|state| {
        let idx = state.current;
        state.table.slots[idx].request = Request::Terminate;
    });
    unsafe {
        context::enter_kernel();
    }
    unreachable!("a DEAD task's stack is never resumed")
}

/// Entry installed as the bottom-of-stack return address for every new
/// task: reached only if the task's own entry function returns instead of
/// calling `task_terminate` itself.
pub extern "C" fn terminate_trap() -> ! {
    task_terminate()
}

/// Sleep for at least `ticks` ticks (each ~`config::TICK_PERIOD_MS`).
pub fn task_sleep(ticks: i32) {
    if !kernel_active() {
        with_state_mut(|state| state.err = KernelError::KernelInactiveErr);
        return;
    }
    x86_64::disable_interrupts();
    with_state_mut(|state| {
        let idx = state.current;
        state.table.slots[idx].request = Request::Sleep;
        state.table.slots[idx].request_arg = ticks;
    });
    unsafe {
        context::enter_kernel();
    }
}

/// Suspend `target_pid`. Requires it currently be READY; the running
/// task is not moved off CPU.
pub fn task_suspend(target_pid: u32) {
    if !kernel_active() {
        with_state_mut(|state| state.err = KernelError::KernelInactiveErr);
        return;
    }
    x86_64::disable_interrupts();
    with_state_mut(|state| {
        let idx = state.current;
        state.table.slots[idx].request = Request::Suspend;
        state.table.slots[idx].request_arg = target_pid as i32;
    });
    unsafe {
        context::enter_kernel();
    }
}

/// Resume `target_pid`. Requires it currently be SUSPENDED.
pub fn task_resume(target_pid: u32) {
    if !kernel_active() {
        with_state_mut(|state| state.err = KernelError::KernelInactiveErr);
        return;
    }
    x86_64::disable_interrupts();
    with_state_mut(|state| {
        let idx = state.current;
        state.table.slots[idx].request = Request::Resume;
        state.table.slots[idx].request_arg = target_pid as i32;
    });
    unsafe {
        context::enter_kernel();
    }
}

/// Stubbed per the core spec: always 0, never the stored `arg`.
pub fn task_get_arg() -> i32 {
    0
}

/// Look up the PID of the (first, in table order) non-DEAD task whose
/// entry function is `code`, or -1 if none matches. A pure read: it does
/// not need to go through the trap, only to run with interrupts disabled
/// while it scans the shared table.
pub fn task_get_pid(code: EntryFn) -> i32 {
    x86_64::disable_interrupts();
    let found = with_state(|state| state.table.find_pid_by_entry(code));
    x86_64::enable_interrupts();
    found.map(|pid| pid as i32).unwrap_or(PID_LOOKUP_MISS)
}

/// Current error cell, for callers that want the specific failure kind
/// after a sentinel-returning call. Callers may read this from task
/// context after a trap has returned (interrupts back on), so this goes
/// through the same save/restore path as the other post-trap reads rather
/// than assuming interrupts are already off.
pub fn last_error() -> KernelError {
    with_state_irqsafe(|state| state.err)
}

/*
 * Context Switch Primitive
 *
 * This is the x86_64 realization of the architecture boundary the kernel
 * core is written against: a stack-buffer synthesizer plus the two
 * trampolines that move the CPU between "running as a task" and "running
 * as the kernel".
 *
 * `enter_kernel` and `exit_kernel` are symmetric. Both save the six
 * System V callee-saved registers (rbx, rbp, r12-r15; the caller already
 * owns everything else across an ordinary `call`), stash the resulting
 * stack pointer in one scratch cell, load the stack pointer out of the
 * other scratch cell, restore the six registers from the new stack, and
 * `ret`. Which scratch cell is read and which is written is the only
 * difference between them:
 *
 *   enter_kernel: save to CURRENT_SP, load from KERNEL_SP
 *   exit_kernel:  save to KERNEL_SP,  load from CURRENT_SP
 *
 * Neither function "returns" to its caller in the ordinary sense - it
 * resumes whichever side last called the other one. `exit_kernel` resumes
 * a brand new task for the first time by `ret`-ing into a stack frame
 * synthesized by `new_task_stack` instead of one left behind by a previous
 * `enter_kernel`.
 *
 * Save-frame layout (addresses ascending from the initial/current SP,
 * i.e. in the order each word is consumed as the stack unwinds):
 *
 *   [sp + 0  .. sp + 48)  six saved GPRs, r15 first (48 bytes)
 *   [sp + 48 .. sp + 56)  entry-fn address        - consumed by the
 *                         trampoline's own `ret`, transferring control
 *                         into the task for the first time
 *   [sp + 56 .. sp + 64)  terminate-trap address   - consumed only if the
 *                         entry function itself returns instead of
 *                         calling Task_Terminate
 *
 * This is the x86_64-sized analogue of the fixed register-save frame the
 * architecture boundary specifies; an 8-bit target would use a narrower
 * frame (fewer, smaller registers) in exactly the same two slots below it.
 */

use core::arch::naked_asm;

/// Stack pointer of the task currently being switched away from or into.
/// Set by kernel code before calling `exit_kernel`; read by `enter_kernel`
/// the next time that task traps back in.
static mut CURRENT_SP: usize = 0;

/// Stack pointer the kernel itself was running on when it last called
/// `exit_kernel`. Restored by the next `enter_kernel`.
static mut KERNEL_SP: usize = 0;

/// Number of bytes `new_task_stack` reserves below the initial SP for the
/// saved-register blob.
pub const SAVE_FRAME_BYTES: usize = 48;

/// Record the stack pointer a task is about to resume on. Must be called
/// with interrupts disabled, immediately before `exit_kernel`.
pub fn set_current_sp(sp: usize) {
    unsafe {
        CURRENT_SP = sp;
    }
}

/// Read back the stack pointer a task most recently trapped in on (i.e.
/// what `enter_kernel` last recorded). Used by the trap loop to persist
/// it into the process descriptor.
pub fn current_sp() -> usize {
    unsafe { CURRENT_SP }
}

/// Synthesize the initial stack for a task that has never run. Returns
/// the stack pointer to store in the new descriptor's `sp` field; the
/// first `exit_kernel` aimed at it will land in `entry`.
///
/// `workspace` must be at least `SAVE_FRAME_BYTES + 16` bytes; callers are
/// expected to size task stacks far larger than that in practice.
pub fn new_task_stack(
    workspace: &mut [u8],
    entry: extern "C" fn() -> !,
    terminate_trap: extern "C" fn() -> !,
) -> usize {
    let top = (workspace.as_mut_ptr() as usize + workspace.len()) & !0xF;
    let frame_base = top - SAVE_FRAME_BYTES - 16;

    unsafe {
        let words = frame_base as *mut u64;
        for i in 0..6 {
            // Debug pattern, distinguishable from a live stack in a dump.
            *words.add(i) = 0xDEAD_0000_0000_0000 | i as u64;
        }
        *(words.add(6)) = entry as usize as u64;
        *(words.add(7)) = terminate_trap as usize as u64;
    }

    frame_base
}

/// Trap from the currently running task into the kernel.
///
/// # Safety
///
/// May only be called from task context, with `CURRENT_SP`'s counterpart
/// handshake (`KERNEL_SP`) already populated by a prior `exit_kernel`.
#[unsafe(naked)]
pub unsafe extern "C" fn enter_kernel() {
    naked_asm!(
        "push rbx",
        "push rbp",
        "push r12",
        "push r13",
        "push r14",
        "push r15",
        "lea rax, [rip + {current_sp}]",
        "mov [rax], rsp",
        "lea rax, [rip + {kernel_sp}]",
        "mov rsp, [rax]",
        "pop r15",
        "pop r14",
        "pop r13",
        "pop r12",
        "pop rbp",
        "pop rbx",
        "ret",
        current_sp = sym CURRENT_SP,
        kernel_sp = sym KERNEL_SP,
    );
}

/// Dispatch into whichever task's stack pointer was last passed to
/// `set_current_sp`.
///
/// This is also the only place interrupts get re-enabled on the way into
/// a task: the `sti` immediately before `ret` is what makes "the entire
/// time a task runs" an interrupt-enabled window, regardless of which
/// task it is or whether its stack was just synthesized or is being
/// resumed. `sti`'s one-instruction delay means the tick can't land until
/// after the `ret` below has handed off to the task.
///
/// # Safety
///
/// The caller (the kernel trap loop) must have called `set_current_sp`
/// with a valid stack - either one a task last trapped in on, or one
/// freshly built by `new_task_stack` - before calling this.
#[unsafe(naked)]
pub unsafe extern "C" fn exit_kernel() {
    naked_asm!(
        "push rbx",
        "push rbp",
        "push r12",
        "push r13",
        "push r14",
        "push r15",
        "lea rax, [rip + {kernel_sp}]",
        "mov [rax], rsp",
        "lea rax, [rip + {current_sp}]",
        "mov rsp, [rax]",
        "pop r15",
        "pop r14",
        "pop r13",
        "pop r12",
        "pop rbp",
        "pop rbx",
        "sti",
        "ret",
        kernel_sp = sym KERNEL_SP,
        current_sp = sym CURRENT_SP,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_stack_places_entry_and_terminate_addresses() {
        let mut workspace = [0u8; 256];
        extern "C" fn entry() -> ! {
            loop {}
        }
        extern "C" fn terminate() -> ! {
            loop {}
        }

        let sp = new_task_stack(&mut workspace, entry, terminate);
        let words = sp as *const u64;
        unsafe {
            assert_eq!(*words.add(6), entry as usize as u64);
            assert_eq!(*words.add(7), terminate as usize as u64);
        }
        assert_eq!(sp % 16, 0);
    }
}

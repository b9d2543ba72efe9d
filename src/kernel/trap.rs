/*
 * Kernel Trap Loop
 *
 * The privileged main loop. Once `boot::start` calls in, this never
 * returns: dispatch a task, run it until it traps back in, service
 * whatever it asked for, repeat.
 */

use crate::arch::x86_64::context;
use crate::kernel::KernelState;
use crate::kernel::dispatch;
use crate::kernel::error::KernelError;
use crate::kernel::process::{ProcessState, Request};
use crate::kernel::{syscall, with_state_mut};

pub fn run() -> ! {
    // `dispatch::dispatch` manages its own locking (it must drop the lock
    // while idle-waiting for a tick), so it is never called from inside an
    // already-held `with_state_mut` closure - `spin::Mutex` is not
    // reentrant and nesting would deadlock the first time no task is
    // READY.
    dispatch::dispatch();

    loop {
        with_state_mut(|state| {
            let idx = state.current;
            state.table.slots[idx].request = Request::None;
            context::set_current_sp(state.table.slots[idx].sp);
        });

        // SAFETY: `current_sp` was just populated above from the
        // descriptor `dispatch` selected (or that a prior iteration left
        // behind); it always points at a live task stack.
        unsafe {
            context::exit_kernel();
        }

        let needs_redispatch = with_state_mut(|state| {
            let idx = state.current;
            state.table.slots[idx].sp = context::current_sp();
            let request = state.table.slots[idx].request;
            service(state, request)
        });

        if needs_redispatch {
            dispatch::dispatch();
        }
    }
}

/// Service whatever `request` the just-trapped task left behind. Returns
/// whether the trap loop must pick a new task afterward (CREATE, SUSPEND,
/// and RESUME all return to the caller instead).
fn service(state: &mut KernelState, request: Request) -> bool {
    let idx = state.current;
    log::debug!("service: pid {} request {:?}", state.table.slots[idx].pid, request);

    match request {
        Request::Create => {
            let code = state.table.slots[idx].code;
            let priority = state.table.slots[idx].priority;
            let arg = state.table.slots[idx].arg;
            let pid = match code {
                Some(code) => crate::kernel::process::allocate(
                    &mut state.table,
                    &mut state.last_pid,
                    syscall::terminate_trap,
                    code,
                    priority,
                    arg,
                ),
                None => Err(KernelError::InvalidKernelRequestErr),
            };
            match pid {
                Ok(pid) => {
                    state.task_count += 1;
                    crate::kernel::set_last_created_pid(pid);
                    state.err = KernelError::NoErr;
                }
                Err(e) => {
                    crate::kernel::set_last_created_pid(0);
                    state.err = e;
                }
            }
            false // do not redispatch: the creating task keeps running
        }

        Request::Terminate => {
            state.table.slots[idx].state = ProcessState::Dead;
            state.task_count = state.task_count.saturating_sub(1);
            true
        }

        Request::Suspend => {
            let target_pid = state.table.slots[idx].request_arg as u32;
            match state.table.find_by_pid(target_pid) {
                Some(target) if state.table.slots[target].state == ProcessState::Ready => {
                    state.table.slots[target].state = ProcessState::Suspended;
                    state.err = KernelError::NoErr;
                }
                Some(_) => {
                    state.err = KernelError::SuspendNonrunningTaskErr;
                }
                None => {
                    state.err = KernelError::PidNotFoundErr;
                }
            }
            // Do not redispatch: per design notes, SUSPEND/RESUME return
            // control to the caller rather than moving it off CPU.
            false
        }

        Request::Resume => {
            let target_pid = state.table.slots[idx].request_arg as u32;
            match state.table.find_by_pid(target_pid) {
                Some(target) if state.table.slots[target].state == ProcessState::Suspended => {
                    state.table.slots[target].state = ProcessState::Ready;
                    state.err = KernelError::NoErr;
                }
                Some(_) => {
                    state.err = KernelError::ResumeNonsuspendedTaskErr;
                }
                None => {
                    state.err = KernelError::PidNotFoundErr;
                }
            }
            false
        }

        Request::Sleep => {
            // request_arg already holds the tick countdown written by the
            // syscall facade; retained as-is.
            state.table.slots[idx].state = ProcessState::Sleeping;
            true
        }

        Request::Yield | Request::None => {
            // NONE arises when a task was preempted by the tick ISR
            // without issuing a syscall; treated identically to YIELD.
            state.table.slots[idx].state = ProcessState::Ready;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_running(state: &mut KernelState, idx: usize, pid: u32) {
        state.table.slots[idx].pid = pid;
        state.table.slots[idx].state = ProcessState::Running;
        state.current = idx;
    }

    #[test]
    fn terminate_marks_dead_decrements_task_count_and_requests_redispatch() {
        let mut state = KernelState::new();
        ready_running(&mut state, 1, 1);
        state.task_count = 2;

        assert!(service(&mut state, Request::Terminate));

        assert_eq!(state.table.slots[1].state, ProcessState::Dead);
        assert_eq!(state.task_count, 1);
    }

    #[test]
    fn suspend_requires_target_ready() {
        let mut state = KernelState::new();
        ready_running(&mut state, 1, 1);
        state.table.slots[2].pid = 2;
        state.table.slots[2].state = ProcessState::Running;
        state.table.slots[1].request_arg = 2;

        assert!(!service(&mut state, Request::Suspend));

        assert_eq!(state.err, KernelError::SuspendNonrunningTaskErr);
        assert_eq!(state.table.slots[2].state, ProcessState::Running);
    }

    #[test]
    fn suspend_unknown_pid_sets_pid_not_found() {
        let mut state = KernelState::new();
        ready_running(&mut state, 1, 1);
        state.table.slots[1].request_arg = 9999;

        service(&mut state, Request::Suspend);

        assert_eq!(state.err, KernelError::PidNotFoundErr);
    }

    #[test]
    fn resume_requires_target_suspended() {
        let mut state = KernelState::new();
        ready_running(&mut state, 1, 1);
        state.table.slots[2].pid = 2;
        state.table.slots[2].state = ProcessState::Suspended;
        state.table.slots[1].request_arg = 2;

        assert!(!service(&mut state, Request::Resume));

        assert_eq!(state.err, KernelError::NoErr);
        assert_eq!(state.table.slots[2].state, ProcessState::Ready);
    }

    #[test]
    fn yield_and_none_both_requeue_as_ready_and_request_redispatch() {
        let mut state = KernelState::new();
        ready_running(&mut state, 1, 1);

        assert!(service(&mut state, Request::Yield));
        assert_eq!(state.table.slots[1].state, ProcessState::Ready);

        state.table.slots[1].state = ProcessState::Running;
        assert!(service(&mut state, Request::None));
        assert_eq!(state.table.slots[1].state, ProcessState::Ready);
    }

    /// S6 - resume of a PID nobody holds sets PID_NOT_FOUND_ERR.
    #[test]
    fn resume_unknown_pid_sets_pid_not_found() {
        let mut state = KernelState::new();
        ready_running(&mut state, 1, 1);
        state.table.slots[1].request_arg = 9999;

        service(&mut state, Request::Resume);

        assert_eq!(state.err, KernelError::PidNotFoundErr);
    }

    /// S3 - suspend/resume over one control cycle: Pong goes
    /// READY -> SUSPENDED -> READY while Ctl (the caller) never leaves
    /// RUNNING, matching §4.5's note that SUSPEND/RESUME don't redispatch.
    #[test]
    fn suspend_then_resume_cycle_does_not_move_caller_off_cpu() {
        let mut state = KernelState::new();
        ready_running(&mut state, 1, 1); // Ctl, RUNNING throughout
        state.table.slots[2].pid = 2; // Pong
        state.table.slots[2].state = ProcessState::Ready;

        state.table.slots[1].request_arg = 2;
        service(&mut state, Request::Suspend);
        assert_eq!(state.err, KernelError::NoErr);
        assert_eq!(state.table.slots[2].state, ProcessState::Suspended);
        assert_eq!(state.table.slots[1].state, ProcessState::Running);

        service(&mut state, Request::Resume);
        assert_eq!(state.err, KernelError::NoErr);
        assert_eq!(state.table.slots[2].state, ProcessState::Ready);
        assert_eq!(state.table.slots[1].state, ProcessState::Running);
    }

    /// S1 - three equal-priority tasks created, then driven through
    /// repeated dispatch/yield-service cycles: observable order is strict
    /// round-robin, A, B, C, A, B, C, ... across three full cycles.
    #[test]
    fn round_robin_over_three_cycles_matches_creation_order() {
        let mut state = KernelState::new();
        for (idx, pid) in [(1u32, 1u32), (2, 2), (3, 3)] {
            state.table.slots[idx as usize].pid = pid;
            state.table.slots[idx as usize].state = ProcessState::Ready;
        }
        state.next_cursor = 1;

        let mut order = Vec::new();
        for _ in 0..9 {
            assert!(dispatch::dispatch_once(&mut state));
            order.push(state.table.slots[state.current].pid);
            service(&mut state, Request::Yield);
        }

        assert_eq!(order, vec![1, 2, 3, 1, 2, 3, 1, 2, 3]);
    }
}

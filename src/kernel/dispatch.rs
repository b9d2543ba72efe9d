/*
 * Scheduler / Dispatcher
 *
 * Strict round-robin over every non-DEAD slot, starting from a rotating
 * cursor. `priority` is recorded on each descriptor but never consulted
 * here - that's the explicit non-goal, not an oversight.
 */

use crate::arch::x86_64;
use crate::config;
use crate::kernel::KernelState;
use crate::kernel::process::ProcessState;
use crate::kernel::with_state_mut;

/// One forward pass over the table starting at `next_cursor`. Promotes
/// the first READY descriptor it finds to RUNNING and returns `true`; if
/// none is READY after a full pass, leaves state untouched and returns
/// `false`.
///
/// Pure table logic, callable directly in tests; `dispatch` below is the
/// version that actually runs against the kernel singleton and knows how
/// to wait.
pub fn dispatch_once(state: &mut KernelState) -> bool {
    for _ in 0..config::MAX_THREAD {
        let idx = state.next_cursor;
        state.next_cursor = (idx + 1) % config::MAX_THREAD;
        if state.table.slots[idx].state == ProcessState::Ready {
            state.table.slots[idx].state = ProcessState::Running;
            state.current = idx;
            crate::arch::x86_64::context::set_current_sp(state.table.slots[idx].sp);
            log::debug!("dispatch: pid {} (slot {})", state.table.slots[idx].pid, idx);
            return true;
        }
    }
    false
}

/// Pick the next READY task and promote it to RUNNING, waiting for the
/// tick if none is currently READY.
///
/// Each scan pass locks the kernel singleton only for its own duration;
/// the interrupt-enable-and-wait step below runs with the lock released; a
/// tick that fires during that window (the only thing that can produce a
/// freshly-READY task) is therefore free to take the lock itself in
/// `tick::on_tick` without deadlocking against this same core.
///
/// Must be called with interrupts disabled; returns with interrupts
/// disabled.
pub fn dispatch() {
    loop {
        if with_state_mut(dispatch_once) {
            return;
        }
        x86_64::enable_interrupts();
        x86_64::halt();
        x86_64::disable_interrupts();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::process::Request;

    fn make_ready(state: &mut KernelState, idx: usize, pid: u32) {
        state.table.slots[idx].state = ProcessState::Ready;
        state.table.slots[idx].pid = pid;
        state.table.slots[idx].request = Request::None;
        state.table.slots[idx].sp =
            state.table.slots[idx].workspace.as_ptr() as usize + 64;
    }

    #[test]
    fn scans_forward_from_cursor_in_round_robin_order() {
        let mut state = KernelState::new();
        make_ready(&mut state, 1, 1);
        make_ready(&mut state, 2, 2);
        make_ready(&mut state, 3, 3);
        state.next_cursor = 1;

        assert!(dispatch_once(&mut state));
        assert_eq!(state.current, 1);
        assert_eq!(state.next_cursor, 2);
        state.table.slots[1].state = ProcessState::Ready; // pretend it yielded back in

        assert!(dispatch_once(&mut state));
        assert_eq!(state.current, 2);

        assert!(dispatch_once(&mut state));
        assert_eq!(state.current, 3);
    }

    #[test]
    fn chosen_descriptor_becomes_running() {
        let mut state = KernelState::new();
        make_ready(&mut state, 5, 42);
        state.next_cursor = 5;
        assert!(dispatch_once(&mut state));
        assert_eq!(state.table.slots[5].state, ProcessState::Running);
    }

    #[test]
    fn reports_no_ready_task_without_mutating_cursor_progress_lost() {
        let mut state = KernelState::new();
        state.next_cursor = 3;
        assert!(!dispatch_once(&mut state));
        // A full pass always advances the cursor back to where it started.
        assert_eq!(state.next_cursor, 3);
    }
}

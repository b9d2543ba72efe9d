/*
 * Task Introspection
 *
 * Read-only snapshots of process descriptors, for diagnostic logging and
 * for demo tasks that want to print what the table currently looks like.
 * Not part of the syscall ABI - these never trap, and never mutate
 * anything.
 */

use crate::kernel::process::ProcessState;
use crate::kernel::with_state_irqsafe;

#[derive(Debug, Clone, Copy)]
pub struct TaskSnapshot {
    pub pid: u32,
    pub priority: u8,
    pub state: ProcessState,
}

/// Snapshot every non-DEAD descriptor into `out`, returning how many were
/// written. Runs with interrupts disabled for the duration of the scan,
/// same as any other table read - safe to call from task context (where
/// interrupts are on) or from boot (where they aren't) alike.
pub fn snapshot(out: &mut [TaskSnapshot]) -> usize {
    with_state_irqsafe(|state| {
        let mut n = 0;
        for pd in state.table.slots.iter() {
            if pd.state == ProcessState::Dead {
                continue;
            }
            if n >= out.len() {
                break;
            }
            out[n] = TaskSnapshot {
                pid: pd.pid,
                priority: pd.priority,
                state: pd.state,
            };
            n += 1;
        }
        n
    })
}

/// Number of non-DEAD descriptors currently in the table.
pub fn task_count() -> usize {
    with_state_irqsafe(|state| state.task_count)
}

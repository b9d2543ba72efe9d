/*
 * Tick Handler
 *
 * Runs in interrupt context on every periodic tick (~10ms, see
 * `config::TICK_PERIOD_MS`). Its only job is sleep expiry: it must never
 * touch `current` and must never context-switch, since it can land in the
 * middle of either a running task or (between dispatches) the kernel
 * itself.
 */

use crate::kernel::process::ProcessState;
use crate::kernel::with_state_mut;
#[cfg(feature = "trace-syscalls")]
use crate::utils::debug::irq_log;

pub fn on_tick() {
    with_state_mut(|state| {
        for pd in state.table.slots.iter_mut() {
            if pd.state == ProcessState::Sleeping {
                pd.request_arg -= 1;
                if pd.request_arg <= 0 {
                    pd.state = ProcessState::Ready;
                    // Raw IRQ-safe logger only: the `log` facade's UART
                    // spinlock is not IRQ-safe and this runs in ISR context.
                    #[cfg(feature = "trace-syscalls")]
                    irq_log::irq_log_simple("tick-wake");
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::KernelState;

    #[test]
    fn decrements_sleeping_descriptors_and_wakes_at_zero() {
        let mut state = KernelState::new();
        state.table.slots[1].state = ProcessState::Sleeping;
        state.table.slots[1].request_arg = 2;
        state.table.slots[2].state = ProcessState::Sleeping;
        state.table.slots[2].request_arg = 1;

        tick_once(&mut state);
        assert_eq!(state.table.slots[1].request_arg, 1);
        assert_eq!(state.table.slots[1].state, ProcessState::Sleeping);
        assert_eq!(state.table.slots[2].state, ProcessState::Ready);

        tick_once(&mut state);
        assert_eq!(state.table.slots[1].state, ProcessState::Ready);
    }

    #[test]
    fn only_touches_sleeping_descriptors() {
        let mut state = KernelState::new();
        state.table.slots[3].state = ProcessState::Running;
        state.table.slots[3].request_arg = 5;
        state.table.slots[4].state = ProcessState::Ready;
        state.table.slots[5].state = ProcessState::Suspended;

        tick_once(&mut state);

        assert_eq!(state.table.slots[3].state, ProcessState::Running);
        assert_eq!(state.table.slots[3].request_arg, 5);
        assert_eq!(state.table.slots[4].state, ProcessState::Ready);
        assert_eq!(state.table.slots[5].state, ProcessState::Suspended);
    }

    /// Test-only helper mirroring `on_tick`'s body directly against a
    /// caller-owned `KernelState`, bypassing the global singleton so
    /// tests don't interfere with one another.
    fn tick_once(state: &mut KernelState) {
        for pd in state.table.slots.iter_mut() {
            if pd.state == ProcessState::Sleeping {
                pd.request_arg -= 1;
                if pd.request_arg <= 0 {
                    pd.state = ProcessState::Ready;
                }
            }
        }
    }
}

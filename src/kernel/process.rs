/*
 * Process Descriptor & Task Table
 *
 * One fixed-size array of descriptors, allocated statically for the
 * lifetime of the kernel. Slot 0 is never handed out: PID 0 doubles as
 * "no task" everywhere in the external interface, so the slot that would
 * produce it is simply skipped by allocation.
 */

use crate::arch::x86_64::context;
use crate::config;
use crate::kernel::error::KernelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Dead,
    Ready,
    Running,
    Suspended,
    Sleeping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    None,
    Create,
    Yield,
    Terminate,
    Suspend,
    Resume,
    Sleep,
}

pub type EntryFn = extern "C" fn() -> !;

#[derive(Clone, Copy)]
pub struct ProcessDescriptor {
    pub pid: u32,
    pub priority: u8,
    pub state: ProcessState,
    pub request: Request,
    /// Sleep-ticks remaining (SLEEP) or target PID (SUSPEND/RESUME).
    pub request_arg: i32,
    /// Entry argument; informational until a `get_arg` operation exists.
    pub arg: i32,
    pub sp: usize,
    pub workspace: [u8; config::TASK_STACK_BYTES],
    pub code: Option<EntryFn>,
}

impl ProcessDescriptor {
    const fn dead() -> Self {
        ProcessDescriptor {
            pid: 0,
            priority: 10,
            state: ProcessState::Dead,
            request: Request::None,
            request_arg: 0,
            arg: 0,
            sp: 0,
            workspace: [0u8; config::TASK_STACK_BYTES],
            code: None,
        }
    }

    /// A zeroed, DEAD descriptor - what `boot::init` resets every slot to.
    pub const fn reset() -> Self {
        Self::dead()
    }

    /// Does `sp` currently point inside this descriptor's own workspace?
    pub fn sp_in_workspace(&self) -> bool {
        let base = self.workspace.as_ptr() as usize;
        let top = base + self.workspace.len();
        self.sp >= base && self.sp < top
    }
}

pub struct ProcessTable {
    pub slots: [ProcessDescriptor; config::MAX_THREAD],
}

impl ProcessTable {
    pub const fn new() -> Self {
        ProcessTable {
            slots: [ProcessDescriptor::dead(); config::MAX_THREAD],
        }
    }

    /// First DEAD slot at index >= 1 (slot 0 is never allocated).
    fn first_dead_slot(&self) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, pd)| pd.state == ProcessState::Dead)
            .map(|(i, _)| i)
    }

    pub fn find_by_pid(&self, pid: u32) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .find(|(_, pd)| pd.state != ProcessState::Dead && pd.pid == pid)
            .map(|(i, _)| i)
    }

    /// First non-DEAD descriptor whose entry function matches, or `None`.
    pub fn find_pid_by_entry(&self, entry: EntryFn) -> Option<u32> {
        self.slots
            .iter()
            .find(|pd| pd.state != ProcessState::Dead && pd.code == Some(entry))
            .map(|pd| pd.pid)
    }
}

/// Allocate a slot, build its stack, and move it to READY.
///
/// `last_pid` is pre-incremented before being assigned, per the PID
/// registry's allocation rule: the value handed out is always fresh, and
/// 0 is never issued.
pub fn allocate(
    table: &mut ProcessTable,
    last_pid: &mut u32,
    terminate_trap: EntryFn,
    code: EntryFn,
    priority: u8,
    arg: i32,
) -> Result<u32, KernelError> {
    let idx = table.first_dead_slot().ok_or(KernelError::MaxProcessErr)?;

    *last_pid += 1;
    let pid = *last_pid;

    let pd = &mut table.slots[idx];
    pd.pid = pid;
    pd.priority = priority;
    pd.request = Request::None;
    pd.request_arg = 0;
    pd.arg = arg;
    pd.code = Some(code);
    pd.sp = context::new_task_stack(&mut pd.workspace, code, terminate_trap);
    pd.state = ProcessState::Ready;

    Ok(pid)
}

#[cfg(test)]
mod tests {
    use super::*;

    extern "C" fn dummy_entry() -> ! {
        loop {}
    }
    extern "C" fn other_entry() -> ! {
        loop {}
    }
    extern "C" fn terminate_trap() -> ! {
        loop {}
    }

    #[test]
    fn slot_zero_is_never_allocated() {
        let mut table = ProcessTable::new();
        let mut last_pid = 0u32;
        for _ in 0..(config::MAX_THREAD - 1) {
            allocate(&mut table, &mut last_pid, terminate_trap, dummy_entry, 5, 0).unwrap();
        }
        assert_eq!(table.slots[0].state, ProcessState::Dead);
    }

    #[test]
    fn pids_are_assigned_pre_incremented_and_unique() {
        let mut table = ProcessTable::new();
        let mut last_pid = 0u32;
        let p1 = allocate(&mut table, &mut last_pid, terminate_trap, dummy_entry, 5, 0).unwrap();
        let p2 = allocate(&mut table, &mut last_pid, terminate_trap, dummy_entry, 5, 0).unwrap();
        assert_eq!(p1, 1);
        assert_eq!(p2, 2);
        assert_ne!(p1, p2);
    }

    #[test]
    fn table_full_reports_max_process_err() {
        let mut table = ProcessTable::new();
        let mut last_pid = 0u32;
        for _ in 0..(config::MAX_THREAD - 1) {
            allocate(&mut table, &mut last_pid, terminate_trap, dummy_entry, 5, 0).unwrap();
        }
        let err = allocate(&mut table, &mut last_pid, terminate_trap, dummy_entry, 5, 0).unwrap_err();
        assert_eq!(err, KernelError::MaxProcessErr);
    }

    #[test]
    fn find_pid_by_entry_matches_first_hit() {
        let mut table = ProcessTable::new();
        let mut last_pid = 0u32;
        let pid = allocate(&mut table, &mut last_pid, terminate_trap, dummy_entry, 5, 0).unwrap();
        assert_eq!(table.find_pid_by_entry(dummy_entry), Some(pid));
        assert_eq!(table.find_pid_by_entry(other_entry), None);
    }

    #[test]
    fn new_descriptor_sp_lies_in_its_own_workspace() {
        let mut table = ProcessTable::new();
        let mut last_pid = 0u32;
        allocate(&mut table, &mut last_pid, terminate_trap, dummy_entry, 5, 0).unwrap();
        assert!(table.slots[1].sp_in_workspace());
    }
}

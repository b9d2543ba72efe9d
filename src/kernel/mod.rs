/*
 * Kernel Core
 *
 * The task lifecycle state machine, the syscall ABI, the context-switch
 * protocol, tick-driven sleep, and the static task table all live here.
 * Everything below `arch` is the architecture-independent core; everything
 * in `arch` is this crate's one concrete realization of the boundary it's
 * written against.
 */

pub mod boot;
pub mod dispatch;
pub mod error;
pub mod process;
pub mod stats;
pub mod syscall;
pub mod tick;
pub mod trap;

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use spin::Mutex;

use crate::config;
use error::KernelError;
use process::ProcessTable;

/// All kernel-owned mutable state, behind one process-wide singleton.
/// Every field here corresponds 1:1 to a cell the kernel core is defined
/// over; `kernel_sp`/`current_sp` live instead in `arch::x86_64::context`,
/// since they belong to the context-switch primitive rather than to the
/// scheduling state itself. `kernel_active` and `last_created_pid` live
/// outside this struct entirely (see below): both are read by the syscall
/// facade at points where interrupts may already be back on, and reading
/// them must never take the `STATE` lock.
pub struct KernelState {
    pub table: ProcessTable,
    /// Index of the RUNNING descriptor. Meaningless (and unused) while
    /// the kernel itself is executing between dispatches.
    pub current: usize,
    pub next_cursor: usize,
    pub task_count: usize,
    pub last_pid: u32,
    pub err: KernelError,
}

impl KernelState {
    pub(crate) const fn new() -> Self {
        KernelState {
            table: ProcessTable::new(),
            current: 0,
            next_cursor: 0,
            task_count: 0,
            last_pid: 0,
            err: KernelError::NoErr,
        }
    }
}

static STATE: Mutex<KernelState> = Mutex::new(KernelState::new());

/// Whether the trap loop is running. A bare atomic rather than a
/// `KernelState` field: every syscall wrapper checks this *before*
/// disabling interrupts (it must, to decide whether disabling interrupts
/// and trapping is even appropriate), so checking it can never be allowed
/// to take the `STATE` lock - a tick landing in that window would deadlock
/// against its own `with_state_mut` call in `tick::on_tick`.
static KERNEL_ACTIVE: AtomicBool = AtomicBool::new(false);

/// PID produced by the most recently serviced CREATE request, or 0. The
/// side channel `Task_Create` reads its return value back through. Also a
/// bare atomic, not a `KernelState` field: by the time `task_create` reads
/// it back, `exit_kernel`'s `sti` may already have re-enabled interrupts,
/// so this read must not take the `STATE` lock either.
static LAST_CREATED_PID: AtomicU32 = AtomicU32::new(0);

pub fn kernel_active() -> bool {
    KERNEL_ACTIVE.load(Ordering::Acquire)
}

pub fn set_kernel_active(active: bool) {
    KERNEL_ACTIVE.store(active, Ordering::Release);
}

pub fn last_created_pid() -> u32 {
    LAST_CREATED_PID.load(Ordering::Acquire)
}

pub fn set_last_created_pid(pid: u32) {
    LAST_CREATED_PID.store(pid, Ordering::Release);
}

/// Run `f` against the kernel singleton, returning its result.
///
/// The lock is never contended in practice - every access happens with
/// interrupts disabled, which is the kernel's actual mutual-exclusion
/// mechanism (see design notes); the mutex exists to give the singleton a
/// safe `'static` handle rather than to arbitrate real concurrency. Callers
/// must disable interrupts before calling this (or already be in a context
/// where they're guaranteed off, such as the tick ISR); locking `STATE`
/// with interrupts enabled risks the exact same self-deadlock `KERNEL_ACTIVE`
/// above is carved out to avoid.
pub fn with_state<R>(f: impl FnOnce(&KernelState) -> R) -> R {
    f(&STATE.lock())
}

pub fn with_state_mut<R>(f: impl FnOnce(&mut KernelState) -> R) -> R {
    f(&mut STATE.lock())
}

/// Read-only access to the singleton from a caller that doesn't already
/// know whether interrupts are on - pure introspection (`stats::*`), not
/// the syscall facade, which always knows its own interrupt state from the
/// trap protocol. Saves and restores the interrupt flag around the lock
/// rather than unconditionally enabling interrupts afterward, so calling
/// this before the kernel is active (interrupts off) doesn't turn them on
/// early.
pub fn with_state_irqsafe<R>(f: impl FnOnce(&KernelState) -> R) -> R {
    let was_enabled = crate::arch::x86_64::interrupts_enabled();
    crate::arch::x86_64::disable_interrupts();
    let result = with_state(f);
    if was_enabled {
        crate::arch::x86_64::enable_interrupts();
    }
    result
}

pub use config::MAX_THREAD;

/*
 * Compile-Time Kernel Configuration
 *
 * Every size and timing constant the kernel core is parameterized over,
 * collected in one place rather than scattered as magic numbers through
 * `kernel::*`.
 */

/// Maximum number of task slots in the static process table. Index 0 is
/// reserved (never allocated to a task), so this many task slots yields
/// `MAX_THREAD - 1` usable descriptors.
pub const MAX_THREAD: usize = 16;

/// Size, in bytes, of each task's private stack workspace.
pub const TASK_STACK_BYTES: usize = 8 * 1024;

/// Tick period, in milliseconds. `arch::x86_64::interrupts::PIT_RELOAD` is
/// derived from this value, not hand-synced with it.
pub const TICK_PERIOD_MS: u32 = 10;

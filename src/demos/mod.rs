/*
 * Demo Tasks
 *
 * Illustrative only - not part of the kernel core. These exist to give
 * `kstart` something to create before calling `kernel::boot::start`, and
 * to exercise the syscall facade end to end (create, yield, sleep,
 * suspend, resume) the way a board bring-up would.
 */

pub mod tasks;

use crate::kernel::syscall;

/// Create the full demo task set. Must be called before
/// `kernel::boot::start` (it runs while the kernel is still inactive, so
/// each `task_create` builds its task directly rather than trapping).
pub fn spawn_all() {
    syscall::task_create(tasks::round_robin_a, 10, 0);
    syscall::task_create(tasks::round_robin_b, 10, 0);
    syscall::task_create(tasks::round_robin_c, 10, 0);
    syscall::task_create(tasks::sleeper, 10, 0);
    syscall::task_create(tasks::ping, 10, 0);
    syscall::task_create(tasks::pong, 10, 0);
    syscall::task_create(tasks::ctl, 10, 0);
}

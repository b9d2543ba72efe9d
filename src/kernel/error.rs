/*
 * Kernel Error Enumeration
 *
 * Errors are recorded, never thrown: every syscall wrapper returns a
 * sentinel value on failure, and a caller that cares about the kind reads
 * this cell afterward. There is one cell for the whole kernel, not one
 * per task - syscalls are synchronous and the cell is always read
 * immediately after the call that might have set it.
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    NoErr,
    InvalidKernelRequestErr,
    KernelInactiveErr,
    MaxProcessErr,
    PidNotFoundErr,
    SuspendNonrunningTaskErr,
    ResumeNonsuspendedTaskErr,
}

/*
 * Architecture Support
 *
 * The kernel core (the `kernel` module) is written against this boundary:
 * a (stack-buffer, entry-fn, terminate-fn) -> initial-sp stack synthesizer,
 * plus the `enter_kernel`/`exit_kernel` trampolines and the periodic tick
 * source. Everything above this boundary is architecture-independent.
 *
 * Only one concrete realization is provided: x86_64 freestanding, under the
 * BOOTBOOT loader protocol.
 */

#[cfg(target_arch = "x86_64")]
pub mod x86_64;

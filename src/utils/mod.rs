/*
 * Kernel Utilities and Support Functions
 *
 * This module contains the small amount of support code the kernel core
 * needs that isn't itself part of the scheduling/trap machinery: the print
 * macros and the logging sink they're built on.
 *
 * Key components:
 * - macros: Kernel-specific print/println macros over the debug UART
 * - debug: Logging (the `log` facade sink plus an IRQ-safe raw logger)
 */

#[macro_use]
pub mod macros;
pub mod debug;

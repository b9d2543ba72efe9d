/*
 * Debugging and Logging Utilities
 *
 * This module contains utilities for debugging and logging,
 * providing structured logging and debug output capabilities.
 */

pub mod irq_log;
pub mod logger;

/*
 * Kernel Utilities
 *
 * - logger: `log` backend writing to a registered sink
 * - timer: timer-manager interface and tick conversions
 */

pub mod logger;
pub mod timer;

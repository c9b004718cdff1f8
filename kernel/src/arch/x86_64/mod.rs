/*
 * x86_64 Architecture Support Module
 *
 * Submodules:
 * - interrupts: interrupt masking, the RAII guard and the halt loop
 */

pub mod interrupts;

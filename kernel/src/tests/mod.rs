/*
 * Syscall Layer Tests
 *
 * End-to-end tests that drive `dispatch` against in-memory collaborators.
 * Unit tests for individual modules live next to the code.
 */

mod fixture;

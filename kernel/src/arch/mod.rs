/*
 * Architecture Abstraction Layer
 *
 * Only x86_64 is supported. The interrupt-control surface compiles on every
 * target; on hosted builds it is backed by a software flag.
 */

pub mod x86_64;

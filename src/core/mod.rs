/*!
 * Core Primitives
 * Synchronization building blocks shared by every buffer variant
 */

pub mod sync;

//! Compile-time capacity constants.
//!
//! Mirrors `eos_config.h`: every pool in the kernel is a fixed-size array
//! sized by the constants below. There is no dynamic memory anywhere in
//! this crate; raising a limit means recompiling.

/// Maximum number of tasks that can be created, not counting the idle task.
pub const N_TASK: usize = 8;

/// Bytes reserved for each task's stack.
pub const STACK_SZ: usize = 1024;

/// Number of distinct priority levels. Priority `0` is the highest.
pub const P_MAX: usize = 8;

/// Maximum number of semaphores that can be created.
pub const N_SEMAPHORES: usize = 16;

/// Maximum number of queues that can be created. Each queue consumes two
/// semaphore slots from [`N_SEMAPHORES`].
pub const N_QUEUES: usize = 4;

/// Number of interrupt service slots in the handler table.
pub const N_INTERRUPTS: usize = 52;

/// Tick period in microseconds, used by a port to program its tick timer.
pub const TICK_PERIOD_US: u32 = 200;

const _: () = assert!(N_TASK > 0, "N_TASK must allow at least one task");
const _: () = assert!(N_TASK < u8::MAX as usize, "N_TASK must fit a u8 index");
const _: () = assert!(STACK_SZ >= 128, "STACK_SZ is too small to hold a context frame");
const _: () = assert!(P_MAX > 0 && P_MAX <= u8::MAX as usize, "P_MAX out of range");
const _: () = assert!(N_SEMAPHORES > 0, "N_SEMAPHORES must allow at least one semaphore");
const _: () = assert!(N_QUEUES * 2 <= N_SEMAPHORES, "each queue needs two semaphore slots");
const _: () = assert!(N_INTERRUPTS > 0, "N_INTERRUPTS must be non-zero");

//! The architecture-dependent context-switch contract.
//!
//! Everything that touches real machine registers or NVIC-style interrupt
//! controllers lives behind [`Port`]. The rest of the kernel only ever sees
//! a [`StackPointer`] and an [`EntryPoint`]; it never encodes a calling
//! convention or a trap frame layout itself.
//!
//! The default build selects [`mok`], a software port that runs on the host
//! and performs no real stack switching. It lets the rest of the kernel be
//! exercised by `cargo test` without a target board. A real MCU port (see
//! `cortex_m`) is selected by `target_arch` instead.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(target_arch = "arm")] {
        mod cortex_m;
        pub use self::cortex_m::CortexM as Current;
    } else {
        mod mok;
        pub use mok::Mok as Current;
    }
}

/// Opaque pointer to the top of a saved task context on its own stack.
pub type StackPointer = *mut u8;

/// A task's entry point, called with the single data pointer it was created
/// with. Entry points never return in practice; if one does, the port calls
/// back into the kernel's task-error path instead of resuming garbage.
pub type EntryPoint = extern "C" fn(*mut ());

/// The architecture-dependent half of the kernel.
///
/// A port does not know about tasks, priorities or semaphores: it only
/// knows how to lay out an initial stack frame, how to resume a saved one,
/// and how to arm the two interrupts (tick, pendable trap) the rest of the
/// kernel drives.
pub trait Port {
    /// Writes an initial context frame at the top of `stack` so that
    /// resuming it for the first time calls `entry(arg)`. Returns the stack
    /// pointer to save in the task descriptor.
    ///
    /// `on_return` is called if `entry` ever returns; real entry points
    /// never do, but a task function is ordinary Rust code and nothing
    /// stops it from falling off the end.
    fn prepare_initial_frame(
        &self,
        stack: &mut [u8],
        entry: EntryPoint,
        arg: *mut (),
        on_return: EntryPoint,
    ) -> StackPointer;

    /// Restores the context at `sp` and transfers control to it. Never
    /// returns to the caller.
    ///
    /// # Safety
    /// `sp` must have been produced by [`Port::prepare_initial_frame`] or
    /// previously saved from a live task context by the kernel's own
    /// pendable-trap handler.
    unsafe fn restore(&self, sp: StackPointer) -> !;

    /// Programs the periodic tick interrupt at [`crate::config::TICK_PERIOD_US`].
    fn setup_tick_timer(&self);

    /// Configures the pendable context-switch trap (e.g. PendSV) at the
    /// lowest interrupt priority.
    fn setup_pendable_trap(&self);

    /// Sets the pendable trap's pending bit, asking for a reschedule as
    /// soon as interrupts allow.
    fn request_pendable_trap(&self);

    /// Puts the processor to sleep until the next interrupt. Used by the
    /// default [`crate::error::Hooks::inactive`].
    fn wait_for_interrupt(&self);
}

/// Returns the selected port.
pub fn current() -> Current {
    Current::new()
}

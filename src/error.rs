//! Error taxonomy and the user-overridable notification hooks.
//!
//! The original kernel notifies the application of internal error
//! conditions through a handful of weakly-linked callbacks
//! (`EosOnErrorCallback` and friends). Rust has no portable weak linkage,
//! so this crate replaces them with a [`Hooks`] trait: a single
//! `&'static dyn Hooks` installed once at [`crate::api::eos_start_scheduler`]
//! time stands in for "the user may override this".

/// Kinds of recoverable error the kernel reports to [`Hooks::on_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// `EosTaskCreate` was called but the task pool is full.
    CreatingTask,
    /// `EosSemaphoreCreate` was called but the semaphore pool is full.
    CreatingSemaphore,
    /// `EosQueueCreate` was called but the queue pool is full, or it could
    /// not allocate the two semaphores a queue needs.
    CreatingQueue,
    /// `EosSemaphoreTake` returned without acquiring the semaphore because
    /// the call was made from interrupt context, where blocking is not
    /// possible.
    TakingSemaphore,
    /// `EosWaitDelay` was called from interrupt context.
    DelayInHandler,
    /// `EosCpuYield` was called from interrupt context.
    YieldInHandler,
}

/// Notification points a host application may override.
///
/// All methods default to doing nothing except [`Hooks::inactive`], which
/// defaults to the port's idle wait (e.g. `wfi` on Cortex-M, a spin-yield on
/// the host). None of these run with interrupts masked; none of them may
/// call a blocking syscall (`EosWaitDelay`, `EosCpuYield`, a blocking
/// `EosSemaphoreTake`): there is no task context to resume into.
pub trait Hooks: Sync {
    /// Called when a task function returns, just before the task is recycled
    /// back into the `Creating` state.
    fn end_task(&self, _task: crate::task::TaskId) {}

    /// Called once per tick, after expired delays have been resumed.
    fn sys_tick(&self) {}

    /// Called repeatedly by the idle task whenever no other task is ready.
    /// Must not block on anything that requires scheduling to make
    /// progress: the idle task itself never descheduled.
    fn inactive(&self) {
        crate::port::current().wait_for_interrupt();
    }

    /// Called whenever the kernel detects one of [`ErrorKind`]'s conditions.
    fn on_error(&self, _error: ErrorKind) {}
}

/// The default [`Hooks`] implementation: every callback is a no-op except
/// [`Hooks::inactive`], which keeps the port's default idle behavior.
pub struct NoopHooks;

impl Hooks for NoopHooks {}

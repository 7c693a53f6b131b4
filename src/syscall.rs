//! The trap layer: the periodic tick, the two blocking syscalls a task can
//! issue without going through [`crate::semaphore`]/[`crate::queue`]
//! directly (`Delay`, `Yield`), and the pendable context-switch trap.
//!
//! On real hardware `eos_wait_delay`/`eos_cpu_yield` reach this module
//! through an `SVC` exception the way `EosWaitDelay`/`EosCpuYield` do in the
//! original kernel; [`crate::api`] calls the same functions directly
//! instead of encoding a software interrupt, since the supervisor-call
//! trap itself is architecture-specific plumbing a [`crate::port::Port`]
//! would have to provide and the dispatch it performs is exactly this.

use crate::kernel::with_kernel;
use crate::port::StackPointer;
use crate::task::{TaskId, TaskState};

/// Called once per tick (from a port's tick-timer interrupt). Decrements
/// every delay-waiting task's remaining ticks and makes it ready once it
/// reaches zero, then runs [`crate::error::Hooks::sys_tick`].
///
/// A `Waiting` task with `wait_ticks == 0` is blocked on a semaphore, not a
/// delay (invariant I3: the two are mutually exclusive); it must be left
/// alone here; decrementing it would underflow.
pub fn on_tick() {
    with_kernel(|kernel| {
        for index in 0..crate::config::N_TASK {
            let id = TaskId(index as u8);
            if kernel.task(id).state == TaskState::Waiting && kernel.task(id).wait_ticks > 0 {
                let ticks = &mut kernel.task_mut(id).wait_ticks;
                *ticks -= 1;
                if *ticks == 0 {
                    kernel.set_task_state(id, TaskState::Ready);
                    kernel.scheduling_required();
                }
            }
        }
    });
    with_kernel(|kernel| kernel.hooks).sys_tick();
}

/// Puts the calling task to sleep for `ticks` timer ticks.
///
/// Must only be called from task context; [`crate::api::eos_wait_delay`]
/// checks [`crate::interrupt::handler_active`] before reaching here.
pub fn request_delay(caller: TaskId, ticks: u32) {
    with_kernel(|kernel| {
        kernel.task_mut(caller).wait_ticks = ticks;
        kernel.set_task_state(caller, TaskState::Waiting);
        kernel.scheduling_required();
    });
}

/// Gives up the remainder of the caller's time slice without blocking.
///
/// The caller stays `Ready` and re-enters its own queue at the tail behind
/// any other ready tasks at the same priority, exactly as letting
/// `TaskSetState` re-run on an already-ready task would, since the pendable
/// trap alone is what picks a new task to run.
pub fn request_yield(caller: TaskId) {
    with_kernel(|kernel| {
        kernel.set_task_state(caller, TaskState::Ready);
        kernel.scheduling_required();
    });
}

/// The non-asm half of the pendable context-switch trap.
///
/// `old_sp` is the stack pointer a port saved for the previously running
/// task just before calling in, or `None` the very first time the trap
/// fires, before any task has run. Returns the stack pointer the port
/// should resume next.
pub fn context_switch(old_sp: Option<StackPointer>) -> StackPointer {
    with_kernel(|kernel| {
        if let Some(sp) = old_sp {
            if let Some(active) = kernel.active_task {
                if kernel.task(active).state != TaskState::Creating {
                    kernel.task_mut(active).stack_pointer = sp;
                    if kernel.task(active).state == TaskState::Running {
                        kernel.set_task_state(active, TaskState::Ready);
                    }
                }
            }
        }
        let next = kernel.schedule();
        kernel.task(next).stack_pointer
    })
}

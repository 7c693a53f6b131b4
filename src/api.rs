//! The stable public surface, equivalent to the original kernel's
//! `Eos*` functions in `eos_api.c`.
//!
//! Every fallible creation call reports the matching [`ErrorKind`] through
//! the installed [`Hooks`] before returning `None`, and the two syscalls
//! that only make sense from task context (`eos_wait_delay`,
//! `eos_cpu_yield`) report and refuse to run at all when called from an
//! interrupt handler, instead of corrupting the interrupted task's state.

use crate::error::{ErrorKind, Hooks};
use crate::interrupt;
use crate::kernel::with_kernel;
use crate::port::{self, EntryPoint, Port};
use crate::queue::{self, QueueId};
use crate::semaphore::{self, SemaphoreId};
use crate::syscall;
use crate::task::{TaskId, TaskState};

fn current_task() -> TaskId {
    with_kernel(|kernel| kernel.active_task).unwrap_or(TaskId::IDLE)
}

/// Returns the task currently `Running`, or [`TaskId::IDLE`] before the
/// scheduler has picked a first task. The task manager's `TaskCurrent`.
pub fn eos_task_current() -> TaskId {
    current_task()
}

/// Returns `task`'s current lifecycle state.
pub fn eos_task_state(task: TaskId) -> TaskState {
    with_kernel(|kernel| kernel.task(task).state())
}

/// Returns `task`'s static priority. Always `0` for [`TaskId::IDLE`], which
/// holds no real priority slot.
pub fn eos_task_priority(task: TaskId) -> u8 {
    with_kernel(|kernel| kernel.task(task).priority())
}

extern "C" fn task_returned(_arg: *mut ()) {
    with_kernel(|kernel| {
        if let Some(active) = kernel.active_task {
            kernel.hooks.end_task(active);
            kernel.set_task_state(active, TaskState::Creating);
            kernel.scheduling_required();
        }
    });
}

extern "C" fn idle_loop(_arg: *mut ()) {
    loop {
        with_kernel(|kernel| kernel.hooks).inactive();
    }
}

/// Creates a task running `entry(data)` at `priority`, once
/// [`eos_start_scheduler`] has installed hooks. Returns `None`, after
/// reporting [`ErrorKind::CreatingTask`], if the task pool is full.
pub fn eos_task_create(entry: EntryPoint, data: *mut (), priority: u8) -> Option<TaskId> {
    let id = with_kernel(|kernel| {
        let id = kernel.allocate_task()?;
        // SAFETY: the slice borrows KERNEL's own stack storage, which lives
        // for the program's duration; the task descriptor it backs is never
        // reallocated to another stack.
        let stack: &'static mut [u8] =
            unsafe { core::mem::transmute(&mut kernel.stacks.0[id.index()][..]) };
        let sp = port::current().prepare_initial_frame(stack, entry, data, task_returned);
        kernel.task_mut(id).stack_pointer = sp;
        kernel.task_mut(id).priority = priority;
        kernel.set_task_state(id, TaskState::Ready);
        Some(id)
    });
    if id.is_none() {
        with_kernel(|kernel| kernel.report(ErrorKind::CreatingTask));
    }
    id
}

/// Brings up the idle task, arms the tick and pendable-trap interrupts, and
/// hands control to the scheduler. Never returns.
///
/// `hooks` is installed once and used for the lifetime of the program; a
/// host build that never calls this function (exercising kernel internals
/// directly instead, as this crate's own tests do) keeps the default
/// no-op [`crate::error::NoopHooks`].
pub fn eos_start_scheduler(hooks: &'static dyn Hooks) -> ! {
    with_kernel(|kernel| {
        kernel.hooks = hooks;
        let stack: &'static mut [u8] =
            unsafe { core::mem::transmute(&mut kernel.stacks.0[TaskId::IDLE.index()][..]) };
        let sp = port::current().prepare_initial_frame(
            stack,
            idle_loop,
            core::ptr::null_mut(),
            idle_loop,
        );
        kernel.task_mut(TaskId::IDLE).stack_pointer = sp;
        kernel.set_task_state(TaskId::IDLE, TaskState::Ready);
        kernel.started = true;
        for index in 0..crate::config::N_TASK {
            let id = TaskId(index as u8);
            if kernel.task(id).state() == TaskState::Ready {
                let priority = kernel.task(id).priority();
                kernel.scheduler.enqueue(&mut kernel.tasks, id, priority);
            }
        }
    });

    let active_port = port::current();
    active_port.setup_tick_timer();
    active_port.setup_pendable_trap();
    with_kernel(|kernel| kernel.scheduling_required());

    loop {
        active_port.wait_for_interrupt();
    }
}

/// Suspends the calling task for `ticks` timer ticks. Refuses to run, after
/// reporting [`ErrorKind::DelayInHandler`], when called from interrupt
/// context.
pub fn eos_wait_delay(ticks: u32) {
    if interrupt::handler_active() {
        with_kernel(|kernel| kernel.report(ErrorKind::DelayInHandler));
        return;
    }
    syscall::request_delay(current_task(), ticks);
}

/// Gives up the remainder of the calling task's time slice. Refuses to run,
/// after reporting [`ErrorKind::YieldInHandler`], when called from
/// interrupt context.
pub fn eos_cpu_yield() {
    if interrupt::handler_active() {
        with_kernel(|kernel| kernel.report(ErrorKind::YieldInHandler));
        return;
    }
    syscall::request_yield(current_task());
}

/// Creates a counting semaphore. See [`semaphore::eos_semaphore_create`].
pub fn eos_semaphore_create(initial_value: i32) -> Option<SemaphoreId> {
    semaphore::eos_semaphore_create(initial_value)
}

/// Releases a semaphore. Safe to call from interrupt context.
pub fn eos_semaphore_give(id: SemaphoreId) {
    semaphore::eos_semaphore_give(id);
}

/// Acquires a semaphore, blocking the calling task if it was called from
/// task context and the count was exhausted. See
/// [`semaphore::eos_semaphore_take`] for the documented, non-inverted
/// success contract.
pub fn eos_semaphore_take(id: SemaphoreId) -> bool {
    semaphore::eos_semaphore_take(id, current_task(), interrupt::handler_active())
}

/// Creates a bounded queue over `buffer`. See [`queue::eos_queue_create`].
pub fn eos_queue_create(
    buffer: &'static mut [u8],
    item_count: usize,
    item_size: usize,
) -> Option<QueueId> {
    queue::eos_queue_create(buffer, item_count, item_size)
}

/// Enqueues one item, blocking the calling task if called from task context
/// and the queue was full.
pub fn eos_queue_give(id: QueueId, item: &[u8]) -> bool {
    queue::eos_queue_give(id, item, current_task(), interrupt::handler_active())
}

/// Dequeues one item, blocking the calling task if called from task context
/// and the queue was empty.
pub fn eos_queue_take(id: QueueId, item: &mut [u8]) -> bool {
    queue::eos_queue_take(id, item, current_task(), interrupt::handler_active())
}

/// Releases a queue's descriptor slot. See [`queue::eos_queue_destroy`] for
/// the documented semaphore-leak limitation this preserves.
pub fn eos_queue_destroy(id: QueueId) {
    queue::eos_queue_destroy(id);
}

/// Installs `entry_point` as the handler for `service`.
pub fn eos_handler_install(service: u8, priority: u8, entry_point: EntryPoint, data: *mut ()) {
    interrupt::eos_handler_install(service, priority, entry_point, data);
}

/// Removes the handler installed for `service`, if any.
pub fn eos_handler_remove(service: u8) {
    interrupt::eos_handler_remove(service);
}

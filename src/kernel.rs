//! The kernel singleton: task pool, scheduler, semaphore and queue pools,
//! tied together behind one `static mut` the way the original kernel's
//! `kernel_s` struct does.
//!
//! Every mutation that can race with an interrupt (enqueuing a woken task,
//! bumping the ISR nesting counter, touching `active_task`) happens inside
//! a [`critical_section::with`] block, following
//! `oxidecomputer-hubris/sys/userlib/src/critical_section.rs`'s precedent
//! for a single-core, no-threads kernel.

use crate::config::{N_QUEUES, N_SEMAPHORES, N_TASK};
use crate::error::{ErrorKind, Hooks, NoopHooks};
use crate::port::{self, Port};
use crate::queue::QueueDescriptor;
use crate::scheduler::Scheduler;
use crate::semaphore::SemaphoreDescriptor;
use crate::task::{TaskDescriptor, TaskId, TaskState};

/// Stack storage for every task, including the idle task's, laid out
/// contiguously like the original's `eos_task_stacks` array.
#[repr(align(8))]
pub(crate) struct StackPool(pub(crate) [[u8; crate::config::STACK_SZ]; N_TASK + 1]);

pub(crate) struct Kernel {
    pub(crate) tasks: [TaskDescriptor; N_TASK + 1],
    pub(crate) stacks: StackPool,
    pub(crate) last_created: u8,
    pub(crate) active_task: Option<TaskId>,
    pub(crate) scheduler: Scheduler,
    pub(crate) semaphores: [Option<SemaphoreDescriptor>; N_SEMAPHORES],
    pub(crate) queues: [Option<QueueDescriptor>; N_QUEUES],
    pub(crate) hooks: &'static dyn Hooks,
    pub(crate) started: bool,
}

const TASK_INIT: TaskDescriptor = TaskDescriptor::new();
const SEM_INIT: Option<SemaphoreDescriptor> = None;
const QUEUE_INIT: Option<QueueDescriptor> = None;

impl Kernel {
    const fn new() -> Self {
        Kernel {
            tasks: [TASK_INIT; N_TASK + 1],
            stacks: StackPool([[0; crate::config::STACK_SZ]; N_TASK + 1]),
            last_created: 0,
            active_task: None,
            scheduler: Scheduler::new(),
            semaphores: [SEM_INIT; N_SEMAPHORES],
            queues: [QUEUE_INIT; N_QUEUES],
            hooks: &NoopHooks,
            started: false,
        }
    }

    pub(crate) fn task_mut(&mut self, id: TaskId) -> &mut TaskDescriptor {
        &mut self.tasks[id.index()]
    }

    pub(crate) fn task(&self, id: TaskId) -> &TaskDescriptor {
        &self.tasks[id.index()]
    }

    /// Reports an error through the installed hooks.
    pub(crate) fn report(&self, error: ErrorKind) {
        self.hooks.on_error(error);
    }

    /// Finds the first free task descriptor, not counting the idle slot.
    pub(crate) fn allocate_task(&mut self) -> Option<TaskId> {
        if (self.last_created as usize) < N_TASK {
            let id = TaskId(self.last_created);
            self.last_created += 1;
            Some(id)
        } else {
            None
        }
    }

    /// Changes a task's state, enqueuing it onto the scheduler if it just
    /// became ready. The idle task only ever transitions between `Ready`
    /// and `Running`, mirroring the original `TaskSetState`'s special case
    /// for `kernel->background`.
    pub(crate) fn set_task_state(&mut self, id: TaskId, state: TaskState) {
        if self.task(id).state == state {
            return;
        }
        if id.is_idle() {
            if matches!(state, TaskState::Ready | TaskState::Running) {
                self.task_mut(id).state = state;
            }
            return;
        }
        self.task_mut(id).state = state;
        if state == TaskState::Ready && self.started {
            let priority = self.task(id).priority;
            self.scheduler.enqueue(&mut self.tasks, id, priority);
        }
    }

    /// Runs the scheduler and records the result as the active task,
    /// marking it `Running`.
    pub(crate) fn schedule(&mut self) -> TaskId {
        let next = self.scheduler.schedule(&mut self.tasks);
        self.active_task = Some(next);
        self.set_task_state(next, TaskState::Running);
        next
    }

    /// Requests a reschedule at the next opportunity via the pendable trap.
    pub(crate) fn scheduling_required(&self) {
        if self.started {
            port::current().request_pendable_trap();
        }
    }
}

static mut KERNEL: Kernel = Kernel::new();

/// Runs `f` with exclusive access to the kernel singleton inside a
/// critical section, masking interrupts for the duration.
pub(crate) fn with_kernel<R>(f: impl FnOnce(&mut Kernel) -> R) -> R {
    critical_section::with(|_| {
        // SAFETY: the critical section excludes interrupt handlers, and no
        // other code outside this module touches KERNEL directly.
        let kernel = unsafe { &mut *core::ptr::addr_of_mut!(KERNEL) };
        f(kernel)
    })
}

/// Resets the kernel singleton to its just-booted state: empty task,
/// semaphore and queue pools, no active task, default hooks.
///
/// There is no hardware equivalent to this on a real target, which simply
/// reboots; it exists so the test suite can run many independent scenarios
/// against the one process-wide singleton, the same role
/// `TaskManager::reset_task_manager` serves in the teacher's own tests.
pub fn reset() {
    with_kernel(|kernel| *kernel = Kernel::new());
}

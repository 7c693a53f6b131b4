//! Task descriptors and the state machine that drives them.
//!
//! A task is identified by a [`TaskId`], an index into the kernel's fixed
//! task pool. The idle task lives outside that pool (it is never returned
//! by [`crate::api::eos_task_create`] and never competes for a descriptor
//! slot) but is still addressed with the same [`TaskId`] type so the
//! scheduler and the ready/waiting queues can treat it uniformly.

use crate::config::N_TASK;
use crate::port::StackPointer;

/// Index of a task in the kernel's task pool, or the idle task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskId(pub(crate) u8);

impl TaskId {
    /// The idle task. Never created through [`crate::api::eos_task_create`];
    /// the kernel brings it up itself in [`crate::api::eos_start_scheduler`].
    pub const IDLE: TaskId = TaskId(N_TASK as u8);

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn is_idle(self) -> bool {
        self.0 as usize == N_TASK
    }
}

/// A task's position in its lifecycle.
///
/// `Creating` is the pool-slot-not-yet-used state a descriptor starts in and
/// the state a task function's return sends it back to; it never competes
/// for scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Creating,
    Ready,
    Waiting,
    Running,
}

/// A single task's descriptor.
///
/// `next` links this task into exactly one intrusive FIFO at a time: a
/// scheduler ready queue while `Ready`, a semaphore waiter list while
/// `Waiting`, or neither while `Running` or `Creating`. The same field
/// serves both roles because a task is never in two lists simultaneously.
pub struct TaskDescriptor {
    pub(crate) state: TaskState,
    pub(crate) stack_pointer: StackPointer,
    pub(crate) wait_ticks: u32,
    pub(crate) priority: u8,
    pub(crate) next: Option<TaskId>,
}

impl TaskDescriptor {
    pub(crate) const fn new() -> Self {
        TaskDescriptor {
            state: TaskState::Creating,
            stack_pointer: core::ptr::null_mut(),
            wait_ticks: 0,
            priority: 0,
            next: None,
        }
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }
}

/// Appends `task` to the tail of the FIFO rooted at `head`.
pub(crate) fn enqueue(pool: &mut [TaskDescriptor], head: &mut Option<TaskId>, task: TaskId) {
    match *head {
        None => *head = Some(task),
        Some(first) => {
            let mut cursor = first;
            while let Some(next) = pool[cursor.index()].next {
                cursor = next;
            }
            pool[cursor.index()].next = Some(task);
        }
    }
}

/// Pops the task at the front of the FIFO rooted at `head`, updating `head`
/// to point at the following task. Returns `None` if the FIFO was empty.
pub(crate) fn pop_front(pool: &mut [TaskDescriptor], head: &mut Option<TaskId>) -> Option<TaskId> {
    let front = *head;
    if let Some(id) = front {
        let next = pool[id.index()].next;
        pool[id.index()].next = None;
        *head = next;
    }
    front
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> [TaskDescriptor; N_TASK] {
        [TASK_INIT; N_TASK]
    }

    const TASK_INIT: TaskDescriptor = TaskDescriptor::new();

    #[test]
    fn dequeue_on_empty_head_returns_none() {
        let mut pool = pool();
        let mut head: Option<TaskId> = None;
        assert!(pop_front(&mut pool, &mut head).is_none());
        assert!(head.is_none());
    }

    #[test]
    fn enqueue_dequeue_is_fifo() {
        let mut pool = pool();
        let mut head: Option<TaskId> = None;
        enqueue(&mut pool, &mut head, TaskId(0));
        enqueue(&mut pool, &mut head, TaskId(1));
        enqueue(&mut pool, &mut head, TaskId(2));

        assert_eq!(pop_front(&mut pool, &mut head), Some(TaskId(0)));
        assert_eq!(pop_front(&mut pool, &mut head), Some(TaskId(1)));
        assert_eq!(pop_front(&mut pool, &mut head), Some(TaskId(2)));
        assert_eq!(pop_front(&mut pool, &mut head), None);
    }

    #[test]
    fn dequeue_clears_next_link() {
        let mut pool = pool();
        let mut head: Option<TaskId> = None;
        enqueue(&mut pool, &mut head, TaskId(0));
        enqueue(&mut pool, &mut head, TaskId(1));

        pop_front(&mut pool, &mut head);
        assert!(pool[0].next.is_none(), "a dequeued task must not keep its old next-link");
    }

    #[test]
    fn a_task_is_never_linked_into_two_queues_at_once() {
        let mut pool = pool();
        let mut ready: Option<TaskId> = None;
        let mut waiters: Option<TaskId> = None;

        enqueue(&mut pool, &mut ready, TaskId(0));
        let dequeued = pop_front(&mut pool, &mut ready).unwrap();
        enqueue(&mut pool, &mut waiters, dequeued);

        assert!(ready.is_none());
        assert_eq!(waiters, Some(TaskId(0)));
    }
}

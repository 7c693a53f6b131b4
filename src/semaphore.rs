//! Counting semaphores with a FIFO wait list.
//!
//! A semaphore either holds a non-negative count or, once that count has
//! been exhausted, a list of tasks blocked on [`eos_semaphore_take`]. The
//! two are mutually exclusive exactly as in the original: `value` only ever
//! goes positive once `waiting` is empty.

use crate::error::ErrorKind;
use crate::kernel::with_kernel;
use crate::task::{self, TaskId, TaskState};

/// Index of a semaphore in the kernel's semaphore pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemaphoreId(pub(crate) u8);

pub(crate) struct SemaphoreDescriptor {
    pub(crate) value: i32,
    pub(crate) waiting: Option<TaskId>,
}

/// Creates a semaphore with the given initial count. Returns `None` if the
/// semaphore pool is full, after reporting [`ErrorKind::CreatingSemaphore`].
pub fn eos_semaphore_create(initial_value: i32) -> Option<SemaphoreId> {
    let id = with_kernel(|kernel| {
        let slot = kernel.semaphores.iter().position(|s| s.is_none());
        if let Some(index) = slot {
            kernel.semaphores[index] = Some(SemaphoreDescriptor {
                value: initial_value,
                waiting: None,
            });
            Some(SemaphoreId(index as u8))
        } else {
            None
        }
    });
    if id.is_none() {
        with_kernel(|kernel| kernel.report(ErrorKind::CreatingSemaphore));
    }
    id
}

/// Releases one count, or wakes the longest-waiting task if any are
/// blocked. Safe to call from interrupt context.
pub fn eos_semaphore_give(id: SemaphoreId) {
    with_kernel(|kernel| {
        let sem = kernel.semaphores[id.0 as usize]
            .as_mut()
            .expect("give on a destroyed or never-created semaphore");
        if let Some(task) = task::pop_front(&mut kernel.tasks, &mut sem.waiting) {
            kernel.set_task_state(task, TaskState::Ready);
            kernel.scheduling_required();
        } else {
            sem.value += 1;
        }
    });
}

/// Attempts to acquire one count.
///
/// If the caller is a task and the count is exhausted, the task blocks:
/// this returns `true` once the task is woken by a matching
/// [`eos_semaphore_give`]. If the caller is an interrupt handler, blocking
/// is impossible; this returns `false` immediately and reports
/// [`ErrorKind::TakingSemaphore`].
///
/// This is the documented, non-inverted contract: `true` always means the
/// semaphore was acquired.
pub fn eos_semaphore_take(id: SemaphoreId, caller: TaskId, in_handler: bool) -> bool {
    let acquired = with_kernel(|kernel| {
        let sem = kernel.semaphores[id.0 as usize]
            .as_mut()
            .expect("take on a destroyed or never-created semaphore");
        if sem.value > 0 {
            sem.value -= 1;
            true
        } else if in_handler {
            false
        } else {
            task::enqueue(&mut kernel.tasks, &mut sem.waiting, caller);
            kernel.set_task_state(caller, TaskState::Waiting);
            kernel.scheduling_required();
            true
        }
    });
    if !acquired {
        with_kernel(|kernel| kernel.report(ErrorKind::TakingSemaphore));
    }
    acquired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{self, with_kernel};
    use sequential_test::sequential;

    fn make_task(priority: u8) -> TaskId {
        with_kernel(|kernel| {
            let id = kernel.allocate_task().expect("task pool exhausted in test");
            kernel.task_mut(id).priority = priority;
            kernel.set_task_state(id, TaskState::Ready);
            id
        })
    }

    #[test]
    #[sequential]
    fn take_decrements_a_positive_value_without_blocking() {
        kernel::reset();
        let sem = eos_semaphore_create(1).unwrap();
        let caller = make_task(0);

        assert!(eos_semaphore_take(sem, caller, false));
        assert_eq!(with_kernel(|kernel| kernel.task(caller).state), TaskState::Ready);
    }

    #[test]
    #[sequential]
    fn take_from_a_task_on_an_empty_semaphore_blocks_the_caller() {
        kernel::reset();
        let sem = eos_semaphore_create(0).unwrap();
        let caller = make_task(0);

        assert!(eos_semaphore_take(sem, caller, false));
        assert_eq!(with_kernel(|kernel| kernel.task(caller).state), TaskState::Waiting);
    }

    #[test]
    #[sequential]
    fn take_from_an_isr_on_an_empty_semaphore_returns_false_and_does_not_block() {
        kernel::reset();
        let sem = eos_semaphore_create(0).unwrap();
        let caller = make_task(0);

        assert!(!eos_semaphore_take(sem, caller, true));
        assert_eq!(with_kernel(|kernel| kernel.task(caller).state), TaskState::Ready);
    }

    #[test]
    #[sequential]
    fn give_wakes_the_longest_waiting_task_first() {
        kernel::reset();
        let sem = eos_semaphore_create(0).unwrap();
        let a = make_task(1);
        let b = make_task(1);

        assert!(eos_semaphore_take(sem, a, false));
        assert!(eos_semaphore_take(sem, b, false));

        eos_semaphore_give(sem);
        assert_eq!(with_kernel(|kernel| kernel.task(a).state), TaskState::Ready);
        assert_eq!(with_kernel(|kernel| kernel.task(b).state), TaskState::Waiting);

        eos_semaphore_give(sem);
        assert_eq!(with_kernel(|kernel| kernel.task(b).state), TaskState::Ready);
    }

    #[test]
    #[sequential]
    fn give_on_a_semaphore_with_no_waiters_increments_its_value() {
        kernel::reset();
        let sem = eos_semaphore_create(0).unwrap();
        eos_semaphore_give(sem);

        let caller = make_task(0);
        assert!(eos_semaphore_take(sem, caller, true));
    }

    #[test]
    #[sequential]
    fn value_positive_implies_waiter_list_empty() {
        kernel::reset();
        let sem = eos_semaphore_create(3).unwrap();
        with_kernel(|kernel| {
            let sem = kernel.semaphores[sem.0 as usize].as_ref().unwrap();
            assert!(sem.value > 0);
            assert!(sem.waiting.is_none());
        });
    }
}

#[cfg(test)]
mod semaphore_tests {
    use eos_kernel::kernel;
    use eos_kernel::semaphore::{eos_semaphore_create, eos_semaphore_give, eos_semaphore_take};
    use eos_kernel::task::TaskState;
    use eos_kernel::{eos_task_create, eos_task_state};
    use sequential_test::sequential;

    extern "C" fn dummy_entry(_data: *mut ()) {}

    #[test]
    #[sequential]
    fn semaphore_create_fails_once_the_pool_is_exhausted() {
        kernel::reset();
        let mut created = 0;
        while eos_semaphore_create(0).is_some() {
            created += 1;
            if created > 256 {
                panic!("eos_semaphore_create never reported pool exhaustion");
            }
        }
        assert!(eos_semaphore_create(0).is_none());
    }

    /// Scenario 2 from the spec: a task blocks on an empty semaphore, an
    /// interrupt handler gives it, and on return the task is ready.
    #[test]
    #[sequential]
    fn semaphore_handoff_from_an_isr_wakes_the_blocked_task() {
        kernel::reset();
        let sem = eos_semaphore_create(0).unwrap();
        let task_a = eos_task_create(dummy_entry, core::ptr::null_mut(), 1).unwrap();

        // Task A blocks on the empty semaphore.
        assert!(eos_semaphore_take(sem, task_a, false));
        assert_eq!(eos_task_state(task_a), TaskState::Waiting);

        // An ISR gives the semaphore.
        eos_semaphore_give(sem);

        assert_eq!(eos_task_state(task_a), TaskState::Ready);
    }

    #[test]
    #[sequential]
    fn two_waiters_are_released_strictly_fifo() {
        kernel::reset();
        let sem = eos_semaphore_create(0).unwrap();
        let task_a = eos_task_create(dummy_entry, core::ptr::null_mut(), 1).unwrap();
        let task_b = eos_task_create(dummy_entry, core::ptr::null_mut(), 1).unwrap();

        assert!(eos_semaphore_take(sem, task_a, false));
        assert!(eos_semaphore_take(sem, task_b, false));

        eos_semaphore_give(sem);
        assert_eq!(eos_task_state(task_a), TaskState::Ready);
        assert_eq!(eos_task_state(task_b), TaskState::Waiting);

        eos_semaphore_give(sem);
        assert_eq!(eos_task_state(task_b), TaskState::Ready);
    }

    #[test]
    #[sequential]
    fn take_from_an_isr_on_an_empty_semaphore_does_not_block_anyone() {
        kernel::reset();
        let sem = eos_semaphore_create(0).unwrap();
        let task_a = eos_task_create(dummy_entry, core::ptr::null_mut(), 1).unwrap();

        assert!(!eos_semaphore_take(sem, task_a, true));
        assert_eq!(eos_task_state(task_a), TaskState::Ready);
    }
}

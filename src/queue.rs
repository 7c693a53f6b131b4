//! Bounded queues built from two semaphores.
//!
//! A queue is a ring buffer over a caller-supplied byte buffer, guarded by
//! a `full` semaphore (counts free slots) and an `empty` semaphore (counts
//! filled slots) exactly as the original `colas.c` builds them from
//! `semaforos.c`. `eos_queue_give` takes `full` before writing and gives
//! `empty` after; `eos_queue_take` is the mirror image.
//!
//! The original's `QueueGive`/`QueueTake` invert the semaphore take's
//! success condition (`if (!result)` treats failure as the copy-succeeded
//! branch): a documented bug in `colas.c`. This module implements the
//! non-inverted, documented contract instead: `true` means the element was
//! copied.

use crate::error::ErrorKind;
use crate::kernel::with_kernel;
use crate::semaphore::{self, SemaphoreId};
use crate::task::TaskId;

/// Index of a queue in the kernel's queue pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueId(pub(crate) u8);

pub(crate) struct QueueDescriptor {
    buffer: &'static mut [u8],
    item_size: usize,
    item_count: usize,
    give_index: usize,
    take_index: usize,
    full: SemaphoreId,
    empty: SemaphoreId,
}

/// Creates a queue over `buffer`, which must be at least
/// `item_count * item_size` bytes. Returns `None`, after reporting
/// [`ErrorKind::CreatingQueue`], if the queue pool is full or the two
/// backing semaphores could not be allocated.
pub fn eos_queue_create(
    buffer: &'static mut [u8],
    item_count: usize,
    item_size: usize,
) -> Option<QueueId> {
    assert!(
        buffer.len() >= item_count * item_size,
        "queue buffer too small for item_count * item_size"
    );

    let slot = with_kernel(|kernel| kernel.queues.iter().position(|q| q.is_none()));
    let id = slot.and_then(|index| {
        let full = semaphore::eos_semaphore_create(item_count as i32)?;
        let empty = semaphore::eos_semaphore_create(0)?;
        with_kernel(|kernel| {
            kernel.queues[index] = Some(QueueDescriptor {
                buffer,
                item_size,
                item_count,
                give_index: 0,
                take_index: 0,
                full,
                empty,
            });
        });
        Some(QueueId(index as u8))
    });
    if id.is_none() {
        with_kernel(|kernel| kernel.report(ErrorKind::CreatingQueue));
    }
    id
}

/// Copies `item` into the queue if there is a free slot.
///
/// Returns `true` on success. From task context, a full queue blocks the
/// caller until a slot frees up. From interrupt context a full queue
/// returns `false` immediately rather than blocking.
pub fn eos_queue_give(id: QueueId, item: &[u8], caller: TaskId, in_handler: bool) -> bool {
    let (full, empty, item_size) = with_kernel(|kernel| {
        let queue = kernel.queues[id.0 as usize]
            .as_ref()
            .expect("give on a destroyed or never-created queue");
        (queue.full, queue.empty, queue.item_size)
    });
    debug_assert_eq!(item.len(), item_size);

    if !semaphore::eos_semaphore_take(full, caller, in_handler) {
        return false;
    }

    with_kernel(|kernel| {
        let queue = kernel.queues[id.0 as usize].as_mut().unwrap();
        let at = queue.give_index * queue.item_size;
        queue.buffer[at..at + queue.item_size].copy_from_slice(item);
        queue.give_index = (queue.give_index + 1) % queue.item_count;
    });

    semaphore::eos_semaphore_give(empty);
    true
}

/// Copies the oldest queued item into `item` if one is available.
///
/// Returns `true` on success. From task context, an empty queue blocks the
/// caller until an item is given. From interrupt context an empty queue
/// returns `false` immediately rather than blocking.
pub fn eos_queue_take(id: QueueId, item: &mut [u8], caller: TaskId, in_handler: bool) -> bool {
    let (full, empty, item_size) = with_kernel(|kernel| {
        let queue = kernel.queues[id.0 as usize]
            .as_ref()
            .expect("take on a destroyed or never-created queue");
        (queue.full, queue.empty, queue.item_size)
    });
    debug_assert_eq!(item.len(), item_size);

    if !semaphore::eos_semaphore_take(empty, caller, in_handler) {
        return false;
    }

    with_kernel(|kernel| {
        let queue = kernel.queues[id.0 as usize].as_mut().unwrap();
        let at = queue.take_index * queue.item_size;
        item.copy_from_slice(&queue.buffer[at..at + queue.item_size]);
        queue.take_index = (queue.take_index + 1) % queue.item_count;
    });

    semaphore::eos_semaphore_give(full);
    true
}

/// Releases the queue's descriptor slot.
///
/// The two semaphores it created are not released: the semaphore pool has
/// no destructor (see `DESIGN.md`), matching the original's
/// `QueueDestroy`, which only zeroes the queue's own descriptor.
pub fn eos_queue_destroy(id: QueueId) {
    with_kernel(|kernel| {
        kernel.queues[id.0 as usize] = None;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{self, with_kernel};
    use sequential_test::sequential;

    fn make_task() -> TaskId {
        with_kernel(|kernel| {
            let id = kernel.allocate_task().expect("task pool exhausted in test");
            kernel.set_task_state(id, crate::task::TaskState::Ready);
            id
        })
    }

    #[test]
    #[sequential]
    fn give_then_take_round_trips_elements_in_order() {
        kernel::reset();
        static mut BUF: [u8; 4] = [0; 4];
        let buffer: &'static mut [u8] = unsafe { &mut *core::ptr::addr_of_mut!(BUF) };
        let queue = eos_queue_create(buffer, 4, 1).unwrap();
        let caller = make_task();

        for value in [1u8, 2, 3, 4] {
            assert!(eos_queue_give(queue, &[value], caller, false));
        }
        for expected in [1u8, 2, 3, 4] {
            let mut out = [0u8; 1];
            assert!(eos_queue_take(queue, &mut out, caller, false));
            assert_eq!(out[0], expected);
        }
    }

    #[test]
    #[sequential]
    fn give_from_an_isr_on_a_full_queue_returns_false_and_leaves_the_queue_unchanged() {
        kernel::reset();
        static mut BUF: [u8; 4] = [0; 4];
        let buffer: &'static mut [u8] = unsafe { &mut *core::ptr::addr_of_mut!(BUF) };
        let queue = eos_queue_create(buffer, 4, 1).unwrap();
        let caller = make_task();

        for value in [1u8, 2, 3, 4] {
            assert!(eos_queue_give(queue, &[value], caller, true));
        }
        assert!(!eos_queue_give(queue, &[5], caller, true));

        let mut out = [0u8; 1];
        assert!(eos_queue_take(queue, &mut out, caller, false));
        assert_eq!(out[0], 1, "the rejected give must not have touched the buffer");
    }

    #[test]
    #[sequential]
    fn take_from_an_isr_on_an_empty_queue_returns_false() {
        kernel::reset();
        static mut BUF: [u8; 2] = [0; 2];
        let buffer: &'static mut [u8] = unsafe { &mut *core::ptr::addr_of_mut!(BUF) };
        let queue = eos_queue_create(buffer, 2, 1).unwrap();
        let caller = make_task();

        let mut out = [0u8; 1];
        assert!(!eos_queue_take(queue, &mut out, caller, true));
    }

    #[test]
    #[sequential]
    fn give_from_a_task_on_a_full_queue_blocks_instead_of_failing() {
        kernel::reset();
        static mut BUF: [u8; 1] = [0; 1];
        let buffer: &'static mut [u8] = unsafe { &mut *core::ptr::addr_of_mut!(BUF) };
        let queue = eos_queue_create(buffer, 1, 1).unwrap();
        let caller = make_task();

        assert!(eos_queue_give(queue, &[9], caller, false));
        // The queue is now full; a task-context give must block rather than
        // report failure (only the ISR path may report `false`).
        assert!(eos_queue_give(queue, &[10], caller, false));
        assert_eq!(
            with_kernel(|kernel| kernel.task(caller).state),
            crate::task::TaskState::Waiting
        );
    }

    #[test]
    #[sequential]
    fn destroy_frees_the_descriptor_slot_for_reuse() {
        kernel::reset();
        static mut BUF: [u8; 2] = [0; 2];
        let buffer: &'static mut [u8] = unsafe { &mut *core::ptr::addr_of_mut!(BUF) };
        let queue = eos_queue_create(buffer, 2, 1).unwrap();
        eos_queue_destroy(queue);

        assert!(with_kernel(|kernel| kernel.queues[queue.0 as usize].is_none()));
    }
}

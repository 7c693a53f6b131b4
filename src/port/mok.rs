//! Software port used by the test suite and by any host build.
//!
//! There is no real processor to switch stacks on, so [`Mok::restore`]
//! cannot actually transfer control anywhere; it exists so the rest of the
//! kernel compiles and links against a concrete [`Port`] the same way a
//! hardware port would. Tests exercise the scheduler, task and
//! synchronization logic directly through the kernel's internal functions
//! rather than through a real trap-driven context switch, the same
//! limitation `oxidecomputer-hubris`'s `arch::fake` port documents for its
//! own `start_first_task`.

use super::{EntryPoint, Port, StackPointer};

/// A port that performs no real architecture work. Every method is either a
/// no-op or returns a placeholder value.
#[derive(Clone, Copy, Default)]
pub struct Mok;

impl Mok {
    pub fn new() -> Self {
        Mok
    }
}

impl Port for Mok {
    fn prepare_initial_frame(
        &self,
        stack: &mut [u8],
        _entry: EntryPoint,
        _arg: *mut (),
        _on_return: EntryPoint,
    ) -> StackPointer {
        // No real frame is written; the returned pointer only needs to be a
        // valid, distinguishable placeholder for bookkeeping in tests.
        stack.as_mut_ptr()
    }

    unsafe fn restore(&self, _sp: StackPointer) -> ! {
        panic!("mok port cannot resume a task context on the host");
    }

    fn setup_tick_timer(&self) {}

    fn setup_pendable_trap(&self) {}

    fn request_pendable_trap(&self) {}

    fn wait_for_interrupt(&self) {
        core::hint::spin_loop();
    }
}

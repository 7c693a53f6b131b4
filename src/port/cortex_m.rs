//! Sketch of a real Cortex-M port.
//!
//! Never exercised by the test suite (host tests build against
//! [`super::mok`]); this module exists to show the shape a production port
//! fills in, following the same `setup_interrupt` / `save_ctx` / `load_ctx`
//! split the teacher's Xtensa port used for its own preemption support.
//! Register offsets below match the original kernel's `PendSV_Handler` and
//! `RetoreContext` assembly: `r4`-`r11` and `lr` saved manually, the rest
//! saved automatically by the exception entry.

use super::{EntryPoint, Port, StackPointer};

#[repr(C)]
struct ManualContext {
    r4: u32,
    r5: u32,
    r6: u32,
    r7: u32,
    r8: u32,
    r9: u32,
    r10: u32,
    r11: u32,
    lr: u32,
}

#[repr(C)]
struct AutoContext {
    r0: u32,
    r1: u32,
    r2: u32,
    r3: u32,
    r12: u32,
    lr: u32,
    pc: u32,
    xpsr: u32,
}

/// Exception-return code selecting thread mode, process stack, no FPU frame.
const EXC_RETURN_THREAD_PSP: u32 = 0xFFFF_FFFD;
/// Default xPSR: Thumb bit set, no exception active.
const DEFAULT_XPSR: u32 = 0x0100_0000;

#[derive(Clone, Copy, Default)]
pub struct CortexM;

impl CortexM {
    pub fn new() -> Self {
        CortexM
    }
}

impl Port for CortexM {
    fn prepare_initial_frame(
        &self,
        stack: &mut [u8],
        entry: EntryPoint,
        arg: *mut (),
        on_return: EntryPoint,
    ) -> StackPointer {
        let top = unsafe { stack.as_mut_ptr().add(stack.len()) };
        let frame_size = core::mem::size_of::<ManualContext>() + core::mem::size_of::<AutoContext>();
        let sp = unsafe { top.sub(frame_size) } as *mut u8;

        unsafe {
            let auto_ctx = sp.add(core::mem::size_of::<ManualContext>()) as *mut AutoContext;
            (*auto_ctx).r0 = arg as u32;
            (*auto_ctx).r1 = 0;
            (*auto_ctx).r2 = 0;
            (*auto_ctx).r3 = 0;
            (*auto_ctx).r12 = 0;
            (*auto_ctx).lr = on_return as usize as u32;
            (*auto_ctx).pc = entry as usize as u32;
            (*auto_ctx).xpsr = DEFAULT_XPSR;

            let manual_ctx = sp as *mut ManualContext;
            (*manual_ctx).lr = EXC_RETURN_THREAD_PSP;
        }
        sp
    }

    unsafe fn restore(&self, sp: StackPointer) -> ! {
        // On real hardware this loads r4-r11/lr from `sp`, writes it to PSP,
        // drops to unprivileged thread mode and branches to `lr`. Left
        // unimplemented here: this module is a structural reference, not a
        // target this crate is built for in this exercise.
        let _ = sp;
        unreachable!("cortex-m port is a structural sketch, not wired to a real target")
    }

    fn setup_tick_timer(&self) {
        // Program SysTick for crate::config::TICK_PERIOD_US and set its
        // priority below the pendable trap, as the original kernel's
        // StartScheduler does with SysTick_Config/NVIC_SetPriority.
    }

    fn setup_pendable_trap(&self) {
        // Set PendSV to the lowest exception priority.
    }

    fn request_pendable_trap(&self) {
        // Set SCB->ICSR's PENDSVSET bit.
    }

    fn wait_for_interrupt(&self) {
        cortex_m::asm::wfi();
    }
}

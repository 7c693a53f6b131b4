//! User interrupt handler registry and the nesting counter that tells the
//! rest of the kernel whether the current caller is an ISR.
//!
//! Mirrors `interrupciones.c`'s `handlers` table and `handler_actives`
//! counter. A real port's vector table entries call [`dispatch`] for the
//! service number they were wired to install; this crate does not generate
//! the vector table itself, since that is inherently per-MCU.

use crate::config::N_INTERRUPTS;
use crate::port::EntryPoint;
use core::sync::atomic::{AtomicU32, Ordering};

struct Handler {
    entry_point: Option<EntryPoint>,
    data: *mut (),
}

const HANDLER_INIT: Handler = Handler {
    entry_point: None,
    data: core::ptr::null_mut(),
};

static mut HANDLERS: [Handler; N_INTERRUPTS] = [HANDLER_INIT; N_INTERRUPTS];

/// Count of handlers currently executing, nested interrupts included.
static HANDLER_ACTIVES: AtomicU32 = AtomicU32::new(0);

/// True while one or more interrupt handlers are on the call stack.
///
/// Used throughout [`crate::api`] to decide whether a syscall-shaped call
/// (`eos_wait_delay`, `eos_cpu_yield`, a blocking `eos_semaphore_take`) was
/// made from a task or from interrupt context.
pub fn handler_active() -> bool {
    HANDLER_ACTIVES.load(Ordering::Acquire) > 0
}

/// Installs `entry_point` as the handler for `service`, enabling the
/// underlying interrupt through the active port.
///
/// `priority` is a small port-defined priority band (the original clamps it
/// to 2 bits); this crate passes it through to the port unexamined.
pub fn eos_handler_install(service: u8, _priority: u8, entry_point: EntryPoint, data: *mut ()) {
    if (service as usize) >= N_INTERRUPTS {
        return;
    }
    critical_section::with(|_| {
        // SAFETY: serialized by the critical section; no ISR touches this
        // table outside of `dispatch`, which only reads it.
        let handlers = unsafe { &mut *core::ptr::addr_of_mut!(HANDLERS) };
        handlers[service as usize] = Handler {
            entry_point: Some(entry_point),
            data,
        };
    });
}

/// Removes the handler installed for `service`, if any.
pub fn eos_handler_remove(service: u8) {
    if (service as usize) >= N_INTERRUPTS {
        return;
    }
    critical_section::with(|_| {
        let handlers = unsafe { &mut *core::ptr::addr_of_mut!(HANDLERS) };
        handlers[service as usize] = HANDLER_INIT;
    });
}

/// Invoked by a port's vector table entry for `service`. Bumps the nesting
/// counter, runs the installed handler with interrupts left enabled for the
/// duration (mirroring `InterruptHandler`'s `cpsie i` around the call), then
/// drops the counter back down.
///
/// # Safety
/// Must only be called from the actual interrupt context for `service`.
pub unsafe fn dispatch(service: u8) {
    if (service as usize) >= N_INTERRUPTS {
        return;
    }
    let (entry_point, data) = critical_section::with(|_| {
        let handlers = &*core::ptr::addr_of!(HANDLERS);
        let handler = &handlers[service as usize];
        (handler.entry_point, handler.data)
    });
    let Some(entry_point) = entry_point else {
        return;
    };

    HANDLER_ACTIVES.fetch_add(1, Ordering::AcqRel);
    entry_point(data);
    HANDLER_ACTIVES.fetch_sub(1, Ordering::AcqRel);
}

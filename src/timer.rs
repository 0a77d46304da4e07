// Self-rescheduling timeouts with an explicit cancellation handle.
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::Window;

use crate::error::MountError;

/// Shared flag; every clone observes the same cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle(Rc<Cell<bool>>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

type TickCell = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Runs `tick` after `first_delay_ms`, then every `period_ms`, rescheduling
/// itself with `setTimeout` after each run until cancelled.
pub struct RepeatingTimeout {
    cancel: CancelHandle,
    pending: Rc<Cell<Option<i32>>>,
    closure: TickCell,
}

impl RepeatingTimeout {
    pub fn start(
        window: &Window,
        first_delay_ms: i32,
        period_ms: i32,
        mut tick: impl FnMut() + 'static,
    ) -> Result<Self, MountError> {
        let cancel = CancelHandle::new();
        let pending = Rc::new(Cell::new(None));
        let closure: TickCell = Rc::new(RefCell::new(None));
        {
            let cancel = cancel.clone();
            let pending = pending.clone();
            let closure_self = closure.clone();
            let window = window.clone();
            *closure.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                pending.set(None);
                if cancel.is_cancelled() {
                    return;
                }
                tick();
                if cancel.is_cancelled() {
                    return;
                }
                if let Some(cb) = closure_self.borrow().as_ref() {
                    match window.set_timeout_with_callback_and_timeout_and_arguments_0(
                        cb.as_ref().unchecked_ref(),
                        period_ms,
                    ) {
                        Ok(id) => pending.set(Some(id)),
                        Err(e) => log::warn!("particle timer reschedule failed: {:?}", e),
                    }
                }
            }) as Box<dyn FnMut()>));
        }
        let id = {
            let cell = closure.borrow();
            let cb = cell.as_ref().ok_or(MountError::Listener("timeout"))?;
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    cb.as_ref().unchecked_ref(),
                    first_delay_ms,
                )
                .map_err(|_| MountError::Listener("timeout"))?
        };
        pending.set(Some(id));
        Ok(Self {
            cancel,
            pending,
            closure,
        })
    }

    /// Clears the pending timeout and releases the closure.
    pub fn cancel(&self, window: &Window) {
        self.cancel.cancel();
        if let Some(id) = self.pending.take() {
            window.clear_timeout_with_handle(id);
        }
        self.closure.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_shared_and_sticky() {
        let a = CancelHandle::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
        a.cancel();
        assert!(a.is_cancelled());
    }

    #[test]
    fn independent_handles_do_not_interfere() {
        let a = CancelHandle::new();
        let b = CancelHandle::new();
        a.cancel();
        assert!(!b.is_cancelled());
    }
}

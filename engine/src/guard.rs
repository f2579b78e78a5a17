//! Scoped exclusive-execution guard for settlement-critical entry points.
//!
//! Settlement, refund, and withdrawal each take the lock for the duration
//! of the call. Release happens in `Drop`, so every exit path, including
//! early error returns, leaves the lock free.

use std::cell::Cell;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("exclusive call lock already held")]
pub struct LockHeld;

/// Single-writer lock shared by the guarded entry points of one `Layer`.
#[derive(Clone, Default)]
pub struct CallLock {
    held: Rc<Cell<bool>>,
}

impl CallLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock, failing if a guarded call is already executing.
    pub fn acquire(&self) -> Result<CallGuard, LockHeld> {
        if self.held.get() {
            return Err(LockHeld);
        }
        self.held.set(true);
        Ok(CallGuard {
            held: self.held.clone(),
        })
    }

    pub fn is_held(&self) -> bool {
        self.held.get()
    }
}

/// RAII token proving exclusive entry; dropping it releases the lock.
#[derive(Debug)]
pub struct CallGuard {
    held: Rc<Cell<bool>>,
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        self.held.set(false);
    }
}

//! Platform abstraction layer
//!
//! The core never reads the wall clock directly. Every timestamp comes from a
//! `Clock` handed to the store, so hosts use `SystemClock` and tests drive a
//! `ManualClock`.

use std::cell::Cell;
use std::rc::Rc;

/// Millisecond time source
pub trait Clock {
    /// Current time in milliseconds
    fn now_ms(&self) -> f64;
}

/// Wall clock: `Date.now()` in the browser, `SystemTime` on native
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> f64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// Hand-driven clock. Clones share the same reading, so a test can keep one
/// handle and give the other to the store.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

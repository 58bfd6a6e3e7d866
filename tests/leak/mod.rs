//! Drop tracking for integration tests.
//!
//! A [`Drops`] counter hands out [`Tracked`] payloads. Each `Tracked` bumps the
//! counter exactly once when it is dropped, which lets tests assert that a
//! payload shared by many `SharedPtr`s is destroyed exactly once, and when.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Initialize logging for a test binary. Safe to call from every test.
pub fn init() {
    let _ = env_logger::Builder::from_env("SHAREDPTR_LOG")
        .is_test(true)
        .try_init();
}

#[derive(Debug, Default, Clone)]
pub struct Drops {
    count: Arc<AtomicUsize>,
}

impl Drops {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track<T>(&self, value: T) -> Tracked<T> {
        Tracked {
            value,
            drops: Arc::clone(&self.count),
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct Tracked<T> {
    pub value: T,
    drops: Arc<AtomicUsize>,
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        let prev = self.drops.fetch_add(1, Ordering::SeqCst);
        log::trace!("tracked payload dropped, {} drops so far", prev + 1);
    }
}

use std::sync::atomic::{AtomicU64, Ordering};

pub struct AtomicMetrics {
    initiated: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    products_created: AtomicU64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self {
            initiated: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            products_created: AtomicU64::new(0),
        }
    }

    pub fn increment_initiated(&self) {
        self.initiated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_products_created(&self) {
        self.products_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_initiated(&self) -> u64 {
        self.initiated.load(Ordering::Relaxed)
    }

    pub fn get_completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn get_failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn get_products_created(&self) -> u64 {
        self.products_created.load(Ordering::Relaxed)
    }
}

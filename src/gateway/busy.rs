use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-wide busy flag raised while any gateway call is in flight.
#[derive(Debug, Clone, Default)]
pub struct BusyIndicator {
    in_flight: Arc<AtomicUsize>,
}

impl BusyIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag until the returned guard is dropped.
    #[must_use = "the indicator is lowered as soon as the guard is dropped"]
    pub fn enter(&self) -> BusyGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        BusyGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Lowers the busy flag on drop, whatever way the call ended.
#[derive(Debug)]
pub struct BusyGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_lowers_the_flag_on_drop() {
        let busy = BusyIndicator::new();
        assert!(!busy.is_busy());

        let first = busy.enter();
        let second = busy.clone().enter();
        assert_eq!(busy.in_flight(), 2);

        drop(first);
        assert!(busy.is_busy());
        drop(second);
        assert!(!busy.is_busy());
    }
}

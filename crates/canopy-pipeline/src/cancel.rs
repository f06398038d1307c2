//! A cooperative cancellation signal (spec §5: "every pipeline operation
//! accepts a context-style cancel signal"). Checked between files during
//! extraction and resolution rather than mid-file, so a cancelled run always
//! leaves the store at a file-granularity-consistent point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable, shareable flag. Cloning shares the same underlying flag —
/// call [`CancelSignal::cancel`] on any clone to stop every pipeline call
/// that was handed one.
#[derive(Clone, Default)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_flag() {
        let signal = CancelSignal::new();
        let clone = signal.clone();
        assert!(!clone.is_cancelled());
        signal.cancel();
        assert!(clone.is_cancelled());
    }
}

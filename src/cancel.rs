use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Held by a view for as long as it is mounted. Results that resolve after
/// `cancel` are dropped instead of being applied.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_cancellation() {
        let token = CancelToken::new();
        let view = token.clone();
        assert!(!view.is_cancelled());
        token.cancel();
        assert!(view.is_cancelled());
    }
}

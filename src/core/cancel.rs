use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Operator-abort flag. The controller checks it at safe boundaries only
/// (before a listing page, between articles), so a cancelled run still
/// finishes the article in flight and keeps everything collected so far.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

use crate::query::LookupQuery;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared flag that a request polls while it waits for the network.
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

/// Holds the token of the request currently running, if any. Each request
/// gets a fresh token, so cancelling one never affects the next.
#[derive(Debug, Clone, Default)]
pub struct CancelSlot {
    current: Arc<Mutex<Option<CancelToken>>>,
}

impl CancelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<CancelToken>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store and return a fresh token for a new request.
    pub fn install(&self) -> CancelToken {
        let token = CancelToken::new();
        *self.lock() = Some(token.clone());
        token
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    /// Cancel the running request. Returns false when nothing was running.
    pub fn cancel_current(&self) -> bool {
        match self.lock().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

/// The one outstanding lookup of a session.
#[derive(Debug, Clone)]
pub struct RequestHandle {
    pub id: u64,
    pub query: LookupQuery,
    pub token: CancelToken,
}

impl RequestHandle {
    pub fn new(id: u64, query: LookupQuery, token: CancelToken) -> Self {
        Self { id, query, token }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let query = LookupQuery::parse("110001").unwrap();
        let handle = RequestHandle::new(1, query, token.clone());
        assert!(!handle.is_cancelled());
        token.cancel();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn slot_hands_out_fresh_tokens() {
        let slot = CancelSlot::new();
        let first = slot.install();
        assert!(slot.cancel_current());
        assert!(first.is_cancelled());

        let second = slot.install();
        assert!(!second.is_cancelled());
    }

    #[test]
    fn cancel_without_request_is_a_no_op() {
        let slot = CancelSlot::new();
        assert!(!slot.cancel_current());
        let token = slot.install();
        slot.clear();
        assert!(!slot.cancel_current());
        assert!(!token.is_cancelled());
    }
}

use super::query_cache::Shared;
use crate::core::PageKey;
use std::sync::Weak;

/// RAII handle that unregisters a snapshot listener on drop.
#[must_use = "dropping the subscription unregisters the listener"]
#[derive(Debug)]
pub struct Subscription {
    shared: Weak<Shared>,
    key: PageKey,
    listener_id: u64,
}

impl Subscription {
    pub(crate) fn new(shared: Weak<Shared>, key: PageKey, listener_id: u64) -> Self {
        Self {
            shared,
            key,
            listener_id,
        }
    }

    pub fn key(&self) -> PageKey {
        self.key
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.unsubscribe(self.key, self.listener_id);
        }
    }
}

use std::sync::{
    Arc, Mutex, Weak,
    atomic::{AtomicU64, Ordering},
};

use crate::{config::model::SlideshowConfig, foundation::sync::lock};

type ChangeHandler = dyn Fn(&SlideshowConfig) + Send + Sync;

#[derive(Clone)]
/// In-process configuration provider with synchronous change notification.
///
/// This is the reference implementation of the environment's settings store:
/// it holds the current [`SlideshowConfig`] and notifies subscribed handlers
/// on every [`ConfigProvider::set`]. Host applications with their own
/// settings plumbing can skip it and call
/// [`crate::SlideshowTimer::apply_config`] directly.
///
/// Cloning shares the underlying store.
pub struct ConfigProvider {
    inner: Arc<ProviderInner>,
}

struct ProviderInner {
    current: Mutex<SlideshowConfig>,
    handlers: Mutex<Vec<(u64, Arc<ChangeHandler>)>>,
    next_handler_id: AtomicU64,
}

impl ConfigProvider {
    /// Create a provider holding `initial` as the current configuration.
    pub fn new(initial: SlideshowConfig) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                current: Mutex::new(initial),
                handlers: Mutex::new(Vec::new()),
                next_handler_id: AtomicU64::new(0),
            }),
        }
    }

    /// Snapshot of the current configuration.
    pub fn get(&self) -> SlideshowConfig {
        lock(&self.inner.current).clone()
    }

    /// Replace the current configuration and synchronously notify subscribers.
    ///
    /// Handlers run on the calling thread, after the new value is installed
    /// and outside the provider's locks, so they may call back into the
    /// provider.
    pub fn set(&self, config: SlideshowConfig) {
        *lock(&self.inner.current) = config.clone();
        let handlers: Vec<Arc<ChangeHandler>> = lock(&self.inner.handlers)
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(&config);
        }
    }

    /// Register `handler` for configuration changes.
    ///
    /// The handler stays registered exactly as long as the returned guard is
    /// alive.
    pub fn subscribe(
        &self,
        handler: impl Fn(&SlideshowConfig) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.inner.next_handler_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.handlers).push((id, Arc::new(handler)));
        Subscription {
            provider: Arc::downgrade(&self.inner),
            id,
        }
    }
}

/// RAII guard for a [`ConfigProvider`] subscription.
///
/// Dropping the guard unregisters the handler, so a torn-down consumer cannot
/// leak a callback into a long-lived provider.
#[must_use = "dropping the subscription unregisters the handler"]
pub struct Subscription {
    provider: Weak<ProviderInner>,
    id: u64,
}

impl Subscription {
    /// Unregister the handler now (equivalent to dropping the guard).
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.provider.upgrade() {
            lock(&inner.handlers).retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/provider.rs"]
mod tests;

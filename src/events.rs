/*!
 * Event channels for translation lifecycle notifications.
 *
 * This module provides:
 * - `EventChannel<T>`: a registry of handlers with token-based subscription
 * - `ScopedSubscription`: an RAII guard that unsubscribes when dropped
 * - `TranslationEvents`: the three named channels a translator exposes
 *
 * Handlers are invoked after the registry lock is released, so a handler may
 * freely emit on other channels or take the project content lock. A handler
 * must not subscribe to or unsubscribe from the channel it is registered
 * with while being invoked.
 */

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Opaque handle identifying one subscription on one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionToken(u64);

/// A single named event channel with dynamic subscribe/unsubscribe
pub struct EventChannel<T> {
    handlers: Mutex<Vec<(u64, Handler<T>)>>,
    next_token: AtomicU64,
}

impl<T> Default for EventChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventChannel<T> {
    /// Create an empty channel
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
            next_token: AtomicU64::new(1),
        }
    }

    /// Register a handler and return a token that can cancel it
    pub fn subscribe(&self, handler: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionToken {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.handlers.lock().push((token, Arc::new(handler)));
        SubscriptionToken(token)
    }

    /// Remove a subscription; returns false if the token was already removed
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        let mut handlers = self.handlers.lock();
        let before = handlers.len();
        handlers.retain(|(id, _)| *id != token.0);
        handlers.len() < before
    }

    /// Register a handler that is unsubscribed when the returned guard drops
    pub fn subscribe_scoped(
        &self,
        handler: impl Fn(&T) + Send + Sync + 'static,
    ) -> ScopedSubscription<'_, T> {
        let token = self.subscribe(handler);
        ScopedSubscription { channel: self, token }
    }

    /// Invoke every registered handler with the event
    pub fn emit(&self, event: &T) {
        // Snapshot the handler list so emission happens without the lock held
        let handlers: Vec<Handler<T>> = self
            .handlers
            .lock()
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();

        for handler in handlers {
            handler(event);
        }
    }

    /// Number of currently registered handlers
    pub fn handler_count(&self) -> usize {
        self.handlers.lock().len()
    }
}

/// RAII subscription guard; unsubscribes on every exit path
pub struct ScopedSubscription<'a, T> {
    channel: &'a EventChannel<T>,
    token: SubscriptionToken,
}

impl<T> Drop for ScopedSubscription<'_, T> {
    fn drop(&mut self) {
        self.channel.unsubscribe(self.token);
    }
}

/// Fired when a translator has finished preprocessing the subtitles
#[derive(Debug, Clone)]
pub struct PreprocessedEvent {
    /// Number of scenes after preprocessing
    pub scene_count: usize,
    /// Total number of lines queued for translation
    pub line_count: usize,
}

/// Fired when a translator has completed one batch
#[derive(Debug, Clone)]
pub struct BatchTranslatedEvent {
    /// Scene the batch belongs to
    pub scene_number: usize,
    /// Batch number within the scene
    pub batch_number: usize,
    /// Lines translated in the batch
    pub line_count: usize,
}

/// Fired when a translator has completed a whole scene
#[derive(Debug, Clone)]
pub struct SceneTranslatedEvent {
    /// The completed scene
    pub scene_number: usize,
    /// Lines translated in the scene
    pub line_count: usize,
}

/// The translation lifecycle event set: exactly three named channels
#[derive(Default)]
pub struct TranslationEvents {
    /// Preprocessing finished
    pub preprocessed: EventChannel<PreprocessedEvent>,
    /// One batch translated
    pub batch_translated: EventChannel<BatchTranslatedEvent>,
    /// One scene translated
    pub scene_translated: EventChannel<SceneTranslatedEvent>,
}

impl TranslationEvents {
    /// Create an event set with no subscribers
    pub fn new() -> Self {
        Self::default()
    }
}

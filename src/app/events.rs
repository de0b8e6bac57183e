//! Fan-out of synchronizer state changes.
//!
//! Once the launch sequence registers for synchronizer updates, every [`SyncState`] coming
//! out of the wallet engine is dispatched to the handlers registered here. Handlers are
//! independent: progress tracking and forwarding to UI subscribers can fail without
//! affecting each other.

use crate::wallet::SyncState;
use tokio::sync::broadcast;

#[derive(Debug, thiserror::Error)]
pub enum SyncEventError {
    #[error("Handler error: {0}")]
    HandlerError(String),
}

/// Trait for handling synchronizer state changes.
#[async_trait::async_trait]
pub trait SyncEventHandler: Send + Sync {
    /// Handle a sync state change.
    async fn handle(&mut self, event: &SyncState) -> Result<(), SyncEventError>;

    /// Get the name of this handler for logging and diagnostics.
    fn name(&self) -> &'static str;
}

/// Event dispatcher that manages multiple event handlers.
///
/// Handlers are called in the order they are registered.
pub struct EventDispatcher {
    handlers: Vec<Box<dyn SyncEventHandler>>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn register_handler(&mut self, handler: Box<dyn SyncEventHandler>) {
        self.handlers.push(handler);
    }

    /// Names of the registered handlers, in dispatch order
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|handler| handler.name()).collect()
    }

    /// Dispatch an event to all registered handlers.
    ///
    /// Errors from handlers are logged, but do not stop other handlers from running.
    pub async fn dispatch(&mut self, event: &SyncState) {
        for handler in &mut self.handlers {
            if let Err(e) = handler.handle(event).await {
                tracing::error!("Handler {} failed to process event: {}", handler.name(), e);
            }
        }
    }
}

/// Forwards sync states to UI subscribers
pub struct BroadcastForwarder {
    sender: broadcast::Sender<SyncState>,
}

impl BroadcastForwarder {
    pub fn new(sender: broadcast::Sender<SyncState>) -> Self {
        Self { sender }
    }
}

#[async_trait::async_trait]
impl SyncEventHandler for BroadcastForwarder {
    async fn handle(&mut self, event: &SyncState) -> Result<(), SyncEventError> {
        // no UI subscriber yet is fine
        let _ = self.sender.send(event.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "BroadcastForwarder"
    }
}

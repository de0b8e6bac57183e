//! Application launch: state, actions, transitions and the orchestrator that runs them.

pub mod actions;
pub mod events;
pub mod orchestrator;
pub mod progress_tracker;
pub mod reducer;
pub mod retry;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use actions::{Action, DestinationAction, Effect, InitializationAction, UserAction, WalletCheck};
pub use events::{BroadcastForwarder, EventDispatcher, SyncEventError, SyncEventHandler};
pub use orchestrator::{Collaborators, LaunchOrchestrator};
pub use progress_tracker::{ProgressTrackingHandler, SyncProgressTracker, SyncStats};
pub use retry::{KeychainRetryPolicy, MAX_KEYCHAIN_READ_RETRIES, RetryDecision};
pub use state::{
    AlertState, AppSnapshot, Destination, DestinationState, InitializationState,
    PhraseDisplayState, RootState,
};

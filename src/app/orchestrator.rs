//! Launch orchestrator and integration point for all wallet collaborators.
//!
//! This module defines the `LaunchOrchestrator`, which runs the launch state machine from
//! `DidFinishLaunching` to exactly one terminal outcome: onboarding, recovery phrase backup,
//! the main tabs, or a fatal failure.
//!
//! The orchestrator is responsible for:
//! - Serializing every transition onto a single action queue
//! - Interpreting the effects returned by [`reduce`] against the injected collaborators
//! - Converting collaborator errors into initialization states and alerts
//! - Publishing a read-only [`AppSnapshot`] after every transition
//! - Owning the background subscription to synchronizer updates
//!
//! Collaborators are passed in through [`Collaborators`], so tests can swap any of them.

use crate::app::actions::{Action, Effect, InitializationAction, UserAction, WalletCheck};
use crate::app::events::{BroadcastForwarder, EventDispatcher};
use crate::app::progress_tracker::{ProgressTrackingHandler, SyncProgressTracker, SyncStats};
use crate::app::reducer::reduce;
use crate::app::retry::KeychainRetryPolicy;
use crate::app::state::{AppSnapshot, RootState};
use crate::wallet::{
    CrashReporter, CredentialStore, DatabaseFiles, InitializationMode, SyncState, WalletEngine,
    WalletRecord,
};

use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Capacity of the channel fanning sync states out to UI subscribers
const SYNC_UPDATES_CAPACITY: usize = 64;

/// Collaborators the launch sequence talks to
#[derive(Clone)]
pub struct Collaborators {
    pub credential_store: Arc<dyn CredentialStore>,
    pub database_files: Arc<dyn DatabaseFiles>,
    pub wallet_engine: Arc<dyn WalletEngine>,
    pub crash_reporter: Arc<dyn CrashReporter>,
}

/// Runs the launch state machine on a single logical timeline.
///
/// All writes go through [`LaunchOrchestrator::launch`] and [`LaunchOrchestrator::send`];
/// both take `&mut self`, so no two transitions ever run concurrently.
pub struct LaunchOrchestrator {
    collaborators: Collaborators,
    retry_policy: KeychainRetryPolicy,
    state: RootState,
    queue: VecDeque<Action>,
    history: Vec<Action>,
    snapshot_tx: watch::Sender<AppSnapshot>,
    sync_updates: broadcast::Sender<SyncState>,
    progress_tracker: Arc<Mutex<SyncProgressTracker>>,
    sync_task: Option<JoinHandle<()>>,
}

impl LaunchOrchestrator {
    pub fn new(collaborators: Collaborators, state: RootState, retry_policy: KeychainRetryPolicy) -> Self {
        let (snapshot_tx, _) = watch::channel(AppSnapshot::from(&state));
        let (sync_updates, _) = broadcast::channel(SYNC_UPDATES_CAPACITY);

        Self {
            collaborators,
            retry_policy,
            state,
            queue: VecDeque::new(),
            history: Vec::new(),
            snapshot_tx,
            sync_updates,
            progress_tracker: Arc::new(Mutex::new(SyncProgressTracker::new())),
            sync_task: None,
        }
    }

    /// Run the launch sequence until it settles and return the resulting snapshot.
    pub async fn launch(&mut self) -> AppSnapshot {
        info!("Starting launch sequence on {}", self.state.network);
        self.process(InitializationAction::DidFinishLaunching.into()).await;
        let snapshot = self.snapshot();
        info!(
            "Launch sequence settled: state={}, destination={:?}, alert={:?}",
            snapshot.initialization_state,
            snapshot.destination_state.internal_destination,
            snapshot.alert.as_ref().map(|alert| alert.title())
        );
        snapshot
    }

    /// Handle an action coming from the UI layer.
    pub async fn send(&mut self, action: UserAction) -> AppSnapshot {
        debug!("Received user action {:?}", action);
        self.process(action.into()).await;
        self.snapshot()
    }

    /// Receiver for the state published after each transition
    pub fn subscribe(&self) -> watch::Receiver<AppSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Receiver for synchronizer updates forwarded after registration
    pub fn subscribe_sync_updates(&self) -> broadcast::Receiver<SyncState> {
        self.sync_updates.subscribe()
    }

    pub fn snapshot(&self) -> AppSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn state(&self) -> &RootState {
        &self.state
    }

    /// Every action processed so far, in order
    pub fn history(&self) -> &[Action] {
        &self.history
    }

    pub fn sync_stats(&self) -> Option<SyncStats> {
        self.progress_tracker
            .lock()
            .ok()
            .map(|tracker| tracker.get_stats())
    }

    async fn process(&mut self, action: Action) {
        self.queue.push_back(action);

        while let Some(action) = self.queue.pop_front() {
            debug!("Processing {:?}", action);
            let effects = reduce(&mut self.state, &action, &self.retry_policy);
            self.history.push(action);
            self.snapshot_tx.send_replace(AppSnapshot::from(&self.state));

            for effect in effects {
                if let Some(next) = self.run_effect(effect).await {
                    self.queue.push_back(next);
                }
            }
        }
    }

    async fn run_effect(&mut self, effect: Effect) -> Option<Action> {
        match effect {
            Effect::Send(action) => Some(action),
            Effect::ConfigureCrashReporter => {
                if let Err(e) = self.collaborators.crash_reporter.configure() {
                    warn!("Crash reporter configuration failed: {}", e);
                }
                None
            }
            Effect::CheckWalletInitialization => {
                let check = self.check_wallet_initialization().await;
                Some(InitializationAction::RespondToWalletInitializationState(check).into())
            }
            Effect::InitializeEngine { mode, wallet } => Some(self.initialize_engine(mode, &wallet).await),
            Effect::SubscribeToSynchronizer => {
                self.register_for_synchronizer_updates();
                None
            }
            Effect::PersistBackupConfirmation => {
                let action = match self
                    .collaborators
                    .credential_store
                    .mark_user_passed_phrase_backup_test(true)
                    .await
                {
                    Ok(()) => {
                        info!("Recovery phrase backup confirmed");
                        InitializationAction::BackupConfirmationPersisted
                    }
                    Err(e) => {
                        error!("Failed to store backup confirmation: {}", e);
                        InitializationAction::BackupConfirmationFailed(e.to_string())
                    }
                };
                Some(action.into())
            }
        }
    }

    /// Classify the wallet from database presence and the credential store.
    async fn check_wallet_initialization(&self) -> WalletCheck {
        let network = self.state.network;
        let (db_files_present, keys_present) = tokio::join!(
            self.collaborators.database_files.are_db_files_present_for(network),
            self.collaborators.credential_store.are_keys_present()
        );
        debug!(
            "Wallet check on {}: db files present={}, keys present={}",
            network, db_files_present, keys_present
        );

        if !keys_present {
            return if db_files_present {
                WalletCheck::KeysMissing
            } else {
                WalletCheck::Uninitialized
            };
        }

        match self.collaborators.credential_store.export_wallet_record().await {
            Ok(wallet) => {
                let mode = if db_files_present {
                    InitializationMode::ExistingWallet
                } else {
                    InitializationMode::RestoreWallet
                };
                WalletCheck::Initialized {
                    mode,
                    wallet: Box::new(wallet),
                }
            }
            Err(e) => {
                warn!("Stored keys could not be exported: {}", e);
                WalletCheck::KeysMissing
            }
        }
    }

    async fn initialize_engine(&self, mode: InitializationMode, wallet: &WalletRecord) -> Action {
        match self.collaborators.wallet_engine.initialize(mode, wallet).await {
            Ok(()) => {
                info!(
                    "Wallet engine initialized ({:?}) from birthday {}",
                    mode,
                    wallet.birthday.height()
                );
                InitializationAction::CheckBackupPhraseValidation.into()
            }
            Err(e) => {
                error!("Wallet engine initialization failed: {}", e);
                InitializationAction::InitializationFailed(e.to_string()).into()
            }
        }
    }

    /// Subscribe once to the engine state stream for the rest of the session.
    ///
    /// Failures are logged only.
    fn register_for_synchronizer_updates(&mut self) {
        if self.sync_task.is_some() {
            debug!("Synchronizer subscription already running");
            return;
        }

        let mut stream = match self.collaborators.wallet_engine.subscribe() {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Failed to register for synchronizer updates: {}", e);
                return;
            }
        };

        let mut dispatcher = EventDispatcher::new();
        dispatcher.register_handler(Box::new(ProgressTrackingHandler::new(
            self.progress_tracker.clone(),
        )));
        dispatcher.register_handler(Box::new(BroadcastForwarder::new(self.sync_updates.clone())));
        let handlers = dispatcher.handler_names();

        self.sync_task = Some(tokio::spawn(async move {
            while let Some(state) = stream.next().await {
                dispatcher.dispatch(&state).await;
            }
            info!("Synchronizer update stream ended");
        }));
        info!("Registered for synchronizer updates with handlers {:?}", handlers);
    }
}

impl Drop for LaunchOrchestrator {
    fn drop(&mut self) {
        if let Some(handle) = self.sync_task.take() {
            handle.abort();
        }
    }
}

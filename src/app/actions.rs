//! Actions processed by the launch orchestrator and the effects they request.

use crate::app::state::{Destination, InitializationState};
use crate::wallet::{InitializationMode, WalletRecord};

/// Result of querying the database presence check and the credential store
#[derive(Debug, Clone, PartialEq)]
pub enum WalletCheck {
    Uninitialized,
    KeysMissing,
    Initialized {
        mode: InitializationMode,
        wallet: Box<WalletRecord>,
    },
}

impl WalletCheck {
    pub fn state(&self) -> InitializationState {
        match self {
            WalletCheck::Uninitialized => InitializationState::Uninitialized,
            WalletCheck::KeysMissing => InitializationState::KeysMissing,
            WalletCheck::Initialized { .. } => InitializationState::Initialized,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InitializationAction {
    DidFinishLaunching,
    InitialSetups,
    ConfigureCrashReporter,
    CheckWalletInitialization,
    RespondToWalletInitializationState(WalletCheck),
    RetryKeychainRead(InitializationState),
    /// Bring up the wallet engine with the record the wallet check loaded
    InitializeSdk {
        mode: InitializationMode,
        wallet: Box<WalletRecord>,
    },
    InitializationFailed(String),
    CheckBackupPhraseValidation,
    InitializationSuccessfullyDone,
    RegisterForSynchronizersUpdate,
    PhraseBackupConfirmed,
    BackupConfirmationPersisted,
    BackupConfirmationFailed(String),
    AlertDismissed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DestinationAction {
    UpdateDestination(Destination),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Initialization(InitializationAction),
    Destination(DestinationAction),
}

impl Action {
    pub fn update_destination(destination: Destination) -> Self {
        Action::Destination(DestinationAction::UpdateDestination(destination))
    }
}

impl From<InitializationAction> for Action {
    fn from(action: InitializationAction) -> Self {
        Action::Initialization(action)
    }
}

/// Actions the UI layer is allowed to send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    PhraseBackupConfirmed,
    AlertDismissed,
    RegisterForSynchronizersUpdate,
}

impl From<UserAction> for Action {
    fn from(action: UserAction) -> Self {
        let action = match action {
            UserAction::PhraseBackupConfirmed => InitializationAction::PhraseBackupConfirmed,
            UserAction::AlertDismissed => InitializationAction::AlertDismissed,
            UserAction::RegisterForSynchronizersUpdate => {
                InitializationAction::RegisterForSynchronizersUpdate
            }
        };
        Action::Initialization(action)
    }
}

/// Follow-up work returned by the transition function.
///
/// Effects run in order; `Send` queues an action behind the ones already waiting.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send(Action),
    ConfigureCrashReporter,
    CheckWalletInitialization,
    InitializeEngine {
        mode: InitializationMode,
        wallet: Box<WalletRecord>,
    },
    SubscribeToSynchronizer,
    PersistBackupConfirmation,
}

impl Effect {
    pub fn send(action: impl Into<Action>) -> Self {
        Effect::Send(action.into())
    }
}

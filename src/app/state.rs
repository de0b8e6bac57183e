//! State owned by the launch orchestrator.
//!
//! Everything in here is mutated only by the transition function in
//! [`reducer`](crate::app::reducer). The UI reads it through [`AppSnapshot`].

use crate::wallet::{Birthday, NetworkType, RedactableString, WalletRecord};
use std::fmt;

/// Outcome of the wallet initialization check
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InitializationState {
    #[default]
    Uninitialized,
    KeysMissing,
    Initialized,
    Failed(String),
}

impl fmt::Display for InitializationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitializationState::Uninitialized => f.write_str("uninitialized"),
            InitializationState::KeysMissing => f.write_str("keysMissing"),
            InitializationState::Initialized => f.write_str("initialized"),
            InitializationState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Top level screens the application can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Destination {
    #[default]
    Welcome,
    Onboarding,
    PhraseDisplay,
    Tabs,
}

/// Current screen plus the one shown right before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DestinationState {
    pub previous_destination: Destination,
    pub internal_destination: Destination,
}

impl DestinationState {
    pub fn destination(&self) -> Destination {
        self.internal_destination
    }

    /// Move to `destination`, remembering the screen being left.
    pub fn update(&mut self, destination: Destination) {
        self.previous_destination = self.internal_destination;
        self.internal_destination = destination;
    }
}

/// Payload for the recovery phrase backup screen
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhraseDisplayState {
    pub phrase: Vec<RedactableString>,
    /// Text field for the birthday, starts empty
    pub birthday_value: String,
    pub birthday: Option<Birthday>,
}

impl PhraseDisplayState {
    pub fn for_wallet(wallet: &WalletRecord) -> Self {
        Self {
            phrase: wallet.seed_phrase.words(),
            birthday_value: String::new(),
            birthday: Some(wallet.birthday),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.phrase.is_empty()
    }
}

/// User-facing alerts raised by the launch sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertState {
    /// Wallet state could not be resolved, e.g. keys missing after all retries
    WalletStateFailed(InitializationState),
    /// Wallet engine failed to start
    InitializationFailed(String),
    /// The backup confirmation could not be stored
    BackupConfirmationFailed(String),
}

impl AlertState {
    pub fn title(&self) -> &'static str {
        match self {
            AlertState::WalletStateFailed(_) => "Wallet state failed",
            AlertState::InitializationFailed(_) => "Failed to initialize the wallet",
            AlertState::BackupConfirmationFailed(_) => "Failed to confirm the backup",
        }
    }

    pub fn message(&self) -> String {
        match self {
            AlertState::WalletStateFailed(state) => {
                format!("App initialization state: {}", state)
            }
            AlertState::InitializationFailed(reason)
            | AlertState::BackupConfirmationFailed(reason) => reason.clone(),
        }
    }
}

/// Full orchestrator state for one app session
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RootState {
    pub app_initialization_state: InitializationState,
    pub destination_state: DestinationState,
    pub alert: Option<AlertState>,
    pub keychain_read_retries: u32,
    pub network: NetworkType,
    pub phrase_display_state: PhraseDisplayState,
    pub stored_wallet: Option<WalletRecord>,
    pub is_registered_for_sync_updates: bool,
    /// Set by the first `DidFinishLaunching`, the launch sequence runs once per session
    pub has_launched: bool,
}

impl RootState {
    pub fn new(network: NetworkType) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    /// Whether the loaded wallet still has to go through the backup confirmation
    pub fn is_backup_confirmation_required(&self) -> bool {
        self.stored_wallet
            .as_ref()
            .is_some_and(|wallet| !wallet.has_user_passed_phrase_backup_test)
    }
}

/// Read-only view of the orchestrator state published to the UI
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppSnapshot {
    pub initialization_state: InitializationState,
    pub destination_state: DestinationState,
    pub alert: Option<AlertState>,
    pub phrase_display: PhraseDisplayState,
    pub keychain_read_retries: u32,
}

impl From<&RootState> for AppSnapshot {
    fn from(state: &RootState) -> Self {
        Self {
            initialization_state: state.app_initialization_state.clone(),
            destination_state: state.destination_state,
            alert: state.alert.clone(),
            phrase_display: state.phrase_display_state.clone(),
            keychain_read_retries: state.keychain_read_retries,
        }
    }
}

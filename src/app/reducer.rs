//! Transition function of the launch state machine.
//!
//! `reduce` is pure: it mutates [`RootState`] and describes the follow-up work as a list of
//! [`Effect`]s. Talking to collaborators is left to the orchestrator executor, which runs
//! the effects in order and feeds their results back as new actions.

use crate::app::actions::{Action, DestinationAction, Effect, InitializationAction, WalletCheck};
use crate::app::retry::{KeychainRetryPolicy, RetryDecision};
use crate::app::router;
use crate::app::state::{AlertState, InitializationState, PhraseDisplayState, RootState};
use tracing::{debug, info, warn};

pub fn reduce(state: &mut RootState, action: &Action, retry_policy: &KeychainRetryPolicy) -> Vec<Effect> {
    match action {
        Action::Initialization(action) => reduce_initialization(state, action, retry_policy),
        Action::Destination(DestinationAction::UpdateDestination(destination)) => {
            state.destination_state.update(*destination);
            info!(
                "Destination changed from {:?} to {:?}",
                state.destination_state.previous_destination, destination
            );
            Vec::new()
        }
    }
}

fn reduce_initialization(
    state: &mut RootState,
    action: &InitializationAction,
    retry_policy: &KeychainRetryPolicy,
) -> Vec<Effect> {
    use InitializationAction::*;

    match action {
        DidFinishLaunching => {
            if state.has_launched {
                warn!("Launch sequence already ran, ignoring");
                return Vec::new();
            }
            state.has_launched = true;
            vec![Effect::send(InitialSetups)]
        }

        InitialSetups => vec![Effect::send(ConfigureCrashReporter)],

        ConfigureCrashReporter => vec![
            Effect::ConfigureCrashReporter,
            Effect::send(CheckWalletInitialization),
        ],

        CheckWalletInitialization => vec![Effect::CheckWalletInitialization],

        RespondToWalletInitializationState(check) => {
            info!("Wallet initialization check answered {}", check.state());
            respond_to_wallet_check(state, check)
        }

        RetryKeychainRead(reason) => {
            match retry_policy.decide(&mut state.keychain_read_retries) {
                RetryDecision::Retry { attempt } => {
                    warn!(
                        "Wallet state {}, retrying keychain read ({}/{})",
                        reason,
                        attempt,
                        retry_policy.max_retries()
                    );
                    vec![Effect::send(CheckWalletInitialization)]
                }
                RetryDecision::Exhausted { attempts } => {
                    warn!("Wallet state {} after {} retries, giving up", reason, attempts);
                    state.alert = Some(AlertState::WalletStateFailed(reason.clone()));
                    route_to(reason, false)
                }
            }
        }

        InitializeSdk { mode, wallet } => {
            state.stored_wallet = Some(wallet.as_ref().clone());
            vec![Effect::InitializeEngine {
                mode: *mode,
                wallet: wallet.clone(),
            }]
        }

        InitializationFailed(reason) => {
            state.app_initialization_state = InitializationState::Failed(reason.clone());
            state.alert = Some(AlertState::InitializationFailed(reason.clone()));
            Vec::new()
        }

        CheckBackupPhraseValidation => {
            let Some(wallet) = &state.stored_wallet else {
                return vec![Effect::send(InitializationFailed(
                    "Wallet record not loaded".to_string(),
                ))];
            };

            state.app_initialization_state = InitializationState::Initialized;
            if !wallet.has_user_passed_phrase_backup_test {
                debug!("Recovery phrase backup not confirmed yet");
                state.phrase_display_state = PhraseDisplayState::for_wallet(wallet);
            }
            vec![Effect::send(InitializationSuccessfullyDone)]
        }

        InitializationSuccessfullyDone => {
            let mut effects = vec![Effect::send(RegisterForSynchronizersUpdate)];
            effects.extend(route_to(
                &state.app_initialization_state,
                state.is_backup_confirmation_required(),
            ));
            effects
        }

        RegisterForSynchronizersUpdate => {
            if state.is_registered_for_sync_updates {
                debug!("Already registered for synchronizer updates");
                return Vec::new();
            }
            state.is_registered_for_sync_updates = true;
            vec![Effect::SubscribeToSynchronizer]
        }

        PhraseBackupConfirmed => {
            if state.app_initialization_state != InitializationState::Initialized
                || !state.is_backup_confirmation_required()
            {
                debug!("No pending backup confirmation");
                return Vec::new();
            }
            vec![Effect::PersistBackupConfirmation]
        }

        BackupConfirmationPersisted => {
            if let Some(wallet) = state.stored_wallet.as_mut() {
                wallet.has_user_passed_phrase_backup_test = true;
            }
            state.phrase_display_state = PhraseDisplayState::default();
            route_to(&state.app_initialization_state, false)
        }

        BackupConfirmationFailed(reason) => {
            state.alert = Some(AlertState::BackupConfirmationFailed(reason.clone()));
            Vec::new()
        }

        AlertDismissed => {
            state.alert = None;
            Vec::new()
        }
    }
}

fn respond_to_wallet_check(state: &mut RootState, check: &WalletCheck) -> Vec<Effect> {
    use InitializationAction::*;

    match check {
        WalletCheck::Uninitialized => {
            state.app_initialization_state = InitializationState::Uninitialized;
            route_to(&state.app_initialization_state, false)
        }
        WalletCheck::KeysMissing => {
            state.app_initialization_state = InitializationState::KeysMissing;
            vec![Effect::send(RetryKeychainRead(InitializationState::KeysMissing))]
        }
        WalletCheck::Initialized { mode, wallet } => vec![Effect::send(InitializeSdk {
            mode: *mode,
            wallet: wallet.clone(),
        })],
    }
}

fn route_to(outcome: &InitializationState, confirmation_required: bool) -> Vec<Effect> {
    router::route(outcome, confirmation_required)
        .map(|destination| Effect::Send(Action::update_destination(destination)))
        .into_iter()
        .collect()
}

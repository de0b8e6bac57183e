//! Maps launch outcomes to the screen the user lands on.

use crate::app::state::{Destination, InitializationState};

/// Destination for a classified outcome.
///
/// `KeysMissing` is only routed once retries are exhausted and always comes with a
/// fatal alert. `Failed` keeps the current screen.
pub fn route(outcome: &InitializationState, confirmation_required: bool) -> Option<Destination> {
    match outcome {
        InitializationState::Uninitialized => Some(Destination::Onboarding),
        InitializationState::KeysMissing => Some(Destination::Tabs),
        InitializationState::Initialized if confirmation_required => {
            Some(Destination::PhraseDisplay)
        }
        InitializationState::Initialized => Some(Destination::Tabs),
        InitializationState::Failed(_) => None,
    }
}

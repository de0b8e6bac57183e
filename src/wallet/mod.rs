//! Wallet collaborators consumed by the launch orchestrator: the secure credential
//! store, the sync database presence check, the wallet engine and the crash reporter.

pub mod engine;
pub mod repositories;
pub mod types;

pub use engine::*;
pub use repositories::*;
pub use types::*;

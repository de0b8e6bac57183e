//! Wallet launch orchestration
//!
//! Decides on every start whether the wallet is new, intact, or broken, brings up the
//! wallet engine and routes the user to the right first screen.

pub mod app;
pub mod config;
pub mod scan;
pub mod wallet;

// Re-export commonly used types
pub use app::{AppSnapshot, Collaborators, LaunchOrchestrator, UserAction};
pub use config::AppConfig;

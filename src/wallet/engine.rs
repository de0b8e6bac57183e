//! Wallet engine and crash reporter collaborators.
//!
//! The wallet engine owns chain synchronization. The launch orchestrator only needs to
//! initialize it once with the loaded wallet record and then listen to its state changes.
//! `LocalSynchronizer` is an in-process engine that publishes its state over a broadcast
//! channel; it backs the binary and keeps the database layout in line with
//! [`FileDatabaseFiles`](crate::wallet::FileDatabaseFiles).

use crate::wallet::{
	Birthday, CrashReporterError, EngineInitError, FileDatabaseFiles, InitializationMode,
	NetworkType, WalletRecord,
};
use futures::StreamExt;
use futures::stream::BoxStream;
use std::path::PathBuf;
use std::sync::{Mutex, Once};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// State changes reported by the synchronizer
#[derive(Debug, Clone, PartialEq)]
pub enum SyncState {
	Unprepared,
	Syncing {
		scanned_height: u64,
		target_height: u64,
	},
	UpToDate {
		height: u64,
	},
	Stopped,
	Error(String),
}

impl SyncState {
	/// Scan progress in the `[0, 1]` range
	pub fn progress(&self) -> f32 {
		match self {
			SyncState::Syncing {
				scanned_height,
				target_height,
			} => {
				if *target_height == 0 {
					return 0.0;
				}
				(*scanned_height as f64 / *target_height as f64).min(1.0) as f32
			}
			SyncState::UpToDate { .. } => 1.0,
			_ => 0.0,
		}
	}

	/// Highest height this state reports as scanned
	pub fn scanned_height(&self) -> Option<u64> {
		match self {
			SyncState::Syncing { scanned_height, .. } => Some(*scanned_height),
			SyncState::UpToDate { height } => Some(*height),
			_ => None,
		}
	}
}

/// Infinite stream of sync states, ends only when the engine goes away
pub type SyncStateStream = BoxStream<'static, SyncState>;

/// The wallet engine / synchronizer
#[async_trait::async_trait]
pub trait WalletEngine: Send + Sync {
	/// Prepare databases and keys for the given wallet
	async fn initialize(
		&self,
		mode: InitializationMode,
		wallet: &WalletRecord,
	) -> Result<(), EngineInitError>;

	/// Subscribe to the engine state changes.
	///
	/// Each call creates an independent subscription.
	fn subscribe(&self) -> Result<SyncStateStream, EngineInitError>;
}

/// Turn a broadcast receiver into a sync state stream, skipping lagged messages.
pub fn stream_from_receiver(receiver: broadcast::Receiver<SyncState>) -> SyncStateStream {
	futures::stream::unfold(receiver, |mut receiver| async move {
		loop {
			match receiver.recv().await {
				Ok(state) => return Some((state, receiver)),
				Err(broadcast::error::RecvError::Lagged(skipped)) => {
					warn!("Sync state subscriber lagged, skipped {} updates", skipped);
				}
				Err(broadcast::error::RecvError::Closed) => return None,
			}
		}
	})
	.boxed()
}

/// In-process wallet engine
pub struct LocalSynchronizer {
	database_files: FileDatabaseFiles,
	data_dir: PathBuf,
	network: NetworkType,
	sender: broadcast::Sender<SyncState>,
	birthday: Mutex<Option<Birthday>>,
}

impl LocalSynchronizer {
	pub fn new(data_dir: PathBuf, network: NetworkType) -> Self {
		let (sender, _) = broadcast::channel(64);
		Self {
			database_files: FileDatabaseFiles::new(data_dir.clone()),
			data_dir,
			network,
			sender,
			birthday: Mutex::new(None),
		}
	}

	/// Publish a state to all current subscribers, returning how many received it
	pub fn publish(&self, state: SyncState) -> usize {
		debug!("Publishing sync state {:?}", state);
		self.sender.send(state).unwrap_or(0)
	}

	fn initialized_birthday(&self) -> Result<Option<Birthday>, EngineInitError> {
		self.birthday
			.lock()
			.map(|guard| *guard)
			.map_err(|e| EngineInitError::Synchronizer(format!("Synchronizer state poisoned: {}", e)))
	}

	/// Walk the chain from the wallet birthday up to `target_height`.
	///
	/// Stands in for a real block scanner in the demo binary.
	pub async fn simulate_scan(
		&self,
		target_height: u64,
		batch_size: u64,
		interval: Duration,
	) -> Result<(), EngineInitError> {
		let birthday = self
			.initialized_birthday()?
			.ok_or(EngineInitError::NotInitialized)?;

		let mut scanned_height = birthday.height();
		while scanned_height < target_height {
			scanned_height = scanned_height
				.saturating_add(batch_size.max(1))
				.min(target_height);
			self.publish(SyncState::Syncing {
				scanned_height,
				target_height,
			});
			tokio::time::sleep(interval).await;
		}

		self.publish(SyncState::UpToDate {
			height: target_height,
		});
		Ok(())
	}
}

#[async_trait::async_trait]
impl WalletEngine for LocalSynchronizer {
	async fn initialize(
		&self,
		mode: InitializationMode,
		wallet: &WalletRecord,
	) -> Result<(), EngineInitError> {
		tokio::fs::create_dir_all(&self.data_dir)
			.await
			.map_err(|e| {
				EngineInitError::Database(format!("Failed to create data directory: {}", e))
			})?;

		let data_db = self.database_files.data_db_path(self.network);
		match mode {
			InitializationMode::ExistingWallet => {
				let exists = tokio::fs::try_exists(&data_db).await.map_err(|e| {
					EngineInitError::Database(format!("Failed to open data database: {}", e))
				})?;
				if !exists {
					return Err(EngineInitError::Database(format!(
						"Data database {:?} is missing",
						data_db
					)));
				}
			}
			InitializationMode::RestoreWallet => {
				let metadata = serde_json::json!({
					"network": self.network.as_str(),
					"birthday": wallet.birthday.height(),
					"created_at": chrono::Utc::now().to_rfc3339(),
				});
				tokio::fs::write(&data_db, metadata.to_string())
					.await
					.map_err(|e| {
						EngineInitError::Database(format!(
							"Failed to create data database: {}",
							e
						))
					})?;
				info!("Created data database {:?} for restore", data_db);
			}
		}

		{
			let mut guard = self.birthday.lock().map_err(|e| {
				EngineInitError::Synchronizer(format!("Synchronizer state poisoned: {}", e))
			})?;
			*guard = Some(wallet.birthday);
		}

		info!(
			"Synchronizer initialized ({:?}) on {} from birthday {}",
			mode,
			self.network,
			wallet.birthday.height()
		);
		self.publish(SyncState::Unprepared);
		Ok(())
	}

	fn subscribe(&self) -> Result<SyncStateStream, EngineInitError> {
		if self.initialized_birthday()?.is_none() {
			return Err(EngineInitError::NotInitialized);
		}
		Ok(stream_from_receiver(self.sender.subscribe()))
	}
}

/// Crash reporting collaborator
pub trait CrashReporter: Send + Sync {
	fn configure(&self) -> Result<(), CrashReporterError>;
}

static PANIC_HOOK: Once = Once::new();

/// Crash reporter that routes panics into the tracing pipeline
pub struct TracingCrashReporter {
	enabled: bool,
}

impl TracingCrashReporter {
	pub fn new(enabled: bool) -> Self {
		Self { enabled }
	}
}

impl CrashReporter for TracingCrashReporter {
	fn configure(&self) -> Result<(), CrashReporterError> {
		if !self.enabled {
			info!("Crash reporting disabled");
			return Ok(());
		}

		PANIC_HOOK.call_once(|| {
			let previous = std::panic::take_hook();
			std::panic::set_hook(Box::new(move |panic_info| {
				error!(target: "crash_reporter", "Application panicked: {}", panic_info);
				previous(panic_info);
			}));
		});
		info!("Crash reporter configured");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::wallet::{MnemonicLanguage, SeedPhrase};

	fn wallet(birthday: u64) -> WalletRecord {
		WalletRecord {
			language: MnemonicLanguage::English,
			seed_phrase: SeedPhrase::new("abandon ability able"),
			version: 0,
			birthday: Birthday(birthday),
			has_user_passed_phrase_backup_test: true,
		}
	}

	#[test]
	fn test_sync_progress() {
		let syncing = SyncState::Syncing {
			scanned_height: 50,
			target_height: 200,
		};
		assert_eq!(syncing.progress(), 0.25);
		assert_eq!(SyncState::UpToDate { height: 10 }.progress(), 1.0);
		assert_eq!(SyncState::Stopped.progress(), 0.0);
		assert_eq!(
			SyncState::Syncing {
				scanned_height: 5,
				target_height: 0
			}
			.progress(),
			0.0
		);
	}

	#[tokio::test]
	async fn test_subscribe_requires_initialization() {
		let dir = tempfile::tempdir().expect("tempdir");
		let engine = LocalSynchronizer::new(dir.path().to_path_buf(), NetworkType::Testnet);
		assert!(matches!(
			engine.subscribe(),
			Err(EngineInitError::NotInitialized)
		));
	}

	#[tokio::test]
	async fn test_existing_wallet_requires_database() {
		let dir = tempfile::tempdir().expect("tempdir");
		let engine = LocalSynchronizer::new(dir.path().to_path_buf(), NetworkType::Testnet);
		let result = engine
			.initialize(InitializationMode::ExistingWallet, &wallet(0))
			.await;
		assert!(matches!(result, Err(EngineInitError::Database(_))));
	}

	#[tokio::test]
	async fn test_restore_creates_database_and_streams_scan() {
		let dir = tempfile::tempdir().expect("tempdir");
		let engine = LocalSynchronizer::new(dir.path().to_path_buf(), NetworkType::Testnet);
		engine
			.initialize(InitializationMode::RestoreWallet, &wallet(100))
			.await
			.expect("restore");
		assert!(dir.path().join("testnet_data.db").exists());

		let mut stream = engine.subscribe().expect("subscribe");
		engine
			.simulate_scan(200, 50, Duration::from_millis(0))
			.await
			.expect("scan");

		let mut states = Vec::new();
		for _ in 0..3 {
			states.push(stream.next().await.expect("state"));
		}
		assert_eq!(
			states,
			vec![
				SyncState::Syncing {
					scanned_height: 150,
					target_height: 200
				},
				SyncState::Syncing {
					scanned_height: 200,
					target_height: 200
				},
				SyncState::UpToDate { height: 200 },
			]
		);
	}

	#[test]
	fn test_disabled_crash_reporter_configures() {
		assert!(TracingCrashReporter::new(false).configure().is_ok());
	}
}

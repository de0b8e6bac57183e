use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use wallet_launch::app::{
	Collaborators, InitializationState, KeychainRetryPolicy, LaunchOrchestrator, RootState,
};
use wallet_launch::config::AppConfig;
use wallet_launch::wallet::{
	FileCredentialStore, FileDatabaseFiles, LocalSynchronizer, TracingCrashReporter,
};

const DEFAULT_CONFIG_PATH: &str = "wallet.toml";
/// Blocks above the birthday the demo scan walks to
const DEMO_SCAN_DISTANCE: u64 = 5_000;
const DEMO_SCAN_BATCH: u64 = 250;
const DEMO_SCAN_INTERVAL: Duration = Duration::from_millis(200);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
	let config_path = std::env::args()
		.nth(1)
		.unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
	let config = AppConfig::load(&config_path)
		.with_context(|| format!("Failed to load configuration from {}", config_path))?;

	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.log_level))
		.context("Invalid log level")?;
	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.init();

	info!(
		"Starting wallet on {} with data in {:?}",
		config.network, config.data_dir
	);

	let engine = Arc::new(LocalSynchronizer::new(
		config.data_dir.clone(),
		config.network,
	));
	let collaborators = Collaborators {
		credential_store: Arc::new(FileCredentialStore::new(config.data_dir.clone())),
		database_files: Arc::new(FileDatabaseFiles::new(config.data_dir.clone())),
		wallet_engine: engine.clone(),
		crash_reporter: Arc::new(TracingCrashReporter::new(config.launch.crash_reporting)),
	};

	let mut orchestrator = LaunchOrchestrator::new(
		collaborators,
		RootState::new(config.network),
		KeychainRetryPolicy::new(config.launch.max_keychain_retries),
	);
	let mut sync_updates = orchestrator.subscribe_sync_updates();

	let snapshot = orchestrator.launch().await;
	info!(
		"Landing on {:?} (previous {:?})",
		snapshot.destination_state.destination(),
		snapshot.destination_state.previous_destination
	);
	if let Some(alert) = &snapshot.alert {
		warn!("{}: {}", alert.title(), alert.message());
	}
	if !snapshot.phrase_display.is_empty() {
		info!(
			"Recovery phrase backup pending: {} words, birthday {:?}",
			snapshot.phrase_display.phrase.len(),
			snapshot.phrase_display.birthday.map(|b| b.height())
		);
	}

	if snapshot.initialization_state != InitializationState::Initialized {
		info!("Wallet is {}, nothing to sync", snapshot.initialization_state);
		return Ok(());
	}

	let birthday = orchestrator
		.state()
		.stored_wallet
		.as_ref()
		.map(|wallet| wallet.birthday.height())
		.unwrap_or_default();
	let scanner = engine.clone();
	tokio::spawn(async move {
		let target = birthday.saturating_add(DEMO_SCAN_DISTANCE);
		if let Err(e) = scanner
			.simulate_scan(target, DEMO_SCAN_BATCH, DEMO_SCAN_INTERVAL)
			.await
		{
			warn!("Scan stopped: {}", e);
		}
	});

	loop {
		tokio::select! {
			_ = tokio::signal::ctrl_c() => {
				info!("Shutting down");
				break;
			}
			update = sync_updates.recv() => match update {
				Ok(state) => info!("Sync: {:?} ({:.0}%)", state, state.progress() * 100.0),
				Err(RecvError::Lagged(skipped)) => warn!("Missed {} sync updates", skipped),
				Err(RecvError::Closed) => break,
			},
		}
	}

	if let Some(stats) = orchestrator.sync_stats() {
		info!("{}", stats.summary());
	}
	Ok(())
}

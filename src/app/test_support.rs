//! In-memory collaborators for launch sequence tests.

use crate::app::orchestrator::{Collaborators, LaunchOrchestrator};
use crate::app::retry::KeychainRetryPolicy;
use crate::app::state::RootState;
use crate::wallet::{
    Birthday, CrashReporter, CrashReporterError, CredentialStore, DatabaseFiles, EngineInitError,
    InitializationMode, MnemonicLanguage, NetworkType, SeedPhrase, SyncState, SyncStateStream,
    WalletEngine, WalletRecord, WalletStorageError, stream_from_receiver,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

pub const TEST_PHRASE: &str = "still champion voice habit trend flight survey between bitter process artefact blind carbon truly provide dizzy crush flush breeze blouse charge solid fish spread";

pub fn test_wallet(birthday: u64, has_user_passed_phrase_backup_test: bool) -> WalletRecord {
    WalletRecord {
        language: MnemonicLanguage::English,
        seed_phrase: SeedPhrase::new(TEST_PHRASE),
        version: 0,
        birthday: Birthday(birthday),
        has_user_passed_phrase_backup_test,
    }
}

/// Ordered log of collaborator calls shared by all mocks of a test
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    pub fn push(&self, call: &'static str) {
        self.0.lock().unwrap().push(call);
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct MockCredentialStore {
    wallet: Option<WalletRecord>,
    unreadable: bool,
    fail_backup_mark: bool,
    export_calls: AtomicUsize,
    marked_backup: Mutex<Option<bool>>,
    calls: CallLog,
}

impl MockCredentialStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_wallet(wallet: WalletRecord) -> Self {
        Self {
            wallet: Some(wallet),
            ..Self::default()
        }
    }

    /// Keys are present but every export fails
    pub fn unreadable() -> Self {
        Self {
            unreadable: true,
            ..Self::default()
        }
    }

    pub fn failing_backup_mark(mut self) -> Self {
        self.fail_backup_mark = true;
        self
    }

    pub fn export_calls(&self) -> usize {
        self.export_calls.load(Ordering::SeqCst)
    }

    pub fn marked_backup(&self) -> Option<bool> {
        *self.marked_backup.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl CredentialStore for MockCredentialStore {
    async fn are_keys_present(&self) -> bool {
        self.calls.push("credential_store.are_keys_present");
        self.wallet.is_some() || self.unreadable
    }

    async fn export_wallet_record(&self) -> Result<WalletRecord, WalletStorageError> {
        self.calls.push("credential_store.export_wallet_record");
        self.export_calls.fetch_add(1, Ordering::SeqCst);
        if self.unreadable {
            return Err(WalletStorageError::KeysUnreadable("decryption failed".to_string()));
        }
        self.wallet.clone().ok_or(WalletStorageError::WalletNotFound)
    }

    async fn mark_user_passed_phrase_backup_test(
        &self,
        passed: bool,
    ) -> Result<(), WalletStorageError> {
        self.calls.push("credential_store.mark_user_passed_phrase_backup_test");
        if self.fail_backup_mark {
            return Err(WalletStorageError::KeysUnreadable("store locked".to_string()));
        }
        *self.marked_backup.lock().unwrap() = Some(passed);
        Ok(())
    }
}

pub struct MockDatabaseFiles {
    present: bool,
    calls: CallLog,
}

#[async_trait::async_trait]
impl DatabaseFiles for MockDatabaseFiles {
    async fn are_db_files_present_for(&self, _network: NetworkType) -> bool {
        self.calls.push("database_files.are_db_files_present_for");
        self.present
    }
}

pub struct MockWalletEngine {
    init_error: Option<EngineInitError>,
    stream_available: bool,
    initialized_with: Mutex<Vec<(InitializationMode, Birthday)>>,
    subscribe_calls: AtomicUsize,
    sender: broadcast::Sender<SyncState>,
    calls: CallLog,
}

impl Default for MockWalletEngine {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self {
            init_error: None,
            stream_available: true,
            initialized_with: Mutex::new(Vec::new()),
            subscribe_calls: AtomicUsize::new(0),
            sender,
            calls: CallLog::default(),
        }
    }
}

impl MockWalletEngine {
    pub fn failing(error: EngineInitError) -> Self {
        Self {
            init_error: Some(error),
            ..Self::default()
        }
    }

    /// Initializes fine but refuses subscriptions
    pub fn without_stream() -> Self {
        Self {
            stream_available: false,
            ..Self::default()
        }
    }

    pub fn initialized_with(&self) -> Vec<(InitializationMode, Birthday)> {
        self.initialized_with.lock().unwrap().clone()
    }

    pub fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    pub fn publish(&self, state: SyncState) -> usize {
        self.sender.send(state).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl WalletEngine for MockWalletEngine {
    async fn initialize(
        &self,
        mode: InitializationMode,
        wallet: &WalletRecord,
    ) -> Result<(), EngineInitError> {
        self.calls.push("wallet_engine.initialize");
        if let Some(error) = &self.init_error {
            return Err(error.clone());
        }
        self.initialized_with
            .lock()
            .unwrap()
            .push((mode, wallet.birthday));
        Ok(())
    }

    fn subscribe(&self) -> Result<SyncStateStream, EngineInitError> {
        self.calls.push("wallet_engine.subscribe");
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        if !self.stream_available {
            return Err(EngineInitError::Synchronizer("no stream".to_string()));
        }
        Ok(stream_from_receiver(self.sender.subscribe()))
    }
}

#[derive(Default)]
pub struct MockCrashReporter {
    fail: bool,
    calls: CallLog,
}

impl MockCrashReporter {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl CrashReporter for MockCrashReporter {
    fn configure(&self) -> Result<(), CrashReporterError> {
        self.calls.push("crash_reporter.configure");
        if self.fail {
            return Err(CrashReporterError::Unavailable("no network".to_string()));
        }
        Ok(())
    }
}

/// One set of mocks wired to a shared call log
pub struct MockSet {
    pub calls: CallLog,
    pub store: Arc<MockCredentialStore>,
    pub database_files: Arc<MockDatabaseFiles>,
    pub engine: Arc<MockWalletEngine>,
    pub crash_reporter: Arc<MockCrashReporter>,
}

impl MockSet {
    pub fn new(db_files_present: bool, mut store: MockCredentialStore) -> Self {
        let calls = CallLog::default();
        store.calls = calls.clone();
        Self {
            store: Arc::new(store),
            database_files: Arc::new(MockDatabaseFiles {
                present: db_files_present,
                calls: calls.clone(),
            }),
            engine: Arc::new(MockWalletEngine {
                calls: calls.clone(),
                ..MockWalletEngine::default()
            }),
            crash_reporter: Arc::new(MockCrashReporter {
                calls: calls.clone(),
                ..MockCrashReporter::default()
            }),
            calls,
        }
    }

    pub fn with_engine(mut self, mut engine: MockWalletEngine) -> Self {
        engine.calls = self.calls.clone();
        self.engine = Arc::new(engine);
        self
    }

    pub fn with_crash_reporter(mut self, mut crash_reporter: MockCrashReporter) -> Self {
        crash_reporter.calls = self.calls.clone();
        self.crash_reporter = Arc::new(crash_reporter);
        self
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            credential_store: self.store.clone(),
            database_files: self.database_files.clone(),
            wallet_engine: self.engine.clone(),
            crash_reporter: self.crash_reporter.clone(),
        }
    }

    pub fn orchestrator(&self) -> LaunchOrchestrator {
        self.orchestrator_with_state(RootState::default())
    }

    pub fn orchestrator_with_state(&self, state: RootState) -> LaunchOrchestrator {
        LaunchOrchestrator::new(self.collaborators(), state, KeychainRetryPolicy::default())
    }
}

use crate::wallet::{NetworkType, WalletRecord, WalletStorageError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Secure storage of the wallet key material and record
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
	/// Whether any key material is stored at all
	async fn are_keys_present(&self) -> bool;

	/// Export the stored wallet record.
	///
	/// Fails with [`WalletStorageError::KeysUnreadable`] when the material exists but
	/// cannot be read or decoded.
	async fn export_wallet_record(&self) -> Result<WalletRecord, WalletStorageError>;

	/// Persist the result of the recovery phrase backup test
	async fn mark_user_passed_phrase_backup_test(
		&self,
		passed: bool,
	) -> Result<(), WalletStorageError>;
}

/// Presence check for the on-disk sync databases
#[async_trait::async_trait]
pub trait DatabaseFiles: Send + Sync {
	/// IO problems are reported as absent.
	async fn are_db_files_present_for(&self, network: NetworkType) -> bool;
}

const WALLET_RECORD_FILENAME: &str = "wallet_record.json";
const WALLET_RECORD_METADATA_FILENAME: &str = "wallet_record.meta.json";
const WALLET_RECORD_TMP_FILENAME: &str = "wallet_record.json.tmp";

/// File-based implementation of CredentialStore
pub struct FileCredentialStore {
	data_dir: PathBuf,
}

impl FileCredentialStore {
	pub fn new(data_dir: PathBuf) -> Self {
		Self { data_dir }
	}

	fn record_filename(&self) -> PathBuf {
		self.data_dir.join(WALLET_RECORD_FILENAME)
	}

	fn metadata_filename(&self) -> PathBuf {
		self.data_dir.join(WALLET_RECORD_METADATA_FILENAME)
	}

	fn tmp_filename(&self) -> PathBuf {
		self.data_dir.join(WALLET_RECORD_TMP_FILENAME)
	}

	/// Write the wallet record, replacing any previous one.
	///
	/// The record goes to a temporary file that is renamed over the old one, so the
	/// stored record is always either the previous or the new version. Metadata is only
	/// written once the record is in place.
	pub async fn save(&self, record: &WalletRecord) -> Result<(), WalletStorageError> {
		tokio::fs::create_dir_all(&self.data_dir).await?;

		let content = Zeroizing::new(serde_json::to_string_pretty(record)?);
		let tmp_filename = self.tmp_filename();
		let mut file = tokio::fs::File::create(&tmp_filename).await?;
		file.write_all(content.as_bytes()).await?;
		file.sync_all().await?;
		drop(file);

		let filename = self.record_filename();
		tokio::fs::rename(&tmp_filename, &filename).await?;

		let metadata = serde_json::json!({
			"version": record.version,
			"updated_at": chrono::Utc::now().to_rfc3339(),
		});
		tokio::fs::write(
			self.metadata_filename(),
			serde_json::to_string_pretty(&metadata)?,
		)
		.await?;

		info!("Saved wallet record to {:?}", filename);
		Ok(())
	}
}

#[async_trait::async_trait]
impl CredentialStore for FileCredentialStore {
	async fn are_keys_present(&self) -> bool {
		path_exists(&self.record_filename()).await
	}

	async fn export_wallet_record(&self) -> Result<WalletRecord, WalletStorageError> {
		let filename = self.record_filename();

		let content = match tokio::fs::read_to_string(&filename).await {
			Ok(content) => Zeroizing::new(content),
			Err(e) if e.kind() == ErrorKind::NotFound => {
				return Err(WalletStorageError::WalletNotFound);
			}
			Err(e) => {
				return Err(WalletStorageError::KeysUnreadable(format!(
					"Failed to read wallet record: {}",
					e
				)));
			}
		};

		let record: WalletRecord = serde_json::from_str(&content).map_err(|e| {
			WalletStorageError::KeysUnreadable(format!("Failed to decode wallet record: {}", e))
		})?;

		debug!(
			"Exported wallet record from {:?} with birthday {}",
			filename,
			record.birthday.height()
		);
		Ok(record)
	}

	async fn mark_user_passed_phrase_backup_test(
		&self,
		passed: bool,
	) -> Result<(), WalletStorageError> {
		let mut record = self.export_wallet_record().await?;
		record.has_user_passed_phrase_backup_test = passed;
		self.save(&record).await
	}
}

/// File-based implementation of DatabaseFiles
pub struct FileDatabaseFiles {
	data_dir: PathBuf,
}

impl FileDatabaseFiles {
	pub fn new(data_dir: PathBuf) -> Self {
		Self { data_dir }
	}

	pub fn data_db_path(&self, network: NetworkType) -> PathBuf {
		self.data_dir.join(format!("{}_data.db", network))
	}

	pub fn cache_db_path(&self, network: NetworkType) -> PathBuf {
		self.data_dir.join(format!("{}_cache.db", network))
	}
}

#[async_trait::async_trait]
impl DatabaseFiles for FileDatabaseFiles {
	async fn are_db_files_present_for(&self, network: NetworkType) -> bool {
		// The cache database is disposable, only the data database decides.
		path_exists(&self.data_db_path(network)).await
	}
}

async fn path_exists(path: &Path) -> bool {
	match tokio::fs::try_exists(path).await {
		Ok(exists) => exists,
		Err(e) => {
			warn!("Failed to check {:?}: {}", path, e);
			false
		}
	}
}

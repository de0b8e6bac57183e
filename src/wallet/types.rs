use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

/// Network the wallet databases and keys belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
	#[default]
	Mainnet,
	Testnet,
}

impl NetworkType {
	pub fn as_str(&self) -> &'static str {
		match self {
			NetworkType::Mainnet => "mainnet",
			NetworkType::Testnet => "testnet",
		}
	}
}

impl fmt::Display for NetworkType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MnemonicLanguage {
	#[default]
	English,
}

/// Block height from which the wallet has to scan the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Birthday(pub u64);

impl Birthday {
	pub fn height(&self) -> u64 {
		self.0
	}
}

/// A string holding sensitive material.
///
/// `Debug` and `Display` never print the content and the buffer is zeroized on drop.
/// Read access goes through [`RedactableString::expose`].
#[derive(Clone, PartialEq, Eq, Default)]
pub struct RedactableString {
	inner: String,
}

impl RedactableString {
	pub fn new(value: impl Into<String>) -> Self {
		Self {
			inner: value.into(),
		}
	}

	pub fn expose(&self) -> &str {
		&self.inner
	}
}

impl fmt::Debug for RedactableString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[REDACTED]")
	}
}

impl fmt::Display for RedactableString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[REDACTED]")
	}
}

impl Drop for RedactableString {
	fn drop(&mut self) {
		self.inner.zeroize();
	}
}

/// Recovery phrase of the wallet, stored as space separated words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPhrase(RedactableString);

impl SeedPhrase {
	pub fn new(phrase: impl Into<String>) -> Self {
		Self(RedactableString::new(phrase))
	}

	pub fn expose(&self) -> &str {
		self.0.expose()
	}

	/// Split the phrase into individually redacted words
	pub fn words(&self) -> Vec<RedactableString> {
		self.0
			.expose()
			.split_whitespace()
			.map(RedactableString::new)
			.collect()
	}
}

impl Serialize for SeedPhrase {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.expose())
	}
}

impl<'de> Deserialize<'de> for SeedPhrase {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let phrase = Zeroizing::new(String::deserialize(deserializer)?);
		Ok(SeedPhrase::new(phrase.as_str()))
	}
}

/// Wallet record exported from the secure credential store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
	pub language: MnemonicLanguage,
	pub seed_phrase: SeedPhrase,
	pub version: u32,
	pub birthday: Birthday,
	#[serde(default)]
	pub has_user_passed_phrase_backup_test: bool,
}

/// How the wallet engine should bring up its databases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializationMode {
	/// Databases exist on disk and are reused
	ExistingWallet,
	/// Keys exist but databases are gone, rebuild from the birthday
	RestoreWallet,
}

/// Errors raised by the secure credential store
#[allow(clippy::enum_variant_names)]
#[derive(Debug, thiserror::Error)]
pub enum WalletStorageError {
	#[error("Keys unreadable: {0}")]
	KeysUnreadable(String),

	#[error("No wallet stored")]
	WalletNotFound,

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	#[error("Serialization error: {0}")]
	SerializationError(#[from] serde_json::Error),
}

/// Errors raised while initializing or subscribing to the wallet engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineInitError {
	#[error("Database error: {0}")]
	Database(String),

	#[error("Synchronizer not initialized")]
	NotInitialized,

	#[error("Synchronizer error: {0}")]
	Synchronizer(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CrashReporterError {
	#[error("Crash reporter unavailable: {0}")]
	Unavailable(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_seed_phrase_is_redacted_in_debug_output() {
		let record = WalletRecord {
			language: MnemonicLanguage::English,
			seed_phrase: SeedPhrase::new("abandon ability able"),
			version: 0,
			birthday: Birthday(42),
			has_user_passed_phrase_backup_test: false,
		};

		let printed = format!("{:?}", record);
		assert!(!printed.contains("abandon"));
		assert!(printed.contains("[REDACTED]"));
		assert_eq!(format!("{}", record.seed_phrase.words()[1]), "[REDACTED]");
	}

	#[test]
	fn test_seed_phrase_words() {
		let phrase = SeedPhrase::new("  abandon ability\table ");
		let words: Vec<String> = phrase
			.words()
			.iter()
			.map(|w| w.expose().to_string())
			.collect();
		assert_eq!(words, vec!["abandon", "ability", "able"]);
	}

	#[test]
	fn test_wallet_record_json_defaults_backup_flag() {
		let json = r#"{
			"language": "english",
			"seed_phrase": "abandon ability able",
			"version": 1,
			"birthday": 300000
		}"#;
		let record: WalletRecord = serde_json::from_str(json).expect("record should parse");
		assert_eq!(record.birthday, Birthday(300_000));
		assert!(!record.has_user_passed_phrase_backup_test);
		assert_eq!(record.seed_phrase.expose(), "abandon ability able");
	}
}

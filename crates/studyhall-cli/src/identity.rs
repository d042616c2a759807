//! File-backed storage for the operator's chat key pair
//!
//! The identity file is JSON, written atomically and readable only by the
//! owner on Unix. The private key never appears in command output.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studyhall_crypto::{CodecError, KeyPair, ALGORITHM};
use thiserror::Error;
use tracing::{debug, info};
use zeroize::Zeroize;

use crate::config::{Config, IdentityConfig};

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no identity at {0}; run `studyhall keygen` first")]
    NotFound(PathBuf),

    #[error("identity already exists at {0}; pass --force to replace it")]
    AlreadyExists(PathBuf),

    #[error("no default data directory on this platform; set identity.path")]
    NoDefaultPath,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported identity file version {0}")]
    UnsupportedVersion(u32),

    #[error("Invalid key data: {0}")]
    InvalidKeyData(#[from] CodecError),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),
}

/// Public identity details, safe to print.
#[derive(Debug, Clone, Serialize)]
pub struct IdentityInfo {
    pub public_key: String,
    pub algorithm: &'static str,
    pub created_at: DateTime<Utc>,
    pub path: PathBuf,
}

/// Public identity export (safe to share with peers)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityExport {
    pub public_key: String,
    pub algorithm: String,
    pub created_at: String,
}

impl From<&IdentityInfo> for IdentityExport {
    fn from(info: &IdentityInfo) -> Self {
        Self {
            public_key: info.public_key.clone(),
            algorithm: info.algorithm.to_string(),
            created_at: info.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct StoredIdentity {
    version: u32,
    public_key: String,
    private_key: String,
    created_at: String,
}

impl StoredIdentity {
    const CURRENT_VERSION: u32 = 1;
}

impl Drop for StoredIdentity {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the configured path, or `<data dir>/identity.json`.
    pub fn from_config(config: &IdentityConfig) -> Result<Self, IdentityError> {
        match &config.path {
            Some(path) => Ok(Self::new(path.clone())),
            None => Self::default_path()
                .map(Self::new)
                .ok_or(IdentityError::NoDefaultPath),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        Config::data_dir().map(|dir| dir.join("identity.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Generate and persist a new key pair.
    pub fn generate(&self, force: bool) -> Result<IdentityInfo, IdentityError> {
        if self.exists() && !force {
            return Err(IdentityError::AlreadyExists(self.path.clone()));
        }

        let pair = KeyPair::generate()?;
        let created_at = Utc::now();
        let hex = pair.to_hex();
        let stored = StoredIdentity {
            version: StoredIdentity::CURRENT_VERSION,
            public_key: hex.public_key.clone(),
            private_key: hex.private_key.clone(),
            created_at: created_at.to_rfc3339(),
        };
        self.write(&stored)?;
        info!(path = %self.path.display(), public_key = %hex.public_key, "generated chat identity");

        Ok(IdentityInfo {
            public_key: hex.public_key.clone(),
            algorithm: ALGORITHM,
            created_at,
            path: self.path.clone(),
        })
    }

    /// Load the key pair, verifying the stored public key matches.
    pub fn load(&self) -> Result<(KeyPair, IdentityInfo), IdentityError> {
        if !self.exists() {
            return Err(IdentityError::NotFound(self.path.clone()));
        }
        let contents = fs::read_to_string(&self.path)?;
        let stored: StoredIdentity = serde_json::from_str(&contents)?;
        if stored.version != StoredIdentity::CURRENT_VERSION {
            return Err(IdentityError::UnsupportedVersion(stored.version));
        }

        let pair = KeyPair::from_hex(&stored.public_key, &stored.private_key)?;
        let created_at = DateTime::parse_from_rfc3339(&stored.created_at)?.with_timezone(&Utc);
        debug!(path = %self.path.display(), "loaded chat identity");

        let info = IdentityInfo {
            public_key: pair.public_key().to_hex(),
            algorithm: ALGORITHM,
            created_at,
            path: self.path.clone(),
        };
        Ok((pair, info))
    }

    fn write(&self, identity: &StoredIdentity) -> Result<(), IdentityError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut json = serde_json::to_string_pretty(identity)?;
        let temp_path = self.path.with_extension("tmp");
        let result = write_private(&temp_path, json.as_bytes())
            .and_then(|()| fs::rename(&temp_path, &self.path));
        json.zeroize();

        if let Err(e) = result {
            // The temp file holds the private key.
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Create `path` readable by the owner only and write `contents` to it.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> IdentityStore {
        IdentityStore::new(dir.path().join("keys").join("identity.json"))
    }

    #[test]
    fn test_generate_then_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(!store.exists());

        let info = store.generate(false).unwrap();
        assert!(store.exists());
        assert_eq!(info.public_key.len(), 64);
        assert_eq!(info.algorithm, ALGORITHM);

        let (pair, loaded) = store.load().unwrap();
        assert_eq!(pair.public_key().to_hex(), info.public_key);
        assert_eq!(loaded.public_key, info.public_key);
        assert_eq!(loaded.created_at.timestamp(), info.created_at.timestamp());
    }

    #[test]
    fn test_generate_refuses_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let first = store.generate(false).unwrap();

        assert!(matches!(store.generate(false), Err(IdentityError::AlreadyExists(_))));

        let second = store.generate(true).unwrap();
        assert_ne!(first.public_key, second.public_key);
    }

    #[test]
    fn test_load_missing() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(store_in(&dir).load(), Err(IdentityError::NotFound(_))));
    }

    #[test]
    fn test_load_rejects_mismatched_pair() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.generate(false).unwrap();

        let other = KeyPair::generate().unwrap().to_hex();
        let contents = fs::read_to_string(store.path()).unwrap();
        let mut json: serde_json::Value = serde_json::from_str(&contents).unwrap();
        json["public_key"] = serde_json::Value::String(other.public_key.clone());
        fs::write(store.path(), json.to_string()).unwrap();

        assert!(matches!(
            store.load(),
            Err(IdentityError::InvalidKeyData(CodecError::KeyMismatch))
        ));
    }

    #[test]
    fn test_load_rejects_unknown_version() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.generate(false).unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        let mut json: serde_json::Value = serde_json::from_str(&contents).unwrap();
        json["version"] = serde_json::json!(9);
        fs::write(store.path(), json.to_string()).unwrap();

        assert!(matches!(store.load(), Err(IdentityError::UnsupportedVersion(9))));
    }

    #[test]
    fn test_failed_write_leaves_no_key_behind() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("identity.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("occupied"), b"x").unwrap();
        let store = IdentityStore::new(target.clone());

        assert!(matches!(store.generate(true), Err(IdentityError::Io(_))));
        assert!(!target.with_extension("tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_identity_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.generate(false).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_from_config_prefers_explicit_path() {
        let config = IdentityConfig {
            path: Some(PathBuf::from("/tmp/custom-identity.json")),
        };
        let store = IdentityStore::from_config(&config).unwrap();
        assert_eq!(store.path(), Path::new("/tmp/custom-identity.json"));
    }
}

//! Durable session storage — trait + file-backed implementation.
//!
//! The vault holds exactly two named entries: the bearer token string
//! (`uis_token`) and the serialized user profile (`uis_user`). It is written
//! only by the session store's restore/login/logout, never concurrently.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

/// Errors from vault operations.
///
/// These never cross the session-store boundary: a corrupt or inaccessible
/// vault degrades to the logged-out state instead of failing the client.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Vault backend unavailable: {0}")]
    Unavailable(String),
}

/// Trait for durable session persistence backends.
pub trait SessionVault: Send + Sync {
    /// Read the stored token entry, if present.
    fn read_token(&self) -> Result<Option<String>, VaultError>;

    /// Read the raw serialized profile entry, if present.
    fn read_profile(&self) -> Result<Option<String>, VaultError>;

    /// Write both entries. Either both land or the write fails as a unit.
    fn store(&self, token: &str, profile_json: &str) -> Result<(), VaultError>;

    /// Remove both entries. Succeeds when they are already absent.
    fn clear(&self) -> Result<(), VaultError>;
}

// ── File-backed vault ─────────────────────────────────────────────

const TOKEN_ENTRY: &str = "uis_token";
const PROFILE_ENTRY: &str = "uis_user";

/// File-system backed vault: two files under a state directory.
pub struct FileVault {
    root: PathBuf,
}

impl FileVault {
    /// Create a vault rooted at the given directory.
    /// Creates the directory if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, VaultError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn read_entry(&self, name: &str) -> Result<Option<String>, VaultError> {
        match fs::read_to_string(self.entry_path(name)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove_entry(&self, name: &str) -> Result<(), VaultError> {
        match fs::remove_file(self.entry_path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SessionVault for FileVault {
    fn read_token(&self) -> Result<Option<String>, VaultError> {
        self.read_entry(TOKEN_ENTRY)
    }

    fn read_profile(&self) -> Result<Option<String>, VaultError> {
        self.read_entry(PROFILE_ENTRY)
    }

    fn store(&self, token: &str, profile_json: &str) -> Result<(), VaultError> {
        // Profile first: a token with no resolvable profile is treated as
        // no session, so an interrupted write cannot fabricate a login.
        fs::write(self.entry_path(PROFILE_ENTRY), profile_json)?;
        fs::write(self.entry_path(TOKEN_ENTRY), token)?;
        tracing::debug!(path = %self.root.display(), "Session vault written");
        Ok(())
    }

    fn clear(&self) -> Result<(), VaultError> {
        self.remove_entry(TOKEN_ENTRY)?;
        self.remove_entry(PROFILE_ENTRY)?;
        Ok(())
    }
}

// ── In-memory vault ───────────────────────────────────────────────

/// In-memory vault for tests and ephemeral sessions.
///
/// Supports fault injection: with `fail_writes` set, `store` and `clear`
/// report the backend as unavailable.
#[derive(Default)]
pub struct MemoryVault {
    entries: Mutex<(Option<String>, Option<String>)>,
    fail_writes: bool,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// A vault whose writes always fail.
    pub fn failing() -> Self {
        Self {
            entries: Mutex::new((None, None)),
            fail_writes: true,
        }
    }

    /// Seed the vault with raw entries, bypassing the store.
    pub fn seed(&self, token: Option<&str>, profile_json: Option<&str>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        *entries = (
            token.map(str::to_string),
            profile_json.map(str::to_string),
        );
    }
}

impl SessionVault for MemoryVault {
    fn read_token(&self) -> Result<Option<String>, VaultError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.0.clone())
    }

    fn read_profile(&self) -> Result<Option<String>, VaultError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.1.clone())
    }

    fn store(&self, token: &str, profile_json: &str) -> Result<(), VaultError> {
        if self.fail_writes {
            return Err(VaultError::Unavailable("write fault injected".to_string()));
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        *entries = (Some(token.to_string()), Some(profile_json.to_string()));
        Ok(())
    }

    fn clear(&self) -> Result<(), VaultError> {
        if self.fail_writes {
            return Err(VaultError::Unavailable("write fault injected".to_string()));
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        *entries = (None, None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_vault_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileVault::new(dir.path()).unwrap();

        assert!(vault.read_token().unwrap().is_none());
        assert!(vault.read_profile().unwrap().is_none());

        vault.store("tok-1", r#"{"k":"v"}"#).unwrap();
        assert_eq!(vault.read_token().unwrap().as_deref(), Some("tok-1"));
        assert_eq!(
            vault.read_profile().unwrap().as_deref(),
            Some(r#"{"k":"v"}"#)
        );
    }

    #[test]
    fn file_vault_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileVault::new(dir.path()).unwrap();

        vault.store("tok-1", "{}").unwrap();
        vault.clear().unwrap();
        vault.clear().unwrap();

        assert!(vault.read_token().unwrap().is_none());
        assert!(vault.read_profile().unwrap().is_none());
    }

    #[test]
    fn memory_vault_fault_injection() {
        let vault = MemoryVault::failing();
        assert!(vault.store("t", "{}").is_err());
        assert!(vault.clear().is_err());
        // Reads still succeed.
        assert!(vault.read_token().unwrap().is_none());
    }
}

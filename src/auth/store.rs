//! Activated token file I/O

use log::info;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{PlatformError, Result};
use crate::platform::credentials::{default_token_path, Token, TokenKind};

/// Manages the activated token file for one token kind
pub struct TokenStore {
    kind: TokenKind,
    path: PathBuf,
}

impl TokenStore {
    /// Store at the default location (~/.voxel51/api-token.json or app-token.json)
    pub fn new(kind: TokenKind) -> Result<Self> {
        let path = default_token_path(kind).ok_or_else(|| {
            PlatformError::Config("Unable to determine the home directory".to_string())
        })?;
        Ok(Self { kind, path })
    }

    /// Store with a custom path (for testing)
    pub fn with_path(kind: TokenKind, path: PathBuf) -> Self {
        Self { kind, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Load the activated token, if one exists
    pub fn load(&self) -> Result<Option<Token>> {
        if !self.path.is_file() {
            return Ok(None);
        }
        Token::from_file(self.kind, &self.path).map(Some)
    }

    /// Validate the token at `source` and install it as the activated token.
    /// Uses atomic write (tmp file + rename) and creates parent dir if needed.
    pub fn activate(&self, source: &Path) -> Result<Token> {
        let content = fs::read_to_string(source).map_err(|e| {
            PlatformError::Config(format!(
                "Failed to read token file {}: {}",
                source.display(),
                e
            ))
        })?;
        let token = Token::from_json_str(self.kind, &content)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PlatformError::Config(format!(
                    "Failed to create token directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        if let Err(e) = install(&tmp_path, &self.path, content.as_bytes()) {
            let _ = fs::remove_file(&tmp_path);
            return Err(PlatformError::Config(format!(
                "Failed to install token at {}: {}",
                self.path.display(),
                e
            )));
        }

        info!(
            "Activated {} token {} at {}",
            self.kind.label(),
            token.masked_key(),
            self.path.display()
        );
        Ok(token)
    }

    /// Remove the activated token; returns whether one was present
    pub fn deactivate(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Deactivated {} token at {}", self.kind.label(), self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PlatformError::Config(format!(
                "Failed to remove token file {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

/// Write `content` to `tmp_path` (owner read/write only from creation) and rename it over `path`
fn install(tmp_path: &Path, path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(tmp_path)?;
    // mode() only applies when the file is created
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(content)?;
    file.sync_all()?;
    drop(file);

    fs::rename(tmp_path, path)
}

/// Read a token file without activating it
pub fn load_token(kind: TokenKind, path: &Path) -> Result<Token> {
    Token::from_file(kind, path)
}

/// Install the token file at `path` as the activated token of `kind`
pub fn activate_token(path: &Path, kind: TokenKind) -> Result<Token> {
    TokenStore::new(kind)?.activate(path)
}

/// Remove the activated token of `kind`; a missing file is not an error
pub fn deactivate_token(kind: TokenKind) -> Result<bool> {
    TokenStore::new(kind)?.deactivate()
}

/// Where the activated token of `kind` lives
pub fn active_token_path(kind: TokenKind) -> Option<PathBuf> {
    default_token_path(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TOKEN_JSON: &str = r#"{
        "access_token": {
            "private_key": "secret-key-1234",
            "base_api_url": "https://dev.api.example.com",
            "token_id": "tok-1",
            "created_at": "2019-06-04T15:47:59.190Z"
        }
    }"#;

    fn test_store(dir: &TempDir) -> TokenStore {
        TokenStore::with_path(TokenKind::User, dir.path().join("home/.voxel51/api-token.json"))
    }

    fn write_source(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("downloaded-token.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(test_store(&dir).load().unwrap().is_none());
    }

    #[test]
    fn test_activate_creates_parent_dir_and_loads() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let source = write_source(&dir, TOKEN_JSON);

        let token = store.activate(&source).unwrap();
        assert_eq!(token.token_id(), Some("tok-1"));
        assert!(store.path().exists());
        assert!(!store.path().with_extension("json.tmp").exists());

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.private_key(), "secret-key-1234");
        assert_eq!(loaded.base_api_url(), "https://dev.api.example.com");
    }

    #[cfg(unix)]
    #[test]
    fn test_activate_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.activate(&write_source(&dir, TOKEN_JSON)).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_activate_rejects_invalid_token() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let source = write_source(&dir, r#"{"access_token": {"private_key": ""}}"#);

        assert!(store.activate(&source).is_err());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_activate_missing_source_errors() {
        let dir = TempDir::new().unwrap();
        let err = test_store(&dir)
            .activate(&dir.path().join("nope.json"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read token file"));
    }

    #[test]
    fn test_failed_install_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        // A directory at the target path makes the rename fail
        fs::create_dir_all(store.path().join("occupied")).unwrap();

        let err = store.activate(&write_source(&dir, TOKEN_JSON)).unwrap_err();
        assert!(err.to_string().contains("Failed to install token"));
        assert!(!store.path().with_extension("json.tmp").exists());
        assert!(store.path().is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_activate_tightens_stale_temp_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let tmp = store.path().with_extension("json.tmp");
        fs::create_dir_all(tmp.parent().unwrap()).unwrap();
        fs::write(&tmp, "stale").unwrap();
        fs::set_permissions(&tmp, fs::Permissions::from_mode(0o644)).unwrap();

        store.activate(&write_source(&dir, TOKEN_JSON)).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_deactivate_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.activate(&write_source(&dir, TOKEN_JSON)).unwrap();

        assert!(store.deactivate().unwrap());
        assert!(!store.path().exists());
        assert!(!store.deactivate().unwrap());
    }
}

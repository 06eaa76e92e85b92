//! # Session Persistence
//!
//! Keeps the login (bearer token + user) in `~/.docchat/session.json` so a
//! restart lands straight on the chat page. Logging out removes the file.
//!
//! Writes use atomic rename (write `.tmp`, then `rename()`) for crash safety.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::api::{Credentials, User};

const SESSION_FILE: &str = "session.json";

/// On-disk shape of a stored login.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub token: String,
    pub user: User,
    pub saved_at: i64,
}

impl From<StoredSession> for Credentials {
    fn from(stored: StoredSession) -> Self {
        Credentials {
            token: stored.token,
            user: stored.user,
        }
    }
}

/// Reads and writes the session file inside one directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at `~/.docchat/`.
    pub fn default_location() -> io::Result<Self> {
        crate::core::config::app_dir()
            .map(Self::new)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory"))
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    pub fn save(&self, credentials: &Credentials) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let stored = StoredSession {
            token: credentials.token.clone(),
            user: credentials.user.clone(),
            saved_at: Utc::now().timestamp(),
        };
        atomic_write_json(&self.path(), &stored)?;
        debug!("Session saved for user {}", stored.user.id);
        Ok(())
    }

    /// `Ok(None)` when nobody is logged in.
    pub fn load(&self) -> io::Result<Option<StoredSession>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        let stored = serde_json::from_str(&json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Some(stored))
    }

    pub fn clear(&self) -> io::Result<()> {
        let path = self.path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Loads the stored login, discarding a corrupt file instead of failing startup.
    pub fn restore(&self) -> Option<Credentials> {
        match self.load() {
            Ok(stored) => stored.map(Credentials::from),
            Err(e) => {
                warn!("Discarding unreadable session file: {}", e);
                let _ = self.clear();
                None
            }
        }
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
/// The file holds a bearer token, so it is readable by the owner only.
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    // A leftover .tmp would keep its old mode.
    let _ = fs::remove_file(&tmp_path);
    let mut file = create_owner_only(&tmp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(unix)]
fn create_owner_only(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_owner_only(path: &Path) -> io::Result<fs::File> {
    fs::File::create(path)
}

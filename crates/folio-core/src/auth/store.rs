//! Session persistence.
//!
//! A session is a bearer token plus the user it belongs to. Backends keep the
//! two under separate keys, mirroring the two browser storage entries the
//! web front end uses.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::User;

/// Token file name in the session directory
pub(crate) const TOKEN_FILE: &str = "token";

/// User file name in the session directory
pub(crate) const USER_FILE: &str = "user.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: User,
}

/// Durable token + user storage. Implementations are synchronous so the
/// session can be resolved at startup without waiting on anything.
pub trait SessionStore: Send + Sync {
    fn save(&self, token: &str, user: &User) -> Result<()>;

    /// `None` unless both halves are present.
    fn read(&self) -> Result<Option<StoredSession>>;

    /// Remove both halves. Idempotent.
    fn clear(&self) -> Result<()>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(token: &str, user: User) -> Self {
        Self {
            session: Mutex::new(Some(StoredSession {
                token: token.to_string(),
                user,
            })),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<StoredSession>>> {
        self.session
            .lock()
            .map_err(|_| anyhow::anyhow!("Session store lock poisoned"))
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, token: &str, user: &User) -> Result<()> {
        *self.lock()? = Some(StoredSession {
            token: token.to_string(),
            user: user.clone(),
        });
        Ok(())
    }

    fn read(&self) -> Result<Option<StoredSession>> {
        Ok(self.lock()?.clone())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

/// Store backed by two files in a directory: `token` and `user.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join(USER_FILE)
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, token: &str, user: &User) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create session directory {}", self.dir.display()))?;

        // Stage both halves; the previous session stays intact until both are written
        let staged_user = stage_user(&self.user_path(), user)?;
        let staged_token = match stage(&self.token_path(), token.as_bytes()) {
            Ok(path) => path,
            Err(e) => {
                let _ = remove_if_present(&staged_user);
                return Err(e).context("Failed to write session token");
            }
        };

        let committed = commit(&staged_user, &self.user_path())
            .and_then(|()| commit(&staged_token, &self.token_path()));
        if let Err(e) = committed {
            let _ = remove_if_present(&staged_user);
            let _ = remove_if_present(&staged_token);
            // Never leave a new user beside an old token
            if let Err(clear_err) = self.clear() {
                warn!(error = %clear_err, "Failed to clear half-written session");
            }
            return Err(e);
        }
        Ok(())
    }

    fn read(&self) -> Result<Option<StoredSession>> {
        let token = match std::fs::read_to_string(self.token_path()) {
            Ok(t) => t.trim().to_string(),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context("Failed to read session token"),
        };
        if token.is_empty() {
            return Ok(None);
        }

        Ok(read_user(&self.user_path())?.map(|user| StoredSession { token, user }))
    }

    fn clear(&self) -> Result<()> {
        let token = remove_if_present(&self.token_path()).context("Failed to remove session token");
        clear_both(token, &self.user_path())
    }
}

/// Remove the user file even when the token removal failed, then report the
/// first failure.
pub(crate) fn clear_both(token_removed: Result<()>, user_path: &Path) -> Result<()> {
    let user_removed = remove_if_present(user_path).context("Failed to remove session user");
    token_removed.and(user_removed)
}

/// Sibling path a file is written to before it replaces `path`.
fn staged_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn stage(path: &Path, contents: &[u8]) -> std::io::Result<PathBuf> {
    let staged = staged_path(path);
    std::fs::write(&staged, contents)?;
    Ok(staged)
}

/// Write the user next to `path` without touching `path` itself.
pub(crate) fn stage_user(path: &Path, user: &User) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(user)?;
    stage(path, contents.as_bytes()).context("Failed to write session user")
}

/// Move a staged file over its target.
pub(crate) fn commit(staged: &Path, path: &Path) -> Result<()> {
    std::fs::rename(staged, path)
        .with_context(|| format!("Failed to replace {}", path.display()))
}

#[cfg(test)]
pub(crate) fn write_user(path: &Path, user: &User) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(user)?;
    std::fs::write(path, contents).context("Failed to write session user")?;
    Ok(())
}

/// A missing or unreadable user file reads as no user.
pub(crate) fn read_user(path: &Path) -> Result<Option<User>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).context("Failed to read session user"),
    };
    match serde_json::from_str(&contents) {
        Ok(user) => Ok(Some(user)),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Ignoring corrupt session user file");
            Ok(None)
        }
    }
}

pub(crate) fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

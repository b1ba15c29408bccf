use std::path::PathBuf;

use anyhow::{Context, Result};
use keyring::Entry;

use tracing::warn;

use super::store::{
    clear_both, commit, read_user, remove_if_present, stage_user, SessionStore, StoredSession,
    USER_FILE,
};
use crate::models::User;

const SERVICE_NAME: &str = "folio";

/// Keychain account holding the bearer token
const TOKEN_ACCOUNT: &str = "session-token";

/// Session store keeping the bearer token in the OS keychain and the user
/// profile next to the rest of the session data.
pub struct KeyringSessionStore {
    user_path: PathBuf,
}

impl KeyringSessionStore {
    pub fn new(session_dir: PathBuf) -> Self {
        Self {
            user_path: session_dir.join(USER_FILE),
        }
    }

    fn entry() -> Result<Entry> {
        Entry::new(SERVICE_NAME, TOKEN_ACCOUNT).context("Failed to create keyring entry")
    }
}

impl SessionStore for KeyringSessionStore {
    fn save(&self, token: &str, user: &User) -> Result<()> {
        // The old user.json stays in place until the keychain holds the new token
        let staged_user = stage_user(&self.user_path, user)?;
        let stored = Self::entry().and_then(|entry| {
            entry
                .set_password(token)
                .context("Failed to store session token in keychain")
        });
        if let Err(e) = stored {
            let _ = remove_if_present(&staged_user);
            return Err(e);
        }

        if let Err(e) = commit(&staged_user, &self.user_path) {
            let _ = remove_if_present(&staged_user);
            if let Err(clear_err) = self.clear() {
                warn!(error = %clear_err, "Failed to clear half-written session");
            }
            return Err(e);
        }
        Ok(())
    }

    fn read(&self) -> Result<Option<StoredSession>> {
        let token = match Self::entry()?.get_password() {
            Ok(token) if !token.is_empty() => token,
            Ok(_) | Err(keyring::Error::NoEntry) => return Ok(None),
            Err(e) => return Err(e).context("Failed to retrieve session token from keychain"),
        };
        Ok(read_user(&self.user_path)?.map(|user| StoredSession { token, user }))
    }

    fn clear(&self) -> Result<()> {
        let token = Self::entry().and_then(|entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete session token from keychain"),
        });
        clear_both(token, &self.user_path)
    }
}

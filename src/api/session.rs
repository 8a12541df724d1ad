//! Persisted session state: the bearer credential and a cached copy of the
//! user profile. Both are written together and cleared together so a reader
//! never sees a credential without its profile after teardown.
//!
//! The cached profile is a convenience for fast rendering and may be stale;
//! `GET /accounts/users/profile/` is authoritative.

use super::types::User;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::debug;

/// Storage backing the client's session.
///
/// Reads happen while building requests and writes while handling responses.
/// Implementations must make `clear` remove the credential and the profile in a
/// single step.
pub trait SessionStore: Send + Sync {
    fn credential(&self) -> Option<SecretString>;

    fn user(&self) -> Option<User>;

    /// Replaces the credential, keeping the cached profile.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn set_credential(&self, credential: SecretString) -> io::Result<()>;

    /// Replaces the cached profile, keeping the credential.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn set_user(&self, user: &User) -> io::Result<()>;

    /// Removes credential and profile.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn clear(&self) -> io::Result<()>;
}

#[derive(Default)]
struct SessionState {
    credential: Option<SecretString>,
    user: Option<User>,
}

/// Process-local store, lost on exit. Used by tests and embedders that keep
/// their own persistence.
#[derive(Default)]
pub struct MemorySessionStore {
    state: Mutex<SessionState>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn credential(&self) -> Option<SecretString> {
        self.lock().credential.clone()
    }

    fn user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    fn set_credential(&self, credential: SecretString) -> io::Result<()> {
        self.lock().credential = Some(credential);
        Ok(())
    }

    fn set_user(&self, user: &User) -> io::Result<()> {
        self.lock().user = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        let mut state = self.lock();
        state.credential = None;
        state.user = None;
        Ok(())
    }
}

impl std::fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("MemorySessionStore")
            .field("credential", &state.credential.as_ref().map(|_| "***"))
            .field("user", &state.user.as_ref().map(|user| user.email.as_str()))
            .finish()
    }
}

/// On-disk layout of the session file. Field names are the storage keys.
#[derive(Default, Serialize, Deserialize)]
struct PersistedSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<User>,
}

/// JSON file store that survives restarts, the CLI's equivalent of browser
/// local storage. The file is written with owner-only permissions on Unix.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> PersistedSession {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            return PersistedSession::default();
        };
        serde_json::from_str(&contents).unwrap_or_else(|err| {
            debug!("ignoring unreadable session file {}: {}", self.path.display(), err);
            PersistedSession::default()
        })
    }

    fn write(&self, session: &PersistedSession) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_vec_pretty(session)?;

        // Readers take no lock; they see the old file or the new one, never a
        // partial write.
        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = owner_only_file(&tmp_path)?;
        file.write_all(&contents)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, &self.path)
    }

    fn update(&self, apply: impl FnOnce(&mut PersistedSession)) -> io::Result<()> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut session = self.read();
        apply(&mut session);
        self.write(&session)
    }
}

impl SessionStore for FileSessionStore {
    fn credential(&self) -> Option<SecretString> {
        self.read()
            .auth_token
            .filter(|token| !token.is_empty())
            .map(SecretString::from)
    }

    fn user(&self) -> Option<User> {
        self.read().user
    }

    fn set_credential(&self, credential: SecretString) -> io::Result<()> {
        self.update(|session| {
            session.auth_token = Some(credential.expose_secret().to_string());
        })
    }

    fn set_user(&self, user: &User) -> io::Result<()> {
        self.update(|session| session.user = Some(user.clone()))
    }

    fn clear(&self) -> io::Result<()> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

/// Creates (or truncates) `path` readable by the owner only from the start.
#[cfg(unix)]
fn owner_only_file(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; a stale temp file keeps its old bits.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn owner_only_file(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

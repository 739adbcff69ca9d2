// src/client/session.rs

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use serde::{Deserialize, Serialize};

use crate::models::user::AuthResponse;

/// The signed-in instructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Account email; sent as `author` on writes.
    pub user: String,
    pub token: String,
}

impl From<AuthResponse> for Session {
    fn from(resp: AuthResponse) -> Self {
        Self {
            user: resp.user,
            token: resp.token,
        }
    }
}

/// Holds the current session, optionally mirrored to a JSON file.
///
/// `load` restores a previous session, `clear` tears it down and removes the
/// file. Clones share the same session.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    path: Option<PathBuf>,
    current: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            current: Arc::default(),
        }
    }

    /// Reads the backing file, if any. A missing file means signed out.
    pub fn load(&self) -> io::Result<Option<Session>> {
        let loaded = match &self.path {
            Some(path) => match fs::read(path) {
                Ok(bytes) => Some(serde_json::from_slice::<Session>(&bytes)?),
                Err(e) if e.kind() == io::ErrorKind::NotFound => None,
                Err(e) => return Err(e),
            },
            None => self.current(),
        };
        self.replace(loaded.clone());
        Ok(loaded)
    }

    pub fn save(&self, session: &Session) -> io::Result<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, serde_json::to_vec_pretty(session)?)?;
        }
        self.replace(Some(session.clone()));
        tracing::debug!(user = %session.user, "Session stored");
        Ok(())
    }

    pub fn current(&self) -> Option<Session> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn clear(&self) -> io::Result<()> {
        self.replace(None);
        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn replace(&self, session: Option<Session>) {
        match self.current.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }
}

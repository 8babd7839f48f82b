use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

#[derive(Debug, Default)]
struct SessionInner {
    data: Option<SessionData>,
    path: Option<PathBuf>,
}

/// Shared handle to the session credential.
///
/// Clones refer to the same session, so the handle can be given to the HTTP
/// client and kept by the application at the same time. Separate contexts are
/// fully independent, which allows several sessions in one process.
///
/// The only transitions are `login` (Anonymous to Authenticated) and
/// `logout`/`invalidate` (back to Anonymous).
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<SessionInner>>,
}

impl SessionContext {
    /// In-memory session, starts anonymous.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session persisted as `session.json` under `cache_dir`. A previously
    /// saved session is restored. A file that cannot be parsed is removed
    /// and the session starts anonymous.
    pub fn persistent(cache_dir: &Path) -> Result<Self> {
        let path = cache_dir.join(SESSION_FILE);
        let data = if path.exists() {
            let contents = std::fs::read(&path).context("Failed to read session file")?;
            match serde_json::from_slice::<SessionData>(&contents) {
                Ok(data) => {
                    debug!(username = %data.username, "Restored saved session");
                    Some(data)
                }
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable session file");
                    if let Err(e) = std::fs::remove_file(&path) {
                        warn!(error = %e, "Failed to remove session file");
                    }
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(SessionInner {
                data,
                path: Some(path),
            })),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The current credential, if any
    pub fn token(&self) -> Option<String> {
        self.read().data.as_ref().map(|d| d.token.clone())
    }

    pub fn current(&self) -> Option<SessionData> {
        self.read().data.clone()
    }

    pub fn state(&self) -> SessionState {
        if self.read().data.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Store a freshly issued credential, replacing any previous one.
    ///
    /// The in-memory session is updated even when saving it to disk fails;
    /// the returned error only concerns persistence.
    pub fn login(&self, data: SessionData) -> Result<()> {
        let mut inner = self.write();
        info!(username = %data.username, "Logged in");
        let contents = serde_json::to_string_pretty(&data)?;
        inner.data = Some(data);
        if let Some(ref path) = inner.path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, contents).context("Failed to write session file")?;
        }
        Ok(())
    }

    /// Explicit logout.
    pub fn logout(&self) -> Result<()> {
        let mut inner = self.write();
        let previous = inner.data.take();
        if let Some(ref path) = inner.path {
            if path.exists() {
                std::fs::remove_file(path).context("Failed to remove session file")?;
            }
        }
        if let Some(data) = previous {
            info!(username = %data.username, "Logged out");
        }
        Ok(())
    }

    /// Drop the credential after the server rejected it.
    pub fn invalidate(&self) {
        let mut inner = self.write();
        if inner.data.take().is_some() {
            warn!("Session credential rejected by server, now anonymous");
        }
        if let Some(ref path) = inner.path {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(error = %e, "Failed to remove session file");
                }
            }
        }
    }
}

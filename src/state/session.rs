//! Admin session and the permission gate
//!
//! ```text
//!              login (verified)
//!   LoggedOut ─────────────────▶ LoggedIn
//!       ▲                           │
//!       └───── logout / expiry ─────┘
//! ```
//!
//! Both states are stable. A rejected login changes nothing.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AppError;

/// Whether admin-only operations are allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    #[default]
    LoggedOut,
    LoggedIn,
}

impl Permission {
    pub fn is_logged_in(self) -> bool {
        self == Permission::LoggedIn
    }
}

/// An id/password pair from the login form
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub id: String,
    pub password: String,
}

impl Credentials {
    pub fn new(id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("password", &"***")
            .finish()
    }
}

/// Checks credentials against some account source
pub trait Authenticator {
    fn verify(&self, credentials: &Credentials) -> bool;

    /// Tell the account source the session ended
    fn sign_out(&self) {}
}

/// A single admin account fixed at startup
#[derive(Debug, Clone)]
pub struct StaticAuthenticator {
    admin: Credentials,
}

impl StaticAuthenticator {
    pub fn new(admin: Credentials) -> Self {
        Self { admin }
    }
}

impl Authenticator for StaticAuthenticator {
    fn verify(&self, credentials: &Credentials) -> bool {
        *credentials == self.admin
    }
}

#[derive(Serialize, Deserialize, Debug)]
struct SessionRecord {
    logged_in: bool,
    signed_in_at: DateTime<Utc>,
}

/// The logged-in flag persisted across restarts
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the stored state; anything unreadable counts as logged out
    pub fn restore(&self) -> Permission {
        let Ok(text) = fs::read_to_string(&self.path) else {
            return Permission::LoggedOut;
        };

        match serde_json::from_str::<SessionRecord>(&text) {
            Ok(record) if record.logged_in => {
                info!("🔑 Restored admin session from {}", record.signed_in_at);
                Permission::LoggedIn
            }
            Ok(_) => Permission::LoggedOut,
            Err(e) => {
                warn!("⚠️  Ignoring malformed session file {}: {e}", self.path.display());
                Permission::LoggedOut
            }
        }
    }

    fn save(&self) {
        let record = SessionRecord {
            logged_in: true,
            signed_in_at: Utc::now(),
        };

        let result = serde_json::to_vec(&record)
            .map_err(std::io::Error::from)
            .and_then(|body| {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&self.path, body)
            });

        if let Err(e) = result {
            warn!("⚠️  Could not persist session to {}: {e}", self.path.display());
        }
    }

    fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("⚠️  Could not remove session file {}: {e}", self.path.display());
            }
        }
    }
}

/// The permission state machine plus its authenticator
pub struct Session<A: Authenticator> {
    authenticator: A,
    permission: Permission,
    persisted: Option<SessionFile>,
}

impl<A: Authenticator> Session<A> {
    /// A session that starts logged out and is forgotten on exit
    pub fn new(authenticator: A) -> Self {
        Self {
            authenticator,
            permission: Permission::LoggedOut,
            persisted: None,
        }
    }

    /// A session rehydrated from, and saved to, `file`
    pub fn persisted(authenticator: A, file: SessionFile) -> Self {
        Self {
            authenticator,
            permission: file.restore(),
            persisted: Some(file),
        }
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Fail with `PermissionDenied` unless logged in
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.permission.is_logged_in() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    /// LoggedOut -> LoggedIn if the authenticator accepts `credentials`
    pub fn login(&mut self, credentials: &Credentials) -> Result<(), AppError> {
        if !self.authenticator.verify(credentials) {
            warn!(id = %credentials.id, "login rejected");
            return Err(AppError::AuthFailure);
        }

        self.permission = Permission::LoggedIn;
        if let Some(file) = &self.persisted {
            file.save();
        }

        info!(id = %credentials.id, "🔓 Admin logged in");
        Ok(())
    }

    /// LoggedIn -> LoggedOut on explicit logout
    pub fn logout(&mut self) {
        self.authenticator.sign_out();
        self.end("🔒 Admin logged out");
    }

    /// LoggedIn -> LoggedOut when the authenticator reports the session gone
    pub fn expire(&mut self) {
        self.end("⌛ Admin session expired");
    }

    fn end(&mut self, reason: &str) {
        if !self.permission.is_logged_in() {
            return;
        }

        self.permission = Permission::LoggedOut;
        if let Some(file) = &self.persisted {
            file.clear();
        }
        info!("{reason}");
    }
}

impl<A: Authenticator> std::fmt::Debug for Session<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("permission", &self.permission)
            .field("persisted", &self.persisted.is_some())
            .finish()
    }
}

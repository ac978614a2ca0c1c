//! Client-session persistence.
//!
//! One serialized user record under a well-known file name: written on
//! login/registration, removed on logout, read once at application start.
//! Workflow calls receive the current user as an explicit [`Session`]
//! context instead of reaching into ambient global state.

#![allow(dead_code)] // The file-backed store is the embedding client's half
                     // of the lifecycle; the HTTP surface rebuilds contexts
                     // per request.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::domain::User;
use crate::error::{AppError, Result};

/// The explicit session context handed to workflow operations.
#[derive(Clone, Debug)]
pub struct Session {
    pub user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self { user }
    }
}

const SESSION_FILE: &str = "session.json";

/// File-backed store for the current user.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(SESSION_FILE),
        }
    }

    /// The saved user, if a session exists. A corrupt file is an error,
    /// not an empty session.
    pub fn load(&self) -> Result<Option<User>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::Session(e)),
        };
        let user = serde_json::from_str(&raw)
            .map_err(|e| AppError::Session(e.into()))?;
        Ok(Some(user))
    }

    pub fn set(&self, user: &User) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(AppError::Session)?;
        }
        let raw = serde_json::to_string(user).map_err(|e| AppError::Session(e.into()))?;
        fs::write(&self.path, raw).map_err(AppError::Session)
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Session(e)),
        }
    }
}

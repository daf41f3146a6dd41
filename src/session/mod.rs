//! Logged-in operator session and navigation targets.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::utils::paths::{self, ensure_dir, write_atomic};

/// Screens the forms can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Menu,
    Login,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Menu => "/menu",
            Route::Login => "/login",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub name: String,
    pub token: String,
    #[serde(default)]
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl SessionInfo {
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
            logged_in_at: Some(Utc::now()),
        }
    }

    pub fn first_name(&self) -> &str {
        self.name.split(' ').next().unwrap_or_default()
    }

    /// Header greeting, e.g. `Olá, Maria`.
    pub fn greeting(&self) -> String {
        format!("Olá, {}", self.first_name())
    }
}

/// Persists the session between runs of the client.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new() -> Result<Self, AppError> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, AppError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: paths::session_file_in(&base),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<SessionInfo>, AppError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    pub fn save(&self, session: &SessionInfo) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(session)?;
        write_atomic(&self.path, &json)?;
        tracing::info!(user = %session.name, "session stored");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), AppError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Drops the stored session and sends the user to the login screen.
pub fn logout(store: &SessionStore) -> Result<Route, AppError> {
    store.clear()?;
    tracing::info!("logged out");
    Ok(Route::Login)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session(name: &str) -> SessionInfo {
        SessionInfo::new(name, "abc")
    }

    #[test]
    fn greeting_uses_first_name() {
        assert_eq!(session("Maria da Silva").greeting(), "Olá, Maria");
        assert_eq!(session("Ana").greeting(), "Olá, Ana");
        assert_eq!(session("").greeting(), "Olá, ");
    }

    #[test]
    fn store_round_trip_and_logout() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::with_base_dir(temp.path().to_path_buf()).unwrap();
        assert_eq!(store.load().unwrap(), None);

        store.save(&session("Maria")).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.name, "Maria");
        assert_eq!(loaded.token, "abc");
        assert!(loaded.logged_in_at.is_some());

        assert_eq!(logout(&store).unwrap(), Route::Login);
        assert!(!store.path().exists());
        assert_eq!(logout(&store).unwrap().path(), "/login");
    }
}

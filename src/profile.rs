use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Protocol;
use crate::error::ClientError;

/// A session the client can try to resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub server: String,
    pub protocol: Protocol,
    /// Session cookie value or game id, depending on the protocol.
    pub token: String,
}

/// Sessions remembered across runs, one per (server, protocol).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub sessions: Vec<SessionRecord>,
}

impl Profile {
    /// Load the profile from its default location.
    pub fn load() -> Self {
        match Self::file_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from `path`. A missing or unreadable file gives an empty profile;
    /// losing a session token only means starting a new game.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let mut data = Vec::new();
        if let Err(err) = File::open(path).and_then(|mut f| f.read_to_end(&mut data)) {
            warn!(path = %path.display(), error = %err, "profile unreadable; starting fresh");
            return Self::default();
        }

        match bincode::deserialize(&data) {
            Ok(profile) => profile,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "profile corrupted; starting fresh");
                Self::default()
            }
        }
    }

    /// Save to the default location. Failures are logged, never fatal.
    pub fn save(&self) {
        let Some(path) = Self::file_path() else { return };
        if let Err(err) = self.save_to(&path) {
            warn!(path = %path.display(), error = %err, "could not save profile");
        }
    }

    /// Write atomically: a temp file next to `path`, synced, then renamed over it.
    pub fn save_to(&self, path: &Path) -> Result<(), ClientError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let payload = bincode::serialize(self)
            .map_err(|e| ClientError::Config(format!("encoding profile: {e}")))?;

        let mut temp_path = path.to_path_buf();
        temp_path.set_extension("tmp");

        let written = File::create(&temp_path).and_then(|mut file| {
            file.write_all(&payload)?;
            file.sync_all()
        });
        if let Err(err) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }

        fs::rename(&temp_path, path)?;
        debug!(path = %path.display(), sessions = self.sessions.len(), "profile saved");
        Ok(())
    }

    pub fn token_for(&self, server: &str, protocol: Protocol) -> Option<&str> {
        self.sessions
            .iter()
            .find(|r| r.server == server && r.protocol == protocol)
            .map(|r| r.token.as_str())
    }

    /// Record `token` for (server, protocol), replacing any older one.
    /// `None` forgets the session.
    pub fn remember(&mut self, server: &str, protocol: Protocol, token: Option<String>) {
        self.sessions
            .retain(|r| !(r.server == server && r.protocol == protocol));
        if let Some(token) = token {
            self.sessions.push(SessionRecord { server: server.to_string(), protocol, token });
        }
    }

    /// Get the path to the profile file (`sessions.dat`).
    fn file_path() -> Option<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "klondike", "klondike-client")?;
        Some(proj_dirs.data_dir().join("sessions.dat"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remember_replaces_and_forgets() {
        let mut profile = Profile::default();
        profile.remember("http://a", Protocol::Api, Some("one".into()));
        profile.remember("http://a", Protocol::Legacy, Some("legacy".into()));
        profile.remember("http://a", Protocol::Api, Some("two".into()));
        assert_eq!(profile.token_for("http://a", Protocol::Api), Some("two"));
        assert_eq!(profile.token_for("http://a", Protocol::Legacy), Some("legacy"));
        assert_eq!(profile.sessions.len(), 2);

        profile.remember("http://a", Protocol::Api, None);
        assert_eq!(profile.token_for("http://a", Protocol::Api), None);
        assert_eq!(profile.token_for("http://b", Protocol::Legacy), None);
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sessions.dat");

        let mut profile = Profile::default();
        profile.remember("http://127.0.0.1:8000", Protocol::Api, Some("sid-1".into()));
        profile.save_to(&path).unwrap();

        assert!(!path.with_extension("tmp").exists());
        assert_eq!(Profile::load_from(&path), profile);
    }

    #[test]
    fn missing_or_garbage_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.dat");
        assert_eq!(Profile::load_from(&path), Profile::default());

        fs::write(&path, [0xff; 3]).unwrap();
        assert_eq!(Profile::load_from(&path), Profile::default());
    }
}

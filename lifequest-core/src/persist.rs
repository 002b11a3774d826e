//! Player persistence for save/load functionality.
//!
//! The whole player is stored as a single versioned JSON record in a
//! [`SaveSlot`]. Loading never fails from the caller's point of view: a
//! missing, malformed, or outdated record falls back to a fresh player.

use crate::player::Player;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current save format version.
pub const SAVE_VERSION: u32 = 1;

/// A saved player with everything needed to resume play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPlayer {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// When the save was created, in seconds since the Unix epoch.
    pub saved_at: String,

    pub player: Player,
}

impl SavedPlayer {
    pub fn new(player: Player) -> Self {
        Self {
            version: SAVE_VERSION,
            saved_at: timestamp_now(),
            player,
        }
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a record, rejecting other format versions.
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let saved: Self = serde_json::from_str(json)?;

        if saved.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: saved.version,
            });
        }

        Ok(saved)
    }
}

// ============================================================================
// Save slots
// ============================================================================

/// A single key-value slot holding one save record.
#[async_trait]
pub trait SaveSlot: Send + Sync {
    /// The stored record, `None` if nothing was ever written.
    async fn read(&self) -> Result<Option<String>, PersistError>;

    /// Replace the stored record.
    async fn write(&self, contents: &str) -> Result<(), PersistError>;
}

#[async_trait]
impl<T: SaveSlot + ?Sized> SaveSlot for Arc<T> {
    async fn read(&self) -> Result<Option<String>, PersistError> {
        (**self).read().await
    }

    async fn write(&self, contents: &str) -> Result<(), PersistError> {
        (**self).write(contents).await
    }
}

/// An in-memory slot, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemorySlot {
    contents: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }

    /// A copy of what is stored.
    pub async fn contents(&self) -> Option<String> {
        self.contents.lock().await.clone()
    }
}

#[async_trait]
impl SaveSlot for MemorySlot {
    async fn read(&self) -> Result<Option<String>, PersistError> {
        Ok(self.contents.lock().await.clone())
    }

    async fn write(&self, contents: &str) -> Result<(), PersistError> {
        *self.contents.lock().await = Some(contents.to_string());
        Ok(())
    }
}

/// A slot backed by a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl SaveSlot for FileSlot {
    async fn read(&self) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, contents: &str) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        // Write then rename so a crash never leaves half a record behind.
        let temp = self.temp_path();
        fs::write(&temp, contents).await?;
        fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

// ============================================================================
// Load / save
// ============================================================================

/// Load the player from a slot, falling back to a new player.
pub async fn load_player(slot: &dyn SaveSlot) -> Player {
    let content = match slot.read().await {
        Ok(Some(content)) => content,
        Ok(None) => {
            tracing::info!(target: "lifequest::persist", "No save found, starting fresh");
            return Player::default();
        }
        Err(e) => {
            tracing::warn!(
                target: "lifequest::persist",
                error = %e,
                "Could not read save, starting fresh"
            );
            return Player::default();
        }
    };

    match SavedPlayer::from_json(&content) {
        Ok(saved) => {
            tracing::info!(
                target: "lifequest::persist",
                level = saved.player.level,
                saved_at = %saved.saved_at,
                "Loaded save"
            );
            saved.player
        }
        Err(e) => {
            tracing::warn!(
                target: "lifequest::persist",
                error = %e,
                "Malformed save, starting fresh"
            );
            Player::default()
        }
    }
}

/// Write the player to a slot as a whole record.
pub async fn save_player(slot: &dyn SaveSlot, player: &Player) -> Result<(), PersistError> {
    let json = SavedPlayer::new(player.clone()).to_json()?;
    slot.write(&json).await?;
    tracing::debug!(target: "lifequest::persist", level = player.level, "Saved");
    Ok(())
}

/// Get the current timestamp as seconds since the Unix epoch.
fn timestamp_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    format!("{}", now.as_secs())
}

//! The remote rules service, seen from the client.
//!
//! Every operation returns the full authoritative snapshot (or a hint); the
//! service rejects illegal moves by failing the call. Two wire protocols
//! implement the same trait: [`api::ApiClient`] and [`legacy::LegacyClient`].

pub mod api;
pub mod legacy;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::moves::MoveDescriptor;
use crate::snapshot::Snapshot;

/// Body of a new-game request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewGame {
    pub mode: String,
    pub draw: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Name the finished game is recorded under on the scoreboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

impl Default for NewGame {
    fn default() -> Self {
        NewGame { mode: "standard".to_string(), draw: 1, seed: None, player_name: None }
    }
}

/// One finished game on the scoreboard, best first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub moves: u32,
    #[serde(default)]
    pub seconds: u64,
    #[serde(default = "default_draw")]
    pub draw: u8,
}

fn default_draw() -> u8 {
    1
}

/// A player's best score across their saved games.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeaderEntry {
    #[serde(rename = "jugador")]
    pub player: String,
    #[serde(rename = "max_score", default)]
    pub best_score: i64,
    #[serde(rename = "partidas", default)]
    pub games: u32,
}

#[async_trait(?Send)]
pub trait GameService {
    async fn new_game(&self, request: &NewGame) -> Result<Snapshot, ClientError>;

    async fn apply_move(&self, mv: &MoveDescriptor) -> Result<Snapshot, ClientError>;

    async fn undo(&self) -> Result<Snapshot, ClientError>;

    async fn redo(&self) -> Result<Snapshot, ClientError>;

    async fn hint(&self) -> Result<Option<MoveDescriptor>, ClientError>;

    /// Let the service greedily apply up to `limit` moves.
    async fn autoplay(&self, limit: u32) -> Result<Snapshot, ClientError>;

    /// The session's current state, or an error if there is no session.
    async fn current_state(&self) -> Result<Snapshot, ClientError>;

    async fn save(&self, _name: &str) -> Result<(), ClientError> {
        Err(ClientError::Unsupported("saving"))
    }

    async fn load(&self, _name: &str) -> Result<Snapshot, ClientError> {
        Err(ClientError::Unsupported("loading"))
    }

    async fn list_saves(&self) -> Result<Vec<String>, ClientError> {
        Err(ClientError::Unsupported("listing saves"))
    }

    /// Rename the player of the game in progress.
    async fn set_player(&self, _name: &str) -> Result<(), ClientError> {
        Err(ClientError::Unsupported("setting a player name"))
    }

    async fn scoreboard(&self) -> Result<Vec<ScoreEntry>, ClientError> {
        Err(ClientError::Unsupported("the scoreboard"))
    }

    async fn leaderboard(&self) -> Result<Vec<LeaderEntry>, ClientError> {
        Err(ClientError::Unsupported("the leaderboard"))
    }

    /// Opaque token that lets a later client resume this session.
    fn session_token(&self) -> Option<String> {
        None
    }
}

/// Turn a failed response body into the message shown to the player.
///
/// Services report `{"detail": ...}` or `{"error": ...}`; anything else falls
/// back to the raw body, then to the status reason.
pub(crate) fn failure_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(text) = value.get(key).and_then(serde_json::Value::as_str) {
                return text.to_string();
            }
        }
    }
    let body = body.trim();
    if !body.is_empty() && body.len() <= 200 {
        return body.to_string();
    }
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()))
}

/// Check the status and decode a JSON body.
pub(crate) async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::status(status.as_u16(), failure_message(status, &body)));
    }
    Ok(serde_json::from_str(&body)?)
}

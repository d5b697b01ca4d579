use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{GameService, LeaderEntry, NewGame, ScoreEntry, decode};
use crate::error::ClientError;
use crate::moves::MoveDescriptor;
use crate::snapshot::Snapshot;

/// Cookie the service keys sessions on.
const SESSION_COOKIE: &str = "sid";

#[derive(Deserialize)]
struct StateEnvelope {
    state: Snapshot,
}

#[derive(Deserialize)]
struct HintEnvelope {
    #[serde(default)]
    hint: Option<MoveDescriptor>,
}

#[derive(Serialize)]
struct MoveBody<'a> {
    #[serde(rename = "move")]
    mv: &'a MoveDescriptor,
}

#[derive(Serialize)]
struct AutoplayBody {
    limit: u32,
}

#[derive(Serialize)]
struct PlayerBody<'a> {
    player_name: &'a str,
}

/// Listing endpoints wrap their rows in `{items: [...]}`.
#[derive(Deserialize)]
struct Items<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// A stored game as `/api/saves` lists it.
#[derive(Deserialize)]
struct SaveSummary {
    id: String,
    #[serde(rename = "modo", default)]
    mode: Option<String>,
    #[serde(rename = "puntaje", default)]
    score: i64,
    #[serde(rename = "jugador", default)]
    player: Option<String>,
}

impl SaveSummary {
    fn describe(&self) -> String {
        let mut line = format!(
            "{} ({}, score {})",
            self.id,
            self.mode.as_deref().unwrap_or("standard"),
            self.score
        );
        if let Some(player) = &self.player {
            line.push_str(&format!(" by {player}"));
        }
        line
    }
}

/// Client for the session-cookie JSON API under `/api/game`.
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    jar: Arc<Jar>,
}

impl ApiClient {
    /// Connect to `server`, optionally resuming the session `sid`.
    pub fn new(server: &str, session: Option<&str>) -> Result<Self, ClientError> {
        let base: Url = server
            .parse()
            .map_err(|e| ClientError::Config(format!("server url {server:?}: {e}")))?;
        let jar = Arc::new(Jar::default());
        if let Some(sid) = session {
            jar.add_cookie_str(&format!("{SESSION_COOKIE}={sid}; Path=/"), &base);
        }
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .user_agent(concat!("klondike-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(ApiClient { http, base, jar })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path)
    }

    async fn post<B: Serialize + ?Sized, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        debug!(path, "POST");
        let response = self.http.post(self.endpoint(path)).json(body).send().await?;
        decode(response).await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        debug!(path, "GET");
        let response = self.http.get(self.endpoint(path)).send().await?;
        decode(response).await
    }

    async fn post_state<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Snapshot, ClientError> {
        let envelope: StateEnvelope = self.post(path, body).await?;
        Ok(envelope.state)
    }
}

#[async_trait(?Send)]
impl GameService for ApiClient {
    async fn new_game(&self, request: &NewGame) -> Result<Snapshot, ClientError> {
        self.post_state("/api/game/new", request).await
    }

    async fn apply_move(&self, mv: &MoveDescriptor) -> Result<Snapshot, ClientError> {
        self.post_state("/api/game/move", &MoveBody { mv }).await
    }

    async fn undo(&self) -> Result<Snapshot, ClientError> {
        self.post_state("/api/game/undo", &json!({})).await
    }

    async fn redo(&self) -> Result<Snapshot, ClientError> {
        self.post_state("/api/game/redo", &json!({})).await
    }

    async fn hint(&self) -> Result<Option<MoveDescriptor>, ClientError> {
        let envelope: HintEnvelope = self.post("/api/game/hint", &json!({})).await?;
        Ok(envelope.hint)
    }

    async fn autoplay(&self, limit: u32) -> Result<Snapshot, ClientError> {
        self.post_state("/api/game/autoplay", &AutoplayBody { limit }).await
    }

    async fn current_state(&self) -> Result<Snapshot, ClientError> {
        self.get("/api/game/state").await
    }

    async fn list_saves(&self) -> Result<Vec<String>, ClientError> {
        let saves: Items<SaveSummary> = self.get("/api/saves").await?;
        Ok(saves.items.iter().map(SaveSummary::describe).collect())
    }

    async fn set_player(&self, name: &str) -> Result<(), ClientError> {
        let _: serde_json::Value =
            self.post("/api/game/player", &PlayerBody { player_name: name }).await?;
        Ok(())
    }

    async fn scoreboard(&self) -> Result<Vec<ScoreEntry>, ClientError> {
        let board: Items<ScoreEntry> = self.get("/api/scoreboard").await?;
        Ok(board.items)
    }

    async fn leaderboard(&self) -> Result<Vec<LeaderEntry>, ClientError> {
        let board: Items<LeaderEntry> = self.get("/api/leaderboard").await?;
        Ok(board.items)
    }

    fn session_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base)?;
        let cookies = header.to_str().ok()?;
        session_from_cookies(cookies)
    }
}

fn session_from_cookies(cookies: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_body_nests_descriptor() {
        let mv = MoveDescriptor::TableauToFoundation { from_col: 3 };
        assert_eq!(
            serde_json::to_value(MoveBody { mv: &mv }).unwrap(),
            json!({"move": {"type": "t2f", "from_col": 3}})
        );
    }

    #[test]
    fn player_and_autoplay_bodies() {
        assert_eq!(
            serde_json::to_value(PlayerBody { player_name: "Ada" }).unwrap(),
            json!({"player_name": "Ada"})
        );
        assert_eq!(serde_json::to_value(AutoplayBody { limit: 200 }).unwrap(), json!({"limit": 200}));
    }

    #[test]
    fn saves_listing_is_described_per_row() {
        let saves: Items<SaveSummary> = serde_json::from_value(json!({"items": [
            {"id": "9f1c", "modo": "vegas", "puntaje": -52, "movimientos": 12, "jugador": "Ada", "semilla": 7},
            {"id": "77aa", "modo": "standard", "puntaje": 0, "jugador": null}
        ]}))
        .unwrap();
        let lines: Vec<String> = saves.items.iter().map(SaveSummary::describe).collect();
        assert_eq!(lines, vec!["9f1c (vegas, score -52) by Ada", "77aa (standard, score 0)"]);
    }

    #[test]
    fn board_listings_unwrap_items() {
        let board: Items<LeaderEntry> = serde_json::from_value(json!({"items": [
            {"jugador": "Ada", "max_score": 620, "partidas": 4}
        ]}))
        .unwrap();
        assert_eq!(board.items[0].player, "Ada");

        let empty: Items<ScoreEntry> = serde_json::from_value(json!({})).unwrap();
        assert!(empty.items.is_empty());
    }

    #[test]
    fn state_envelope_ignores_siblings() {
        let env: StateEnvelope = serde_json::from_value(json!({
            "ok": true, "moved": 3, "id": "abc",
            "state": {"stock": [], "waste": [], "foundations": {}, "tableau": [], "score": 7}
        }))
        .unwrap();
        assert_eq!(env.state.score, 7);
    }

    #[test]
    fn null_hint_decodes_to_none() {
        let env: HintEnvelope = serde_json::from_value(json!({"hint": null})).unwrap();
        assert!(env.hint.is_none());
    }

    #[test]
    fn resumed_session_is_reported_back() {
        let client = ApiClient::new("http://127.0.0.1:8000", Some("abc-123")).unwrap();
        assert_eq!(client.session_token().as_deref(), Some("abc-123"));
        let fresh = ApiClient::new("http://127.0.0.1:8000", None).unwrap();
        assert_eq!(fresh.session_token(), None);
    }

    #[test]
    fn cookie_header_parsing() {
        assert_eq!(session_from_cookies("theme=dark; sid=xyz").as_deref(), Some("xyz"));
        assert_eq!(session_from_cookies("theme=dark"), None);
    }

    #[test]
    fn bad_server_url_is_a_config_error() {
        assert!(matches!(ApiClient::new("not a url", None), Err(ClientError::Config(_))));
    }
}

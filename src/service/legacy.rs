use std::cell::RefCell;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::{GameService, NewGame, decode};
use crate::error::ClientError;
use crate::moves::MoveDescriptor;
use crate::snapshot::Snapshot;

/// A state reply: the snapshot fields sit at the top level next to the id.
#[derive(Deserialize)]
struct LegacyReply {
    #[serde(default)]
    ok: Option<bool>,
    #[serde(default)]
    game_id: Option<String>,
    #[serde(flatten)]
    snapshot: Snapshot,
}

#[derive(Deserialize)]
struct LegacyHintReply {
    #[serde(default, rename = "move")]
    mv: Option<LegacyHint>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum LegacyHint {
    #[serde(rename = "tableau->foundation")]
    TableauToFoundation { from: usize },
    #[serde(rename = "waste->foundation")]
    WasteToFoundation,
    #[serde(rename = "waste->tableau")]
    WasteToTableau { to: usize },
}

impl From<LegacyHint> for MoveDescriptor {
    fn from(hint: LegacyHint) -> Self {
        match hint {
            LegacyHint::TableauToFoundation { from } => {
                MoveDescriptor::TableauToFoundation { from_col: from }
            }
            LegacyHint::WasteToFoundation => MoveDescriptor::WasteToFoundation,
            LegacyHint::WasteToTableau { to } => MoveDescriptor::WasteToTableau { to_col: to },
        }
    }
}

#[derive(Deserialize)]
struct SavesReply {
    #[serde(default)]
    saves: Vec<String>,
}

/// Client for the older id-threaded protocol (`/new_game`, `/draw_card`, ...).
///
/// It has no redo or autoplay, reports the stock as a bare count and moves a
/// tableau pile's top card only.
pub struct LegacyClient {
    http: reqwest::Client,
    base: String,
    game_id: RefCell<Option<String>>,
}

impl LegacyClient {
    pub fn new(server: &str, game_id: Option<&str>) -> Result<Self, ClientError> {
        if !(server.starts_with("http://") || server.starts_with("https://")) {
            return Err(ClientError::Config(format!("server url {server:?} must be http(s)")));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("klondike-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(LegacyClient {
            http,
            base: server.trim_end_matches('/').to_string(),
            game_id: RefCell::new(game_id.map(str::to_string)),
        })
    }

    fn game_id(&self) -> Result<String, ClientError> {
        self.game_id.borrow().clone().ok_or(ClientError::NoSession)
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<T, ClientError> {
        debug!(path, "POST");
        let url = format!("{}{}", self.base, path);
        let response = self.http.post(url).json(&body).send().await?;
        decode(response).await
    }

    /// Decode a state reply, adopting a new game id and surfacing `ok: false`.
    async fn post_state(&self, path: &str, body: Value) -> Result<Snapshot, ClientError> {
        let reply: LegacyReply = self.post(path, body).await?;
        if reply.ok == Some(false) {
            return Err(ClientError::Rejected(format!("the server refused {}", &path[1..])));
        }
        if let Some(id) = reply.game_id {
            *self.game_id.borrow_mut() = Some(id);
        }
        Ok(reply.snapshot)
    }
}

/// `from_pile` / `to_pile` for a move, or `None` if the protocol has no such move.
fn pile_refs(mv: &MoveDescriptor) -> Option<(Value, Value)> {
    let tableau = |index: usize| json!({"type": "tableau", "index": index});
    let foundation = json!({"type": "foundation"});
    match *mv {
        MoveDescriptor::WasteToFoundation => Some((json!("waste"), foundation)),
        MoveDescriptor::WasteToTableau { to_col } => Some((json!("waste"), tableau(to_col))),
        MoveDescriptor::TableauToFoundation { from_col } => Some((tableau(from_col), foundation)),
        MoveDescriptor::TableauToTableau { from_col, to_col, .. } => {
            Some((tableau(from_col), tableau(to_col)))
        }
        MoveDescriptor::Draw
        | MoveDescriptor::Undo
        | MoveDescriptor::Redo
        | MoveDescriptor::Recycle => None,
    }
}

#[async_trait(?Send)]
impl GameService for LegacyClient {
    async fn new_game(&self, request: &NewGame) -> Result<Snapshot, ClientError> {
        if request.draw != 1 || request.seed.is_some() {
            info!(draw = request.draw, "legacy server ignores draw count and seed");
        }
        self.post_state("/new_game", json!({})).await
    }

    async fn apply_move(&self, mv: &MoveDescriptor) -> Result<Snapshot, ClientError> {
        let game_id = self.game_id()?;
        if *mv == MoveDescriptor::Draw {
            let _: Value = self.post("/draw_card", json!({"game_id": game_id})).await?;
            // The draw reply only carries stock and waste; fetch the rest.
            return self.current_state().await;
        }
        let (from_pile, to_pile) =
            pile_refs(mv).ok_or(ClientError::Unsupported("this move"))?;
        if let MoveDescriptor::TableauToTableau { start_index, .. } = mv {
            debug!(start_index, "legacy server moves the top card only");
        }
        self.post_state(
            "/move_card",
            json!({"game_id": game_id, "from_pile": from_pile, "to_pile": to_pile}),
        )
        .await
    }

    async fn undo(&self) -> Result<Snapshot, ClientError> {
        let game_id = self.game_id()?;
        self.post_state("/undo", json!({"game_id": game_id})).await
    }

    async fn redo(&self) -> Result<Snapshot, ClientError> {
        Err(ClientError::Unsupported("redo"))
    }

    async fn hint(&self) -> Result<Option<MoveDescriptor>, ClientError> {
        let game_id = self.game_id()?;
        let reply: LegacyHintReply = self.post("/hint", json!({"game_id": game_id})).await?;
        Ok(reply.mv.map(MoveDescriptor::from))
    }

    async fn autoplay(&self, _limit: u32) -> Result<Snapshot, ClientError> {
        Err(ClientError::Unsupported("autoplay"))
    }

    async fn current_state(&self) -> Result<Snapshot, ClientError> {
        let game_id = self.game_id()?;
        self.post_state("/get_game_state", json!({"game_id": game_id})).await
    }

    async fn save(&self, name: &str) -> Result<(), ClientError> {
        let game_id = self.game_id()?;
        let _: Value = self.post("/save_game", json!({"game_id": game_id, "name": name})).await?;
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Snapshot, ClientError> {
        self.post_state("/load_game", json!({"name": name})).await
    }

    async fn list_saves(&self) -> Result<Vec<String>, ClientError> {
        debug!("GET /list_saves");
        let response = self.http.get(format!("{}/list_saves", self.base)).send().await?;
        let reply: SavesReply = decode(response).await?;
        Ok(reply.saves)
    }

    fn session_token(&self) -> Option<String> {
        self.game_id.borrow().clone()
    }
}

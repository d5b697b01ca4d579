//! Every remote call goes through here.
//!
//! Controls are disabled while a request is in flight and released by a drop
//! guard, so the release happens on success, failure, panic and cancellation
//! alike. Failures never touch the snapshot; they become a notice.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::moves::MoveDescriptor;
use crate::overlay::Notices;
use crate::service::{GameService, LeaderEntry, NewGame, ScoreEntry};
use crate::snapshot::Snapshot;
use crate::store::{SnapshotStore, SnapshotWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Resume the current session, or start a new game if there is none.
    Bootstrap(NewGame),
    NewGame(NewGame),
    Move(MoveDescriptor),
    Hint,
    Autoplay { limit: u32 },
    Refresh,
    Save { name: String },
    Load { name: String },
    ListSaves,
    SetPlayer { name: String },
    Scoreboard,
    Leaderboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Replaced { version: u64 },
    Hint(Option<MoveDescriptor>),
    Saved { name: String },
    Saves(Vec<String>),
    PlayerSet { name: String },
    Scoreboard(Vec<ScoreEntry>),
    Leaderboard(Vec<LeaderEntry>),
    Failed(String),
}

enum Reply {
    Snapshot(Snapshot),
    Hint(Option<MoveDescriptor>),
    Saved(String),
    Saves(Vec<String>),
    PlayerSet(String),
    Scoreboard(Vec<ScoreEntry>),
    Leaderboard(Vec<LeaderEntry>),
}

/// Enabled/loading state of the player's controls.
#[derive(Debug, Default)]
pub struct Controls {
    in_flight: Cell<usize>,
}

impl Controls {
    pub fn enabled(&self) -> bool {
        self.in_flight.get() == 0
    }

    pub fn loading(&self) -> bool {
        !self.enabled()
    }

    fn engage(self: &Rc<Self>) -> BusyGuard {
        self.in_flight.set(self.in_flight.get() + 1);
        BusyGuard(Rc::clone(self))
    }
}

/// Holds controls disabled until dropped.
struct BusyGuard(Rc<Controls>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let controls = &self.0;
        controls.in_flight.set(controls.in_flight.get().saturating_sub(1));
    }
}

pub struct ActionDispatcher<S> {
    service: S,
    writer: SnapshotWriter,
    controls: Rc<Controls>,
    notices: RefCell<Notices>,
}

impl<S: GameService> ActionDispatcher<S> {
    pub fn new(service: S, writer: SnapshotWriter) -> Self {
        ActionDispatcher {
            service,
            writer,
            controls: Rc::new(Controls::default()),
            notices: RefCell::new(Notices::default()),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn store(&self) -> SnapshotStore {
        self.writer.reader()
    }

    /// Error notices still on screen at `now`.
    pub fn notices(&self, now: Instant) -> Vec<String> {
        self.notices.borrow().active(now)
    }

    pub fn prune_notices(&self, now: Instant) -> bool {
        self.notices.borrow_mut().prune(now)
    }

    /// Run one action to completion.
    pub async fn dispatch(&self, action: Action) -> Outcome {
        let _busy = self.controls.engage();
        self.perform(action).await
    }

    /// Disable controls now and hand back the request as an owned future.
    ///
    /// Several submitted actions may be in flight at once; whichever finishes
    /// last decides the snapshot.
    pub fn submit(self: &Rc<Self>, action: Action) -> impl Future<Output = Outcome> + use<S>
    where
        S: 'static,
    {
        let busy = self.controls.engage();
        let this = Rc::clone(self);
        async move {
            let _busy = busy;
            this.perform(action).await
        }
    }

    async fn perform(&self, action: Action) -> Outcome {
        debug!(?action, "dispatching");
        match self.call(action).await {
            Ok(Reply::Snapshot(snapshot)) => Outcome::Replaced { version: self.writer.replace(snapshot) },
            Ok(Reply::Hint(hint)) => Outcome::Hint(hint),
            Ok(Reply::Saved(name)) => Outcome::Saved { name },
            Ok(Reply::Saves(names)) => Outcome::Saves(names),
            Ok(Reply::PlayerSet(name)) => Outcome::PlayerSet { name },
            Ok(Reply::Scoreboard(entries)) => Outcome::Scoreboard(entries),
            Ok(Reply::Leaderboard(entries)) => Outcome::Leaderboard(entries),
            Err(err) => {
                warn!(error = %err, "action failed");
                let message = err.to_string();
                self.notices.borrow_mut().push(message.clone(), Instant::now());
                Outcome::Failed(message)
            }
        }
    }

    async fn call(&self, action: Action) -> Result<Reply, ClientError> {
        let service = &self.service;
        let reply = match action {
            Action::Bootstrap(request) => match service.current_state().await {
                Ok(snapshot) => Reply::Snapshot(snapshot),
                Err(err) => {
                    info!(reason = %err, "no session to resume; dealing a new game");
                    Reply::Snapshot(service.new_game(&request).await?)
                }
            },
            Action::NewGame(request) => Reply::Snapshot(service.new_game(&request).await?),
            Action::Move(mv) => Reply::Snapshot(self.apply(mv).await?),
            Action::Hint => Reply::Hint(service.hint().await?),
            Action::Autoplay { limit } => Reply::Snapshot(service.autoplay(limit).await?),
            Action::Refresh => Reply::Snapshot(service.current_state().await?),
            Action::Save { name } => {
                service.save(&name).await?;
                Reply::Saved(name)
            }
            Action::Load { name } => Reply::Snapshot(service.load(&name).await?),
            Action::ListSaves => Reply::Saves(service.list_saves().await?),
            Action::SetPlayer { name } => {
                service.set_player(&name).await?;
                Reply::PlayerSet(name)
            }
            Action::Scoreboard => Reply::Scoreboard(service.scoreboard().await?),
            Action::Leaderboard => Reply::Leaderboard(service.leaderboard().await?),
        };
        Ok(reply)
    }

    async fn apply(&self, mv: MoveDescriptor) -> Result<Snapshot, ClientError> {
        match mv {
            MoveDescriptor::Undo => self.service.undo().await,
            MoveDescriptor::Redo => self.service.redo().await,
            MoveDescriptor::Draw
            | MoveDescriptor::WasteToFoundation
            | MoveDescriptor::WasteToTableau { .. }
            | MoveDescriptor::TableauToFoundation { .. }
            | MoveDescriptor::TableauToTableau { .. }
            | MoveDescriptor::Recycle => self.service.apply_move(&mv).await,
        }
    }
}

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use klondike_client::card::{Card, Rank, Suit};
use klondike_client::error::ClientError;
use klondike_client::moves::MoveDescriptor;
use klondike_client::renderer::{Frame, Renderer};
use klondike_client::service::{GameService, NewGame, ScoreEntry};
use klondike_client::snapshot::{Snapshot, Stock};
use klondike_client::view::View;

/// What the scripted service does on its next call.
pub enum Step {
    Snapshot(Snapshot, Duration),
    Hint(Option<MoveDescriptor>),
    Scores(Vec<ScoreEntry>),
    /// A bodyless success, as renaming the player returns.
    Ack,
    Fail(&'static str),
    Panic,
}

impl Step {
    pub fn now(snapshot: Snapshot) -> Self {
        Step::Snapshot(snapshot, Duration::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    NewGame(NewGame),
    Move(MoveDescriptor),
    Undo,
    Redo,
    Hint,
    Autoplay(u32),
    State,
    SetPlayer(String),
    Scoreboard,
}

/// A `GameService` that replays a fixed script and records every call.
#[derive(Clone, Default)]
pub struct ScriptedService {
    steps: Rc<RefCell<VecDeque<Step>>>,
    calls: Rc<RefCell<Vec<Call>>>,
}

impl ScriptedService {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        ScriptedService {
            steps: Rc::new(RefCell::new(steps.into_iter().collect())),
            calls: Rc::default(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn remaining(&self) -> usize {
        self.steps.borrow().len()
    }

    // The step is taken before any delay so concurrent calls consume the
    // script in the order they were made.
    fn next(&self, call: Call) -> Step {
        self.calls.borrow_mut().push(call);
        self.steps
            .borrow_mut()
            .pop_front()
            .unwrap_or(Step::Fail("script exhausted"))
    }

    async fn snapshot(&self, call: Call) -> Result<Snapshot, ClientError> {
        match self.next(call) {
            Step::Snapshot(snapshot, delay) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(snapshot)
            }
            Step::Fail(message) => Err(ClientError::status(400, message)),
            Step::Panic => panic!("scripted panic"),
            _ => Err(ClientError::Rejected("a snapshot was expected".into())),
        }
    }
}

#[async_trait(?Send)]
impl GameService for ScriptedService {
    async fn new_game(&self, request: &NewGame) -> Result<Snapshot, ClientError> {
        self.snapshot(Call::NewGame(request.clone())).await
    }

    async fn apply_move(&self, mv: &MoveDescriptor) -> Result<Snapshot, ClientError> {
        self.snapshot(Call::Move(*mv)).await
    }

    async fn undo(&self) -> Result<Snapshot, ClientError> {
        self.snapshot(Call::Undo).await
    }

    async fn redo(&self) -> Result<Snapshot, ClientError> {
        self.snapshot(Call::Redo).await
    }

    async fn hint(&self) -> Result<Option<MoveDescriptor>, ClientError> {
        match self.next(Call::Hint) {
            Step::Hint(hint) => Ok(hint),
            Step::Fail(message) => Err(ClientError::status(400, message)),
            Step::Panic => panic!("scripted panic"),
            _ => Err(ClientError::Rejected("a hint was expected".into())),
        }
    }

    async fn autoplay(&self, limit: u32) -> Result<Snapshot, ClientError> {
        self.snapshot(Call::Autoplay(limit)).await
    }

    async fn current_state(&self) -> Result<Snapshot, ClientError> {
        self.snapshot(Call::State).await
    }

    async fn set_player(&self, name: &str) -> Result<(), ClientError> {
        match self.next(Call::SetPlayer(name.to_string())) {
            Step::Ack => Ok(()),
            Step::Fail(message) => Err(ClientError::status(400, message)),
            _ => Err(ClientError::Rejected("a bare acknowledgement was expected".into())),
        }
    }

    // The leaderboard is left to the trait default so the unsupported path
    // stays covered.
    async fn scoreboard(&self) -> Result<Vec<ScoreEntry>, ClientError> {
        match self.next(Call::Scoreboard) {
            Step::Scores(rows) => Ok(rows),
            Step::Fail(message) => Err(ClientError::status(400, message)),
            _ => Err(ClientError::Rejected("scoreboard rows were expected".into())),
        }
    }
}

pub fn score(name: &str, score: i64, seconds: u64) -> ScoreEntry {
    ScoreEntry { name: name.into(), score, moves: 90, seconds, draw: 1 }
}

pub fn card(suit: Suit, rank: u8, face_up: bool) -> Card {
    Card::new(suit, Rank::new(rank).unwrap(), face_up)
}

/// A fresh deal: seven piles of 1..=7 cards with only the top face up,
/// 24 cards in the stock and an empty waste.
pub fn deal() -> Snapshot {
    let mut deck = Suit::ALL
        .into_iter()
        .flat_map(|suit| (1..=13).map(move |rank| card(suit, rank, false)));

    let tableau = (0..7)
        .map(|col| {
            let mut pile: Vec<Card> = deck.by_ref().take(col + 1).collect();
            if let Some(top) = pile.last_mut() {
                top.face_up = true;
            }
            pile
        })
        .collect();
    let stock = deck.collect::<Vec<_>>();
    assert_eq!(stock.len(), 24);

    Snapshot {
        mode: Some("standard".into()),
        stock: Stock::Cards(stock),
        foundations: Suit::ALL.into_iter().map(|s| (s, Vec::new())).collect::<BTreeMap<_, _>>(),
        tableau,
        ..Snapshot::default()
    }
}

/// `deal()` after one draw: a single face-up card on the waste.
pub fn after_draw() -> Snapshot {
    let mut snapshot = deal();
    if let Stock::Cards(cards) = &mut snapshot.stock {
        if let Some(mut top) = cards.pop() {
            top.face_up = true;
            snapshot.waste.push(top);
        }
    }
    snapshot.moves = 1;
    snapshot
}

pub fn won() -> Snapshot {
    Snapshot {
        foundations: Suit::ALL
            .into_iter()
            .map(|s| (s, (1..=13).map(|r| card(s, r, true)).collect()))
            .collect(),
        tableau: vec![Vec::new(); 7],
        won: true,
        ..Snapshot::default()
    }
}

/// One painted frame, owned.
#[derive(Debug, Clone)]
pub struct Painted {
    pub view: Option<View>,
    pub loading: bool,
    pub notices: Vec<String>,
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub frames: Vec<Painted>,
    pub infos: Vec<String>,
    pub errors: Vec<String>,
    pub wins: usize,
}

impl RecordingRenderer {
    pub fn last_view(&self) -> Option<&View> {
        self.frames.iter().rev().find_map(|f| f.view.as_ref())
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, frame: &Frame<'_>) {
        self.frames.push(Painted {
            view: frame.view.cloned(),
            loading: frame.loading,
            notices: frame.notices.to_vec(),
        });
    }

    fn info(&mut self, msg: &str) {
        self.infos.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn help(&mut self) {}

    fn win(&mut self) {
        self.wins += 1;
    }
}

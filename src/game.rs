use std::io::{self, BufRead};
use std::rc::Rc;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::command::{Command, Source, parse_command};
use crate::dispatcher::{Action, ActionDispatcher, Outcome};
use crate::gesture::{DragPolicy, GestureTranslator};
use crate::hint::HintAnnotator;
use crate::moves::MoveDescriptor;
use crate::overlay::Overlay;
use crate::renderer::{Frame, Renderer};
use crate::service::{GameService, NewGame};
use crate::store::SnapshotStore;
use crate::view::{EventKind, NodeId, View, ViewOptions, ZoneId, render};

/// How often lapsed flashes and notices are swept off the screen.
const TICK: Duration = Duration::from_millis(100);

/// Startup choices that outlive a single game.
#[derive(Debug, Clone)]
pub struct Settings {
    pub new_game: NewGame,
    pub autoplay_limit: u32,
    pub drag_policy: DragPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            new_game: NewGame::default(),
            autoplay_limit: 200,
            drag_policy: DragPolicy::default(),
        }
    }
}

/// The main game loop. `renderer` is injected so the loop stays
/// surface-agnostic; the service behind the dispatcher owns the rules.
pub struct Game<S, R> {
    dispatcher: Rc<ActionDispatcher<S>>,
    store: SnapshotStore,
    translator: GestureTranslator,
    annotator: HintAnnotator,
    overlay: Overlay,
    options: ViewOptions,
    view: Option<View>,
    renderer: R,
    settings: Settings,
    shown_win: bool,
}

impl<S: GameService + 'static, R: Renderer> Game<S, R> {
    pub fn new(dispatcher: Rc<ActionDispatcher<S>>, renderer: R, settings: Settings) -> Self {
        Game {
            store: dispatcher.store(),
            dispatcher,
            translator: GestureTranslator::new(settings.drag_policy),
            annotator: HintAnnotator::default(),
            overlay: Overlay::new(),
            options: ViewOptions { drag_policy: settings.drag_policy, ..ViewOptions::default() },
            view: None,
            renderer,
            settings,
            shown_win: false,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    pub fn view(&self) -> Option<&View> {
        self.view.as_ref()
    }

    /// Run until the player quits or `lines` closes.
    ///
    /// On close, requests already in flight are allowed to finish so their
    /// results still land in the store.
    pub async fn run(&mut self, mut lines: mpsc::UnboundedReceiver<String>) {
        let mut pending = FuturesUnordered::new();
        pending.push(self.dispatcher.submit(Action::Bootstrap(self.settings.new_game.clone())));
        self.repaint();

        let mut ticker = time::interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut input_open = true;

        loop {
            tokio::select! {
                line = lines.recv(), if input_open => match line {
                    None => {
                        debug!("input closed");
                        input_open = false;
                    }
                    Some(line) => match parse_command(&line) {
                        Err(e) => self.renderer.error(&e),
                        Ok(Command::Quit) => {
                            self.renderer.info("Thanks for playing. Goodbye!");
                            break;
                        }
                        Ok(cmd) => {
                            let repaint = !matches!(cmd, Command::Help);
                            if let Some(action) = self.handle(cmd) {
                                pending.push(self.dispatcher.submit(action));
                            }
                            if repaint {
                                self.repaint();
                            }
                        }
                    },
                },
                Some(outcome) = pending.next(), if !pending.is_empty() => {
                    self.settle(outcome);
                    self.repaint();
                }
                _ = ticker.tick() => {
                    if self.prune() {
                        self.repaint();
                    }
                }
            }

            if !input_open && pending.is_empty() {
                break;
            }
        }
    }

    /// Turn a command into the action it asks for, if any.
    fn handle(&mut self, cmd: Command) -> Option<Action> {
        match cmd {
            Command::Help => {
                self.renderer.help();
                return None;
            }
            Command::Peek => {
                let waste_len = self.store.get().map_or(0, |s| s.waste.len());
                self.options.peek = self.options.peek.toggle(waste_len);
                return None;
            }
            Command::Cancel => {
                self.translator.cancel(&mut self.overlay);
                return None;
            }
            Command::Quit => return None,
            _ if !self.dispatcher.controls().enabled() => {
                self.renderer.info("Still waiting for the server; try again in a moment.");
                return None;
            }
            Command::Draw | Command::Press(_) | Command::Drag { .. } | Command::DoubleClick(_)
                if self.view.is_none() =>
            {
                self.renderer.error("No game loaded yet; try 'new' or 'refresh'.");
                return None;
            }
            _ => {}
        }

        let action = match cmd {
            Command::Draw => Action::Move(self.fire(NodeId::Zone(ZoneId::Stock), EventKind::Click)?),
            Command::Press(key) => {
                Action::Move(self.fire(NodeId::Zone(ZoneId::Stock), EventKind::Key(key))?)
            }
            Command::Drag { from, to } => Action::Move(self.drag(from, to)?),
            Command::DoubleClick(from) => {
                let node = self.source_node(from)?;
                Action::Move(self.fire(node, EventKind::DoubleClick)?)
            }
            Command::Undo => Action::Move(MoveDescriptor::Undo),
            Command::Redo => Action::Move(MoveDescriptor::Redo),
            Command::Hint => Action::Hint,
            Command::Autoplay { limit } => Action::Autoplay {
                limit: limit.unwrap_or(self.settings.autoplay_limit),
            },
            Command::NewGame { draw } => {
                if let Some(draw) = draw {
                    self.settings.new_game.draw = draw;
                }
                Action::NewGame(self.settings.new_game.clone())
            }
            Command::Refresh => Action::Refresh,
            Command::Save { name } => Action::Save { name },
            Command::Load { name } => Action::Load { name },
            Command::ListSaves => Action::ListSaves,
            Command::Player { name } => {
                self.settings.new_game.player_name = Some(name.clone());
                Action::SetPlayer { name }
            }
            Command::Scoreboard => Action::Scoreboard,
            Command::Leaderboard => Action::Leaderboard,
            Command::Help | Command::Peek | Command::Cancel | Command::Quit => return None,
        };
        Some(action)
    }

    /// Drag start, enter and drop, as a pointer would fire them.
    fn drag(&mut self, from: Source, to: ZoneId) -> Option<MoveDescriptor> {
        let node = self.source_node(from)?;
        self.fire(node, EventKind::DragStart);
        if self.translator.pending().is_none() {
            self.renderer.error("That card can't be picked up.");
            return None;
        }
        let target = NodeId::Zone(to);
        let droppable = self.view.as_ref().is_some_and(|v| v.zone(to).is_some_and(|z| z.accepts_drop));
        if !droppable {
            self.translator.cancel(&mut self.overlay);
            self.renderer.error("Cards can't be dropped there.");
            return None;
        }
        self.fire(target, EventKind::DragEnter);
        let mv = self.fire(target, EventKind::Drop);
        self.translator.cancel(&mut self.overlay);
        mv
    }

    fn source_node(&mut self, from: Source) -> Option<NodeId> {
        let view = self.view.as_ref()?;
        let (zone, index) = match from {
            Source::Waste => (ZoneId::Waste, None),
            Source::Tableau { col, index } => (ZoneId::Tableau(col), index),
        };
        let index = match index {
            Some(index) => Some(index),
            None => view.zone(zone).and_then(|z| z.cards.last()).map(|c| c.index),
        };
        match index {
            Some(index) => Some(NodeId::Card { zone, index }),
            None => {
                self.renderer.error("There is no card there.");
                None
            }
        }
    }

    /// Route one event through the view's handler table.
    fn fire(&mut self, node: NodeId, kind: EventKind) -> Option<MoveDescriptor> {
        let handler = self.view.as_ref()?.handlers.lookup(node, kind);
        let Some(handler) = handler else {
            debug!(?node, ?kind, "no handler bound");
            return None;
        };
        let snapshot = self.store.get();
        self.translator.handle(handler, snapshot.as_deref(), &mut self.overlay, Instant::now())
    }

    fn settle(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Replaced { version } => debug!(version, "snapshot replaced"),
            Outcome::Hint(hint) => {
                let now = Instant::now();
                match (self.annotator.annotate(hint.as_ref(), &mut self.overlay, now), hint) {
                    (Some(zone), Some(mv)) => {
                        info!(%mv, ?zone, "hint");
                        self.renderer.info(&format!("Hint: {mv}"));
                    }
                    _ => self.renderer.info("No obvious moves."),
                }
            }
            Outcome::Saved { name } => self.renderer.info(&format!("Saved as '{name}'.")),
            Outcome::Saves(names) if names.is_empty() => self.renderer.info("No saved games."),
            Outcome::Saves(names) => {
                self.renderer.info("Saved games:");
                for name in names {
                    self.renderer.info(&format!("  {name}"));
                }
            }
            Outcome::PlayerSet { name } => self.renderer.info(&format!("Playing as {name}.")),
            Outcome::Scoreboard(rows) if rows.is_empty() => {
                self.renderer.info("The scoreboard is empty.")
            }
            Outcome::Scoreboard(rows) => {
                self.renderer.info("Scoreboard:");
                for (i, row) in rows.iter().enumerate() {
                    self.renderer.info(&format!(
                        "{:>2}. {}  {} pts  {} moves  {}:{:02}  draw {}",
                        i + 1,
                        row.name,
                        row.score,
                        row.moves,
                        row.seconds / 60,
                        row.seconds % 60,
                        row.draw,
                    ));
                }
            }
            Outcome::Leaderboard(rows) if rows.is_empty() => {
                self.renderer.info("The leaderboard is empty.")
            }
            Outcome::Leaderboard(rows) => {
                self.renderer.info("Leaderboard:");
                for (i, row) in rows.iter().enumerate() {
                    self.renderer.info(&format!(
                        "{:>2}. {}  best {}  ({} games)",
                        i + 1,
                        row.player,
                        row.best_score,
                        row.games,
                    ));
                }
            }
            // Already queued as a notice by the dispatcher.
            Outcome::Failed(_) => {}
        }
    }

    fn prune(&mut self) -> bool {
        let now = Instant::now();
        let flashes = self.overlay.prune(now);
        let notices = self.dispatcher.prune_notices(now);
        flashes || notices
    }

    fn repaint(&mut self) {
        let now = Instant::now();
        self.view = self.store.get().map(|s| render(&s, &self.options));
        let notices = self.dispatcher.notices(now);
        let frame = Frame {
            view: self.view.as_ref(),
            overlay: &self.overlay,
            notices: &notices,
            loading: self.dispatcher.controls().loading(),
            now,
        };
        self.renderer.render(&frame);

        let won = self.view.as_ref().is_some_and(|v| v.hud.won);
        if won && !self.shown_win {
            self.renderer.win();
        }
        self.shown_win = won;
    }
}

/// Read stdin lines on a plain thread and hand them to the async loop.
pub fn spawn_input() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

//! Snapshot → view tree.
//!
//! [`render`] is a pure function: every call rebuilds every zone from the
//! snapshot it is given, and the result carries its own handler table keyed
//! by (node, event kind). Surfaces look handlers up instead of wiring
//! callbacks, which lets tests drive gestures against a bare `View`.

use std::collections::BTreeMap;

use crate::card::{Card, Suit};
use crate::gesture::DragPolicy;
use crate::snapshot::Snapshot;

/// Most trailing waste cards the peek toggle will ever show.
pub const MAX_PEEK: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ZoneId {
    Stock,
    Waste,
    Foundation(Suit),
    Tableau(usize),
}

/// Anything an event can land on: a whole zone or one card inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Zone(ZoneId),
    Card { zone: ZoneId, index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Enter,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Click,
    DoubleClick,
    Key(Key),
    DragStart,
    DragEnter,
    DragLeave,
    Drop,
}

/// What a (node, event) pair means to the gesture translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    DrawFromStock,
    StartWasteDrag,
    StartTableauDrag { col: usize, index: usize },
    WasteToFoundation,
    TableauToFoundation { col: usize, index: usize },
    EnterDropZone(ZoneId),
    LeaveDropZone(ZoneId),
    DropOn(ZoneId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerTable {
    entries: BTreeMap<(NodeId, EventKind), Handler>,
}

impl HandlerTable {
    fn bind(&mut self, node: NodeId, kind: EventKind, handler: Handler) {
        self.entries.insert((node, kind), handler);
    }

    pub fn lookup(&self, node: NodeId, kind: EventKind) -> Option<Handler> {
        self.entries.get(&(node, kind)).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(NodeId, EventKind), &Handler)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What a card node exposes. A face-down card carries nothing at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Up(Card),
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardNode {
    /// Position in the underlying pile.
    pub index: usize,
    pub face: Face,
    /// Stacking order within the zone; higher draws above lower.
    pub layer: usize,
    pub draggable: bool,
    pub double_click: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// A single face-down placeholder for a non-empty stock.
    FaceDown,
    Empty,
    EmptySuit(Suit),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneView {
    pub id: ZoneId,
    pub cards: Vec<CardNode>,
    pub marker: Option<Marker>,
    pub accepts_drop: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hud {
    pub score: i64,
    pub moves: u32,
    pub seconds: u64,
    pub draw_count: u8,
    pub won: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub hud: Hud,
    pub zones: Vec<ZoneView>,
    pub handlers: HandlerTable,
}

impl View {
    pub fn zone(&self, id: ZoneId) -> Option<&ZoneView> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn tableau_columns(&self) -> usize {
        self.zones
            .iter()
            .filter(|z| matches!(z.id, ZoneId::Tableau(_)))
            .count()
    }
}

/// Client-local count of trailing waste cards on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WastePeek(usize);

impl Default for WastePeek {
    fn default() -> Self {
        WastePeek(1)
    }
}

impl WastePeek {
    pub fn count(self) -> usize {
        self.0
    }

    /// `1 → min(3, waste_len) → 1`.
    pub fn toggle(self, waste_len: usize) -> Self {
        if self.0 > 1 {
            WastePeek(1)
        } else {
            WastePeek(waste_len.min(MAX_PEEK).max(1))
        }
    }

    pub fn visible(self, waste_len: usize) -> usize {
        self.0.min(MAX_PEEK).min(waste_len)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewOptions {
    pub peek: WastePeek,
    pub drag_policy: DragPolicy,
}

pub fn render(snapshot: &Snapshot, options: &ViewOptions) -> View {
    let mut handlers = HandlerTable::default();
    let mut zones = Vec::with_capacity(2 + Suit::ALL.len() + snapshot.tableau.len());

    zones.push(render_stock(snapshot, &mut handlers));
    zones.push(render_waste(snapshot, options.peek, &mut handlers));
    for suit in Suit::ALL {
        zones.push(render_foundation(snapshot, suit, &mut handlers));
    }
    for (col, pile) in snapshot.tableau.iter().enumerate() {
        zones.push(render_pile(col, pile, options.drag_policy, &mut handlers));
    }

    View {
        hud: Hud {
            score: snapshot.score,
            moves: snapshot.moves,
            seconds: snapshot.seconds,
            draw_count: snapshot.draw_count,
            won: snapshot.won,
        },
        zones,
        handlers,
    }
}

fn face_of(card: &Card) -> Face {
    if card.face_up { Face::Up(*card) } else { Face::Hidden }
}

fn bind_drop_zone(handlers: &mut HandlerTable, zone: ZoneId) {
    let node = NodeId::Zone(zone);
    handlers.bind(node, EventKind::DragEnter, Handler::EnterDropZone(zone));
    handlers.bind(node, EventKind::DragLeave, Handler::LeaveDropZone(zone));
    handlers.bind(node, EventKind::Drop, Handler::DropOn(zone));
}

fn render_stock(snapshot: &Snapshot, handlers: &mut HandlerTable) -> ZoneView {
    let node = NodeId::Zone(ZoneId::Stock);
    // Drawing from an empty stock is still a draw; recycling is the service's call.
    handlers.bind(node, EventKind::Click, Handler::DrawFromStock);
    handlers.bind(node, EventKind::Key(Key::Enter), Handler::DrawFromStock);
    handlers.bind(node, EventKind::Key(Key::Space), Handler::DrawFromStock);

    let marker = if snapshot.stock.is_empty() { Marker::Empty } else { Marker::FaceDown };
    ZoneView {
        id: ZoneId::Stock,
        cards: Vec::new(),
        marker: Some(marker),
        accepts_drop: false,
    }
}

fn render_waste(snapshot: &Snapshot, peek: WastePeek, handlers: &mut HandlerTable) -> ZoneView {
    let len = snapshot.waste.len();
    let first = len - peek.visible(len);

    let cards = snapshot.waste[first..]
        .iter()
        .enumerate()
        .map(|(layer, card)| {
            let index = first + layer;
            let interactive = index + 1 == len && card.face_up;
            if interactive {
                let node = NodeId::Card { zone: ZoneId::Waste, index };
                handlers.bind(node, EventKind::DragStart, Handler::StartWasteDrag);
                handlers.bind(node, EventKind::DoubleClick, Handler::WasteToFoundation);
            }
            CardNode {
                index,
                face: face_of(card),
                layer,
                draggable: interactive,
                double_click: interactive,
            }
        })
        .collect::<Vec<_>>();

    ZoneView {
        id: ZoneId::Waste,
        marker: cards.is_empty().then_some(Marker::Empty),
        cards,
        accepts_drop: false,
    }
}

fn render_foundation(snapshot: &Snapshot, suit: Suit, handlers: &mut HandlerTable) -> ZoneView {
    let zone = ZoneId::Foundation(suit);
    bind_drop_zone(handlers, zone);

    let pile_len = snapshot.foundations.get(&suit).map_or(0, Vec::len);
    let cards: Vec<CardNode> = snapshot
        .foundation_top(suit)
        .map(|card| CardNode {
            index: pile_len - 1,
            face: face_of(card),
            layer: 0,
            draggable: false,
            double_click: false,
        })
        .into_iter()
        .collect();

    ZoneView {
        id: zone,
        marker: cards.is_empty().then_some(Marker::EmptySuit(suit)),
        cards,
        accepts_drop: true,
    }
}

fn render_pile(
    col: usize,
    pile: &[Card],
    policy: DragPolicy,
    handlers: &mut HandlerTable,
) -> ZoneView {
    let zone = ZoneId::Tableau(col);
    bind_drop_zone(handlers, zone);

    let top = pile.len().checked_sub(1);
    let cards = pile
        .iter()
        .enumerate()
        .map(|(index, card)| {
            let is_top = Some(index) == top;
            let draggable = card.face_up && policy.allows(is_top);
            let double_click = card.face_up && is_top;
            let node = NodeId::Card { zone, index };
            if draggable {
                handlers.bind(node, EventKind::DragStart, Handler::StartTableauDrag { col, index });
            }
            if double_click {
                handlers.bind(
                    node,
                    EventKind::DoubleClick,
                    Handler::TableauToFoundation { col, index },
                );
            }
            CardNode {
                index,
                face: face_of(card),
                layer: index,
                draggable,
                double_click,
            }
        })
        .collect::<Vec<_>>();

    ZoneView {
        id: zone,
        marker: cards.is_empty().then_some(Marker::Empty),
        cards,
        accepts_drop: true,
    }
}

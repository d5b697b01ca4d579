//! Pointer gestures → move descriptors.
//!
//! A drag is `idle → dragging(source) → resolved → idle`; clicks and
//! double-clicks resolve in one step. The only rule the client checks itself
//! is that a tableau card dropped on a foundation is the top of its pile.

use clap::ValueEnum;
use tokio::time::Instant;
use tracing::debug;

use crate::moves::MoveDescriptor;
use crate::overlay::{Flag, INVALID_DROP_FLASH, Overlay};
use crate::snapshot::Snapshot;
use crate::view::{Handler, ZoneId};

/// Which face-up tableau cards may start a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DragPolicy {
    /// Only the top card of a pile.
    TopOnly,
    /// Any face-up card, dragging the run above it along.
    #[default]
    AnyFaceUp,
}

impl DragPolicy {
    pub fn allows(self, is_top: bool) -> bool {
        match self {
            DragPolicy::TopOnly => is_top,
            DragPolicy::AnyFaceUp => true,
        }
    }
}

/// Where a drag started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    Waste,
    Tableau { col: usize, index: usize },
}

#[derive(Debug, Default)]
pub struct GestureTranslator {
    policy: DragPolicy,
    pending: Option<DragSource>,
}

impl GestureTranslator {
    pub fn new(policy: DragPolicy) -> Self {
        GestureTranslator { policy, pending: None }
    }

    /// The drag in progress, if any.
    pub fn pending(&self) -> Option<DragSource> {
        self.pending
    }

    /// Abandon a drag without dropping it.
    pub fn cancel(&mut self, overlay: &mut Overlay) {
        self.pending = None;
        overlay.clear_drop_targets();
    }

    /// Feed one routed event. Returns a move when the gesture resolves to one.
    pub fn handle(
        &mut self,
        handler: Handler,
        snapshot: Option<&Snapshot>,
        overlay: &mut Overlay,
        now: Instant,
    ) -> Option<MoveDescriptor> {
        match handler {
            Handler::DrawFromStock => Some(MoveDescriptor::Draw),
            Handler::StartWasteDrag => {
                let face_up = snapshot.and_then(Snapshot::waste_top).is_some_and(|c| c.face_up);
                self.pending = face_up.then_some(DragSource::Waste);
                None
            }
            Handler::StartTableauDrag { col, index } => {
                self.pending = snapshot
                    .filter(|s| self.can_drag(s, col, index))
                    .map(|_| DragSource::Tableau { col, index });
                None
            }
            Handler::EnterDropZone(zone) => {
                if self.pending.is_some() {
                    overlay.set_drop_target(zone, true);
                }
                None
            }
            Handler::LeaveDropZone(zone) => {
                overlay.set_drop_target(zone, false);
                None
            }
            Handler::DropOn(zone) => {
                overlay.clear_drop_targets();
                let source = self.pending.take()?;
                resolve_drop(source, zone, snapshot, overlay, now)
            }
            Handler::WasteToFoundation => snapshot
                .and_then(Snapshot::waste_top)
                .filter(|c| c.face_up)
                .map(|_| MoveDescriptor::WasteToFoundation),
            Handler::TableauToFoundation { col, index } => {
                let snapshot = snapshot?;
                let is_top = snapshot.pile_top_index(col) == Some(index);
                let face_up = snapshot.tableau_card(col, index).is_some_and(|c| c.face_up);
                if is_top && face_up {
                    Some(MoveDescriptor::TableauToFoundation { from_col: col })
                } else {
                    debug!(col, index, "double-click below the top card ignored");
                    None
                }
            }
        }
    }

    fn can_drag(&self, snapshot: &Snapshot, col: usize, index: usize) -> bool {
        let face_up = snapshot.tableau_card(col, index).is_some_and(|c| c.face_up);
        let is_top = snapshot.pile_top_index(col) == Some(index);
        face_up && self.policy.allows(is_top)
    }
}

fn resolve_drop(
    source: DragSource,
    zone: ZoneId,
    snapshot: Option<&Snapshot>,
    overlay: &mut Overlay,
    now: Instant,
) -> Option<MoveDescriptor> {
    match (source, zone) {
        (DragSource::Waste, ZoneId::Tableau(to_col)) => {
            Some(MoveDescriptor::WasteToTableau { to_col })
        }
        (DragSource::Tableau { col, index }, ZoneId::Tableau(to_col)) => {
            Some(MoveDescriptor::TableauToTableau { from_col: col, start_index: index, to_col })
        }
        (DragSource::Waste, ZoneId::Foundation(_)) => Some(MoveDescriptor::WasteToFoundation),
        (DragSource::Tableau { col, index }, ZoneId::Foundation(_)) => {
            // A run can never go to a foundation in one move; don't ask.
            if snapshot.and_then(|s| s.pile_top_index(col)) == Some(index) {
                Some(MoveDescriptor::TableauToFoundation { from_col: col })
            } else {
                debug!(col, index, "multi-card foundation drop rejected locally");
                overlay.flash(zone, Flag::Invalid, now, INVALID_DROP_FLASH);
                None
            }
        }
        (_, ZoneId::Stock | ZoneId::Waste) => None,
    }
}

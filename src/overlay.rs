//! Transient visual state layered over the rendered view.
//!
//! Nothing here touches the snapshot. Timed flags carry a deadline and are
//! simply absent once it has passed, so they clear without anyone calling
//! back; `prune` only drops the bookkeeping and tells the surface whether a
//! repaint is due.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use tokio::time::Instant;

use crate::view::ZoneId;

/// How long a rejected foundation drop stays flagged.
pub const INVALID_DROP_FLASH: Duration = Duration::from_millis(400);
/// How long a hinted zone stays highlighted.
pub const HINT_FLASH: Duration = Duration::from_millis(600);
/// How long an error notice stays on screen.
pub const NOTICE_TTL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Flag {
    DropTarget,
    Invalid,
    Hint,
}

impl Flag {
    pub fn class(self) -> &'static str {
        match self {
            Flag::DropTarget => "drop-target",
            Flag::Invalid => "invalid",
            Flag::Hint => "hint",
        }
    }
}

#[derive(Debug, Default)]
pub struct Overlay {
    drop_targets: BTreeSet<ZoneId>,
    timed: BTreeMap<(ZoneId, Flag), Instant>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the hover state a drop zone shows while something is dragged over it.
    pub fn set_drop_target(&mut self, zone: ZoneId, active: bool) {
        if active {
            self.drop_targets.insert(zone);
        } else {
            self.drop_targets.remove(&zone);
        }
    }

    /// Drop every hover highlight; a drag that ends leaves none behind.
    pub fn clear_drop_targets(&mut self) {
        self.drop_targets.clear();
    }

    /// Raise `flag` on `zone` until `now + ttl`. Re-flashing extends the deadline.
    pub fn flash(&mut self, zone: ZoneId, flag: Flag, now: Instant, ttl: Duration) {
        self.timed.insert((zone, flag), now + ttl);
    }

    pub fn has(&self, zone: ZoneId, flag: Flag, now: Instant) -> bool {
        match flag {
            Flag::DropTarget => self.drop_targets.contains(&zone),
            _ => self
                .timed
                .get(&(zone, flag))
                .is_some_and(|deadline| now < *deadline),
        }
    }

    /// Every flag currently showing on `zone`, in a stable order.
    pub fn flags(&self, zone: ZoneId, now: Instant) -> Vec<Flag> {
        [Flag::DropTarget, Flag::Invalid, Flag::Hint]
            .into_iter()
            .filter(|flag| self.has(zone, *flag, now))
            .collect()
    }

    /// Forget expired flags. Returns `true` if anything went away.
    pub fn prune(&mut self, now: Instant) -> bool {
        let before = self.timed.len();
        self.timed.retain(|_, deadline| now < *deadline);
        self.timed.len() != before
    }
}

/// An auto-dismissing message shown after a failed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct Notices {
    items: Vec<Notice>,
}

impl Notices {
    pub fn push(&mut self, message: impl Into<String>, now: Instant) {
        self.items.push(Notice {
            message: message.into(),
            expires_at: now + NOTICE_TTL,
        });
    }

    pub fn active(&self, now: Instant) -> Vec<String> {
        self.items
            .iter()
            .filter(|n| now < n.expires_at)
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn prune(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        self.items.retain(|n| now < n.expires_at);
        self.items.len() != before
    }
}

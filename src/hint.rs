//! Hint responses → a timed highlight on the zone the suggested move
//! starts from. A null hint leaves the overlay untouched.

use std::time::Duration;

use tokio::time::Instant;

use crate::moves::MoveDescriptor;
use crate::overlay::{Flag, HINT_FLASH, Overlay};
use crate::view::ZoneId;

/// Flashes the zone a hinted move starts from.
///
/// The highlight lives in the overlay with a deadline; it does not hold up
/// snapshot replacement and is not re-applied on its own after it lapses.
#[derive(Debug, Clone, Copy)]
pub struct HintAnnotator {
    duration: Duration,
}

impl Default for HintAnnotator {
    fn default() -> Self {
        HintAnnotator { duration: HINT_FLASH }
    }
}

impl HintAnnotator {
    /// Highlight the zone for `hint`. A `None` hint does nothing.
    pub fn annotate(
        &self,
        hint: Option<&MoveDescriptor>,
        overlay: &mut Overlay,
        now: Instant,
    ) -> Option<ZoneId> {
        let zone = hint_zone(hint?)?;
        overlay.flash(zone, Flag::Hint, now, self.duration);
        Some(zone)
    }
}

pub fn hint_zone(hint: &MoveDescriptor) -> Option<ZoneId> {
    match hint {
        MoveDescriptor::Draw | MoveDescriptor::Recycle => Some(ZoneId::Stock),
        MoveDescriptor::WasteToFoundation | MoveDescriptor::WasteToTableau { .. } => {
            Some(ZoneId::Waste)
        }
        MoveDescriptor::TableauToFoundation { from_col }
        | MoveDescriptor::TableauToTableau { from_col, .. } => Some(ZoneId::Tableau(*from_col)),
        MoveDescriptor::Undo | MoveDescriptor::Redo => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_clears_itself_after_600ms() {
        let annotator = HintAnnotator::default();
        let mut overlay = Overlay::new();
        let t0 = Instant::now();
        let hint = MoveDescriptor::TableauToTableau { from_col: 4, start_index: 2, to_col: 1 };

        let zone = annotator.annotate(Some(&hint), &mut overlay, t0);
        assert_eq!(zone, Some(ZoneId::Tableau(4)));
        assert!(overlay.has(ZoneId::Tableau(4), Flag::Hint, t0 + Duration::from_millis(599)));
        assert!(!overlay.has(ZoneId::Tableau(4), Flag::Hint, t0 + Duration::from_millis(600)));
    }

    #[test]
    fn null_hint_is_a_no_op() {
        let mut overlay = Overlay::new();
        let t0 = Instant::now();
        assert_eq!(HintAnnotator::default().annotate(None, &mut overlay, t0), None);
        assert!(!overlay.prune(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn moves_map_to_their_source_zone() {
        assert_eq!(hint_zone(&MoveDescriptor::Draw), Some(ZoneId::Stock));
        assert_eq!(hint_zone(&MoveDescriptor::Recycle), Some(ZoneId::Stock));
        assert_eq!(hint_zone(&MoveDescriptor::WasteToTableau { to_col: 2 }), Some(ZoneId::Waste));
        assert_eq!(
            hint_zone(&MoveDescriptor::TableauToFoundation { from_col: 6 }),
            Some(ZoneId::Tableau(6))
        );
        assert_eq!(hint_zone(&MoveDescriptor::Undo), None);
    }
}

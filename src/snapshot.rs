use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::card::{Card, Suit};

/// The stock as reported by the service.
///
/// The canonical service sends the face-down cards; the legacy one only a count.
/// Either way the client never looks past "how many".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stock {
    Cards(Vec<Card>),
    Count(usize),
}

impl Stock {
    pub fn len(&self) -> usize {
        match self {
            Stock::Cards(cards) => cards.len(),
            Stock::Count(n) => *n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Stock {
    fn default() -> Self {
        Stock::Cards(Vec::new())
    }
}

fn default_draw_count() -> u8 {
    1
}

/// The complete, authoritative game state returned by the service.
///
/// Received whole and replaced whole; the client never patches it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub moves: u32,
    #[serde(default)]
    pub seconds: u64,
    #[serde(default = "default_draw_count")]
    pub draw_count: u8,
    #[serde(default)]
    pub stock: Stock,
    /// Last element is the top card.
    #[serde(default)]
    pub waste: Vec<Card>,
    /// Ascending by rank, last element is the top card.
    #[serde(default)]
    pub foundations: BTreeMap<Suit, Vec<Card>>,
    /// Last element of each pile is the face-up end.
    #[serde(default)]
    pub tableau: Vec<Vec<Card>>,
    #[serde(default, alias = "game_won")]
    pub won: bool,
}

impl Snapshot {
    pub fn waste_top(&self) -> Option<&Card> {
        self.waste.last()
    }

    pub fn foundation_top(&self, suit: Suit) -> Option<&Card> {
        self.foundations.get(&suit).and_then(|pile| pile.last())
    }

    pub fn pile(&self, col: usize) -> Option<&[Card]> {
        self.tableau.get(col).map(Vec::as_slice)
    }

    /// Index of the top card of a tableau pile, `None` for an empty or missing pile.
    pub fn pile_top_index(&self, col: usize) -> Option<usize> {
        self.pile(col)?.len().checked_sub(1)
    }

    pub fn tableau_card(&self, col: usize, index: usize) -> Option<&Card> {
        self.pile(col)?.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Rank;

    #[test]
    fn decodes_canonical_state() {
        let json = r#"{
            "mode": "standard", "draw_count": 3, "score": 15, "moves": 4, "seconds": 42,
            "stock": [{"rank": 5, "suit": "clubs", "face_up": false}],
            "waste": [{"rank": 1, "suit": "hearts", "face_up": true}],
            "foundations": {"hearts": [], "diamonds": [], "clubs": [], "spades": []},
            "tableau": [[{"rank": 13, "suit": "spades", "face_up": true}]],
            "won": false
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.mode.as_deref(), Some("standard"));
        assert_eq!(snapshot.draw_count, 3);
        assert_eq!(snapshot.stock.len(), 1);
        assert_eq!(snapshot.waste_top().map(|c| c.rank), Some(Rank::ACE));
        assert_eq!(snapshot.pile_top_index(0), Some(0));
        assert_eq!(snapshot.foundation_top(Suit::Hearts), None);
    }

    #[test]
    fn decodes_legacy_state() {
        let json = r#"{
            "game_id": "1700000000000",
            "stock": 24,
            "waste": [],
            "foundations": {"hearts": [{"suit": "hearts", "rank": "A", "face_up": true}]},
            "tableau": [[], [{"suit": "clubs", "rank": "10", "face_up": false}]],
            "game_won": true,
            "moves": 9
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.stock, Stock::Count(24));
        assert!(snapshot.won);
        assert_eq!(snapshot.draw_count, 1);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.pile_top_index(0), None);
        assert_eq!(snapshot.tableau_card(1, 0).map(|c| c.rank.value()), Some(10));
        assert_eq!(
            snapshot.foundation_top(Suit::Hearts).map(|c| c.rank),
            Some(Rank::ACE)
        );
    }
}

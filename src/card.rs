use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The four French suits, as the service names them on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    /// All four suits, in the order foundations are laid out.
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    /// Single-glyph symbol used in terminal rendering.
    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
            Suit::Spades => "♠",
        }
    }

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }

    /// Parse the one-letter shorthand used by the command line (`h`, `d`, `c`, `s`).
    pub fn from_letter(s: &str) -> Option<Suit> {
        match s.to_lowercase().as_str() {
            "h" | "hearts" => Some(Suit::Hearts),
            "d" | "diamonds" => Some(Suit::Diamonds),
            "c" | "clubs" => Some(Suit::Clubs),
            "s" | "spades" => Some(Suit::Spades),
            _ => None,
        }
    }
}

const RANK_LABELS: [&str; 13] = [
    "A", "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K",
];

/// Card rank, 1 (ace) through 13 (king).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(u8);

impl Rank {
    pub const ACE: Rank = Rank(1);
    pub const KING: Rank = Rank(13);

    pub fn new(value: u8) -> Option<Rank> {
        (1..=13).contains(&value).then_some(Rank(value))
    }

    pub fn from_label(label: &str) -> Option<Rank> {
        let label = label.trim().to_uppercase();
        RANK_LABELS
            .iter()
            .position(|l| *l == label)
            .map(|i| Rank(i as u8 + 1))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        RANK_LABELS[usize::from(self.0 - 1)]
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

// The legacy service sends rank labels ("A", "10", "K") instead of numbers.
impl<'de> Deserialize<'de> for Rank {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u8),
            Label(String),
        }

        let rank = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Rank::new(n),
            Raw::Label(s) => Rank::from_label(&s),
        };
        rank.ok_or_else(|| serde::de::Error::custom("rank must be 1..=13 or A,2..10,J,Q,K"))
    }
}

/// A card exactly as the service reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
    #[serde(default)]
    pub face_up: bool,
}

impl Card {
    pub fn new(suit: Suit, rank: Rank, face_up: bool) -> Self {
        Card { suit, rank, face_up }
    }

    pub fn label(self) -> String {
        format!("{}{}", self.rank.label(), self.suit.symbol())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

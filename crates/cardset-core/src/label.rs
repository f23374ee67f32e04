//! Card labels: `{rank}{suit}` tokens such as `As`, `10h` or `Qd`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors produced while parsing card tokens.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("unknown rank token {0:?} (expected one of A,K,Q,J,10,9,8,7,6)")]
    UnknownRank(String),
    #[error("unknown suit token {0:?} (expected one of s,h,d,c)")]
    UnknownSuit(String),
    #[error("card label {0:?} is too short")]
    TooShort(String),
}

/// Card rank, restricted to the 36-card deck used for the dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "6")]
    Six,
}

/// Rank families whose corner glyphs occupy differently sized boxes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankCategory {
    Face,
    Ace,
    Numeral,
}

impl Rank {
    pub const ALL: [Rank; 9] = [
        Rank::Ace,
        Rank::King,
        Rank::Queen,
        Rank::Jack,
        Rank::Ten,
        Rank::Nine,
        Rank::Eight,
        Rank::Seven,
        Rank::Six,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::King => "K",
            Rank::Queen => "Q",
            Rank::Jack => "J",
            Rank::Ten => "10",
            Rank::Nine => "9",
            Rank::Eight => "8",
            Rank::Seven => "7",
            Rank::Six => "6",
        }
    }

    #[inline]
    pub fn category(self) -> RankCategory {
        match self {
            Rank::King | Rank::Queen | Rank::Jack => RankCategory::Face,
            Rank::Ace => RankCategory::Ace,
            _ => RankCategory::Numeral,
        }
    }
}

impl FromStr for Rank {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rank::ALL
            .into_iter()
            .find(|r| r.token() == s)
            .ok_or_else(|| LabelError::UnknownRank(s.to_string()))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    #[serde(rename = "s")]
    Spades,
    #[serde(rename = "h")]
    Hearts,
    #[serde(rename = "d")]
    Diamonds,
    #[serde(rename = "c")]
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn token(self) -> &'static str {
        match self {
            Suit::Spades => "s",
            Suit::Hearts => "h",
            Suit::Diamonds => "d",
            Suit::Clubs => "c",
        }
    }
}

impl FromStr for Suit {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Suit::ALL
            .into_iter()
            .find(|x| x.token() == s)
            .ok_or_else(|| LabelError::UnknownSuit(s.to_string()))
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A card identity, rendered as `{rank}{suit}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardLabel {
    pub rank: Rank,
    pub suit: Suit,
}

impl CardLabel {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// All 36 labels, suit-major (`As, Ks, ..., 6s, Ah, ...`).
    pub fn all() -> Vec<CardLabel> {
        Self::product(&Suit::ALL, &Rank::ALL)
    }

    /// Cartesian product of the given suits and ranks, suit-major.
    pub fn product(suits: &[Suit], ranks: &[Rank]) -> Vec<CardLabel> {
        suits
            .iter()
            .flat_map(|&suit| ranks.iter().map(move |&rank| CardLabel { rank, suit }))
            .collect()
    }
}

impl FromStr for CardLabel {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // the suit is always the last character
        let split = match s.char_indices().last() {
            Some((i, _)) if i > 0 => i,
            _ => return Err(LabelError::TooShort(s.to_string())),
        };
        let (rank, suit) = s.split_at(split);
        Ok(CardLabel {
            rank: rank.parse()?,
            suit: suit.parse()?,
        })
    }
}

impl fmt::Display for CardLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints_labels() {
        for token in ["As", "10h", "Qd", "6c", "Jh"] {
            let label: CardLabel = token.parse().expect("valid label");
            assert_eq!(label.to_string(), token);
        }
        let ten: CardLabel = "10s".parse().unwrap();
        assert_eq!(ten.rank, Rank::Ten);
        assert_eq!(ten.suit, Suit::Spades);
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert_eq!(
            "5s".parse::<CardLabel>(),
            Err(LabelError::UnknownRank("5".into()))
        );
        assert_eq!(
            "Ax".parse::<CardLabel>(),
            Err(LabelError::UnknownSuit("x".into()))
        );
        assert!(matches!("A".parse::<CardLabel>(), Err(LabelError::TooShort(_))));
        assert!(matches!("é".parse::<CardLabel>(), Err(LabelError::TooShort(_))));
    }

    #[test]
    fn non_ascii_characters_are_unknown_tokens() {
        assert_eq!(
            "Aé".parse::<CardLabel>(),
            Err(LabelError::UnknownSuit("é".into()))
        );
        assert_eq!(
            "10♠".parse::<CardLabel>(),
            Err(LabelError::UnknownSuit("♠".into()))
        );
        assert_eq!(
            "Ωh".parse::<CardLabel>(),
            Err(LabelError::UnknownRank("Ω".into()))
        );
    }

    #[test]
    fn full_deck_is_suit_major() {
        let deck = CardLabel::all();
        assert_eq!(deck.len(), 36);
        assert_eq!(deck[0].to_string(), "As");
        assert_eq!(deck[8].to_string(), "6s");
        assert_eq!(deck[9].to_string(), "Ah");
        assert_eq!(deck[35].to_string(), "6c");
    }

    #[test]
    fn categories_split_face_ace_numeral() {
        assert_eq!(Rank::King.category(), RankCategory::Face);
        assert_eq!(Rank::Jack.category(), RankCategory::Face);
        assert_eq!(Rank::Ace.category(), RankCategory::Ace);
        assert_eq!(Rank::Ten.category(), RankCategory::Numeral);
        assert_eq!(Rank::Six.category(), RankCategory::Numeral);
    }

    #[test]
    fn serde_uses_tokens() {
        let label = CardLabel::new(Rank::Ten, Suit::Hearts);
        let json = serde_json::to_string(&label).unwrap();
        assert_eq!(json, r#"{"rank":"10","suit":"h"}"#);
    }
}
